//! Database schema definitions
//!
//! One relation, `pages`, keyed by the URL that was requested.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Every discovered or expanded page
CREATE TABLE IF NOT EXISTS pages (
    url TEXT PRIMARY KEY NOT NULL,
    source_url TEXT NOT NULL,
    depth INTEGER NOT NULL DEFAULT 0,
    title TEXT NOT NULL DEFAULT '',
    links TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_pages_depth ON pages(depth);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
