//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::storage::encoding::{decode_links, encode_links};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::PageRecord;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
///
/// The connection sits behind a mutex so one handle can be shared by the
/// crawl workers and the persistence writer.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

/// Columns as stored, before the links JSON is decoded
struct RawPage {
    url: String,
    source_url: String,
    depth: u32,
    title: String,
    links: String,
}

impl RawPage {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            url: row.get(0)?,
            source_url: row.get(1)?,
            depth: row.get(2)?,
            title: row.get(3)?,
            links: row.get(4)?,
        })
    }

    fn into_record(self) -> StorageResult<PageRecord> {
        Ok(PageRecord {
            links: decode_links(&self.links)?,
            url: self.url,
            source_url: self.source_url,
            depth: self.depth,
            title: self.title,
        })
    }
}

impl SqliteStorage {
    /// Opens (or creates) the database file and applies the schema
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl RecordStore for SqliteStorage {
    fn get(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let raw = self
            .conn()?
            .query_row(
                "SELECT url, source_url, depth, title, links FROM pages WHERE url = ?1",
                params![url],
                RawPage::from_row,
            )
            .optional()?;

        raw.map(RawPage::into_record).transpose()
    }

    fn upsert(&self, record: &PageRecord) -> StorageResult<()> {
        let links = encode_links(&record.links)?;
        self.conn()?.execute(
            "INSERT INTO pages (url, source_url, depth, title, links)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(url) DO UPDATE SET
                source_url = excluded.source_url,
                depth = excluded.depth,
                title = excluded.title,
                links = excluded.links",
            params![record.url, record.source_url, record.depth, record.title, links],
        )?;
        Ok(())
    }

    fn insert_if_absent(&self, record: &PageRecord) -> StorageResult<bool> {
        let links = encode_links(&record.links)?;
        let inserted = self.conn()?.execute(
            "INSERT INTO pages (url, source_url, depth, title, links)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(url) DO NOTHING",
            params![record.url, record.source_url, record.depth, record.title, links],
        )?;
        Ok(inserted > 0)
    }

    fn increment_depth(&self, url: &str, limit: u32) -> StorageResult<bool> {
        let updated = self.conn()?.execute(
            "UPDATE pages SET depth = depth + 1 WHERE url = ?1 AND depth < ?2",
            params![url, limit],
        )?;
        Ok(updated > 0)
    }

    fn raise_depth(&self, url: &str, depth: u32) -> StorageResult<bool> {
        let updated = self.conn()?.execute(
            "UPDATE pages SET depth = MAX(depth, ?2) WHERE url = ?1",
            params![url, depth],
        )?;
        Ok(updated > 0)
    }

    fn max_depth_for(&self, url: &str) -> StorageResult<Option<u32>> {
        let depth = self.conn()?.query_row(
            "SELECT MAX(depth) FROM pages WHERE url = ?1",
            params![url],
            |row| row.get::<_, Option<u32>>(0),
        )?;
        Ok(depth)
    }

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn all_pages(&self) -> StorageResult<Vec<PageRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT url, source_url, depth, title, links FROM pages ORDER BY url")?;
        let raw = stmt
            .query_map([], RawPage::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter().map(RawPage::into_record).collect()
    }
}
