//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Page record lookup and upsert
//! - Column-level updates used while classifying discovered links
//! - Canonical encoding of outbound link lists
//! - The depth query the resume logic relies on

mod encoding;
mod schema;
mod sqlite;
mod traits;

pub use encoding::{decode_links, encode_links};
pub use sqlite::SqliteStorage;
pub use traits::{RecordStore, StorageError, StorageResult};

/// A page as stored in the `pages` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// The URL that was requested (unique key)
    pub url: String,
    /// For expanded pages, the post-redirect URL; for placeholders, the
    /// resolved URL of the page that linked here
    pub source_url: String,
    /// Distance from the seed at which the page was discovered
    pub depth: u32,
    pub title: String,
    pub links: Vec<String>,
}

impl PageRecord {
    /// A depth-0 record for a link seen on `source_url` but not yet expanded
    pub fn placeholder(url: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source_url: source_url.into(),
            depth: 0,
            title: String::new(),
            links: Vec::new(),
        }
    }
}
