//! Storage traits and error types
//!
//! This module defines the record-store interface the crawler depends on and
//! its error type.

use crate::storage::PageRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned: {0}")]
    Lock(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record store implementations
///
/// Implementations must be safe to share between the crawl workers (which
/// write placeholders and bump depths) and the persistence writer (which
/// upserts whole records). Each call must be atomic on its own. The workers'
/// operations only touch columns they own, so a record the writer saved is
/// never rolled back by a concurrent classification.
pub trait RecordStore: Send + Sync {
    /// Looks up the record stored under `url`
    ///
    /// Returns `Ok(None)` when no record exists; any other failure is an error.
    fn get(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Inserts the record, or replaces every column of an existing one
    fn upsert(&self, record: &PageRecord) -> StorageResult<()>;

    /// Inserts the record unless one already exists for its URL
    ///
    /// Returns true if it was inserted; an existing record is left untouched.
    fn insert_if_absent(&self, record: &PageRecord) -> StorageResult<bool>;

    /// Adds one to the stored depth of `url` while it is below `limit`
    ///
    /// Only the depth column changes. Returns true if a record was updated.
    fn increment_depth(&self, url: &str, limit: u32) -> StorageResult<bool>;

    /// Raises the stored depth of `url` to at least `depth`
    ///
    /// Returns false when there is no record for `url`.
    fn raise_depth(&self, url: &str, depth: u32) -> StorageResult<bool>;

    /// Greatest depth recorded for `url`, if any record exists
    fn max_depth_for(&self, url: &str) -> StorageResult<Option<u32>>;

    /// Total number of stored records
    fn count_pages(&self) -> StorageResult<u64>;

    /// All stored records, ordered by URL
    fn all_pages(&self) -> StorageResult<Vec<PageRecord>>;
}
