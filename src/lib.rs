//! Site-Scrape: a depth-bounded, same-domain site crawler
//!
//! This crate crawls a web site from a seed URL, follows same-domain links up to
//! a maximum depth and records every discovered page in a SQLite database so that
//! an interrupted crawl can be resumed.

pub mod config;
pub mod crawler;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Scrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Persistence writer stopped unexpectedly: {0}")]
    Writer(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Reasons a raw href is not followed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Empty href")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Cross-domain link to {found}, expected {expected}")]
    CrossDomain { expected: String, found: String },
}

/// Result type alias for Site-Scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, CrawlOutcome, CrawlReport};
pub use state::{ExpansionState, LinkClass};
pub use storage::{PageRecord, RecordStore, SqliteStorage};
pub use url::{network_location, resolve_link};
