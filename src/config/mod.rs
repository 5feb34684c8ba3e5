//! Configuration module for Site-Scrape
//!
//! Settings come from an optional TOML file; command-line flags override them.
//!
//! # Example
//!
//! ```no_run
//! use site_scrape::config::{parse_config, validate};
//! use std::path::Path;
//!
//! let mut config = parse_config(Path::new("scrape.toml")).unwrap();
//! config.crawler.max_threads = 4;
//! validate(&config).unwrap();
//! println!("Worker pool size: {}", config.crawler.max_threads);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, FetcherConfig, OutputConfig};

pub use parser::{compute_config_hash, parse_config};
pub use validation::{validate, validate_seed_url, MAX_THREADS_LIMIT};
