//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` trait
//! - HTML parsing behind the `ContentExtractor` trait
//! - Dedup bookkeeping and link classification
//! - Depth-bounded traversal on a shared worker pool
//! - The single persistence writer
//! - Overall crawl coordination and resume

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;
mod writer;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome, CrawlReport, ResumePlan};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use frontier::{Frontier, VisitedSet};
pub use parser::{parse_html, ContentExtractor, ExtractedContent, HtmlExtractor};
pub use scheduler::{ExpandTask, TraversalScheduler, TraversalStats};
pub use writer::{PageEntry, PersistenceWriter, WriteCommand, WriteQueue, WriterStats};
