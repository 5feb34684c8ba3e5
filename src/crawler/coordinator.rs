//! Crawler coordinator - main crawl orchestration logic
//!
//! This module ties the pieces of a crawl together:
//! - Deciding between a fresh crawl, a resumed crawl, or nothing to do
//! - Starting the persistence writer and the traversal scheduler
//! - Draining the writer once the traversal is over
//! - Marking a finished seed so a rerun knows there is nothing left

use crate::config::Config;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{ContentExtractor, HtmlExtractor};
use crate::crawler::scheduler::{ExpandTask, TraversalScheduler};
use crate::crawler::writer::PersistenceWriter;
use crate::state::ExpansionState;
use crate::storage::{RecordStore, SqliteStorage};
use crate::{Result, ScrapeError};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// What to do with a seed, given what the store already holds for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePlan {
    /// No record for the seed; start at depth 0
    Fresh,
    /// The seed was expanded before, up to `depth`
    Resume { depth: u32 },
    /// The seed's recorded depth already reaches the maximum
    Complete,
}

/// How a crawl run started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    Fresh,
    Resumed { from_depth: u32 },
    AlreadyComplete,
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::Resumed { from_depth } => write!(f, "resumed from depth {}", from_depth),
            Self::AlreadyComplete => write!(f, "already complete"),
        }
    }
}

/// Summary of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlReport {
    pub outcome: CrawlOutcome,
    /// State of the seed's expansion; `None` when nothing was expanded
    pub root: Option<ExpansionState>,
    pub pages_fetched: u64,
    pub pages_failed: u64,
    pub pages_written: u64,
    pub write_failures: u64,
}

impl CrawlReport {
    fn already_complete() -> Self {
        Self {
            outcome: CrawlOutcome::AlreadyComplete,
            root: None,
            pages_fetched: 0,
            pages_failed: 0,
            pages_written: 0,
            write_failures: 0,
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    store: Arc<dyn RecordStore>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ContentExtractor>,
    max_depth: u32,
    max_threads: usize,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ContentExtractor>,
        max_depth: u32,
        max_threads: usize,
    ) -> Self {
        Self {
            store,
            fetcher,
            extractor,
            max_depth,
            max_threads,
        }
    }

    /// Looks up the seed's recorded depth and decides how to start
    pub async fn plan(&self, seed: &Url) -> Result<ResumePlan> {
        let store = self.store.clone();
        let key = seed.to_string();
        let recorded = tokio::task::spawn_blocking(move || store.max_depth_for(&key)).await??;

        let plan = match recorded {
            None => ResumePlan::Fresh,
            Some(depth) if depth >= self.max_depth => ResumePlan::Complete,
            Some(depth) => ResumePlan::Resume { depth },
        };
        Ok(plan)
    }

    /// Runs one crawl from `seed`
    ///
    /// Page-level failures are logged and counted; only a failing depth lookup
    /// or a crashed writer make this return an error.
    pub async fn run(&self, seed: &Url) -> Result<CrawlReport> {
        let plan = self.plan(seed).await?;

        let (outcome, task) = match plan {
            ResumePlan::Complete => {
                tracing::info!("All data has been scraped for URL: {}", seed);
                return Ok(CrawlReport::already_complete());
            }
            ResumePlan::Fresh => {
                tracing::info!(
                    "Start scraping from {} with max depth of {}",
                    seed,
                    self.max_depth
                );
                (CrawlOutcome::Fresh, ExpandTask::new(seed.as_str(), 0))
            }
            ResumePlan::Resume { depth } => {
                tracing::info!("Resuming scraping from {}, depth={}", seed, depth);
                (
                    CrawlOutcome::Resumed { from_depth: depth },
                    ExpandTask::new(seed.as_str(), depth),
                )
            }
        };

        let (queue, writer) = PersistenceWriter::channel(self.store.clone());
        let writer = writer.spawn();

        let scheduler = Arc::new(TraversalScheduler::new(
            seed.clone(),
            self.max_depth,
            self.max_threads,
            Frontier::new(self.store.clone(), self.max_depth),
            self.fetcher.clone(),
            self.extractor.clone(),
            queue.clone(),
        ));

        let root = match outcome {
            CrawlOutcome::Resumed { .. } => scheduler.resume(task).await,
            _ => scheduler.run(task).await,
        };

        queue.shutdown();
        let written = writer
            .await
            .map_err(|e| ScrapeError::Writer(e.to_string()))?;

        if root.is_success() {
            self.mark_complete(seed).await?;
        }

        let traversal = scheduler.stats();
        tracing::debug!(
            "Traversal finished: root {}, {} skipped expansions",
            root,
            traversal.skipped
        );

        Ok(CrawlReport {
            outcome,
            root: Some(root),
            pages_fetched: traversal.fetched,
            pages_failed: traversal.failed,
            pages_written: written.written,
            write_failures: written.failed,
        })
    }

    /// Raises the seed's recorded depth to the crawl's maximum
    async fn mark_complete(&self, seed: &Url) -> Result<()> {
        let store = self.store.clone();
        let key = seed.to_string();
        let max_depth = self.max_depth;
        let marked =
            tokio::task::spawn_blocking(move || store.raise_depth(&key, max_depth)).await??;

        if !marked {
            tracing::warn!("No record stored for {}; it will be crawled again", seed);
        }
        Ok(())
    }
}

/// Runs a complete crawl with the HTTP fetcher and a SQLite store
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `seed` - Validated seed URL
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The traversal ran to the end
/// * `Err(ScrapeError)` - The store or the HTTP client could not be set up
pub async fn run_crawl(config: &Config, seed: &Url) -> Result<CrawlReport> {
    let store = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let fetcher = HttpFetcher::new(&config.fetcher)?;

    let coordinator = Coordinator::new(
        Arc::new(store),
        Arc::new(fetcher),
        Arc::new(HtmlExtractor),
        config.crawler.max_depth,
        config.crawler.max_threads,
    );

    coordinator.run(seed).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::{FetchError, FetchedPage};
    use crate::storage::PageRecord;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, String>,
        fetches: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn fetch_count(&self) -> usize {
            self.fetches.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeSite {
        async fn fetch_page(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
            self.fetches.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .map(|html| FetchedPage {
                    html: html.clone(),
                    final_url: url.to_string(),
                })
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn seed() -> Url {
        Url::parse("https://site.test/").unwrap()
    }

    fn site() -> Arc<FakeSite> {
        Arc::new(
            FakeSite::default()
                .page(
                    "https://site.test/",
                    r#"<title>Home</title><a href="/a">a</a><a href="/b">b</a>"#,
                )
                .page("https://site.test/a", r#"<title>A</title><a href="/">home</a>"#)
                .page("https://site.test/b", "<title>B</title>"),
        )
    }

    fn coordinator(
        store: Arc<SqliteStorage>,
        site: Arc<FakeSite>,
        max_depth: u32,
    ) -> Coordinator {
        Coordinator::new(store, site, Arc::new(HtmlExtractor), max_depth, 4)
    }

    #[tokio::test]
    async fn test_plan() {
        let store = Arc::new(SqliteStorage::open_in_memory().unwrap());
        let coordinator = coordinator(store.clone(), site(), 2);

        assert_eq!(coordinator.plan(&seed()).await.unwrap(), ResumePlan::Fresh);

        let mut record = PageRecord::placeholder("https://site.test/", "https://site.test/");
        record.depth = 1;
        store.upsert(&record).unwrap();
        assert_eq!(
            coordinator.plan(&seed()).await.unwrap(),
            ResumePlan::Resume { depth: 1 }
        );

        record.depth = 2;
        store.upsert(&record).unwrap();
        assert_eq!(coordinator.plan(&seed()).await.unwrap(), ResumePlan::Complete);
    }

    #[tokio::test]
    async fn test_fresh_crawl_marks_seed_complete() {
        let store = Arc::new(SqliteStorage::open_in_memory().unwrap());
        let site = site();

        let report = coordinator(store.clone(), site.clone(), 1)
            .run(&seed())
            .await
            .unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Fresh);
        assert_eq!(report.root, Some(ExpansionState::Completed));
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.pages_written, 3);
        assert_eq!(store.count_pages().unwrap(), 3);
        assert_eq!(store.max_depth_for("https://site.test/").unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_rerun_is_already_complete() {
        let store = Arc::new(SqliteStorage::open_in_memory().unwrap());
        let site = site();

        coordinator(store.clone(), site.clone(), 2)
            .run(&seed())
            .await
            .unwrap();
        let fetched = site.fetch_count();

        let report = coordinator(store.clone(), site.clone(), 2)
            .run(&seed())
            .await
            .unwrap();

        assert_eq!(report.outcome, CrawlOutcome::AlreadyComplete);
        assert_eq!(report.root, None);
        assert_eq!(site.fetch_count(), fetched);
    }

    #[tokio::test]
    async fn test_resume_from_recorded_depth() {
        let store = Arc::new(SqliteStorage::open_in_memory().unwrap());
        store
            .upsert(&PageRecord {
                url: "https://site.test/".to_string(),
                source_url: "https://site.test/".to_string(),
                depth: 1,
                title: "Home".to_string(),
                links: vec!["https://site.test/a".to_string()],
            })
            .unwrap();
        let site = site();

        let report = coordinator(store.clone(), site.clone(), 2)
            .run(&seed())
            .await
            .unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Resumed { from_depth: 1 });
        assert_eq!(report.root, Some(ExpansionState::Completed));
        // The seed is fetched again despite being known
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(store.max_depth_for("https://site.test/").unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_failed_seed_is_not_marked() {
        let store = Arc::new(SqliteStorage::open_in_memory().unwrap());
        let site = Arc::new(FakeSite::default());

        let report = coordinator(store.clone(), site, 2)
            .run(&seed())
            .await
            .unwrap();

        assert_eq!(report.root, Some(ExpansionState::Failed));
        assert_eq!(report.pages_failed, 1);
        assert_eq!(store.max_depth_for("https://site.test/").unwrap(), None);
    }
}
