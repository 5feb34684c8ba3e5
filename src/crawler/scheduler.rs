//! Traversal scheduler
//!
//! This module handles:
//! - The depth-bounded expansion of one URL (fetch, extract, classify, persist)
//! - Fan-out of child expansions as tasks on a shared, bounded worker pool
//! - Per-run counters for fetched, failed and skipped expansions
//!
//! # Worker pool
//!
//! A single semaphore with `max_threads` permits bounds every expansion and
//! every link classification in the run. A permit is taken *before* a task is
//! spawned, so submission blocks while the pool is saturated. An expansion
//! gives its permit back once the page is fetched and parsed, and never holds
//! one while waiting on its children, so deep call trees cannot starve the pool.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::{Frontier, VisitedSet};
use crate::crawler::parser::ContentExtractor;
use crate::crawler::writer::{PageEntry, WriteQueue};
use crate::state::ExpansionState;
use crate::url::resolve_link;
use crate::UrlError;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use url::Url;

/// One unit of work: expand `url`, discovered at `depth`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandTask {
    pub url: String,
    pub depth: u32,
}

impl ExpandTask {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Snapshot of the scheduler's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Pages fetched successfully
    pub fetched: u64,
    /// Fetches that failed
    pub failed: u64,
    /// Expansions skipped by the depth or visited guard
    pub skipped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    fetched: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

/// Drives expansions for one crawl
pub struct TraversalScheduler {
    seed: Url,
    max_depth: u32,
    pool: Arc<Semaphore>,
    visited: VisitedSet,
    frontier: Frontier,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ContentExtractor>,
    queue: WriteQueue,
    counters: Counters,
}

impl TraversalScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `seed` - The crawl's seed URL; decides which links are same-domain
    /// * `max_depth` - Deepest level that is still fetched
    /// * `max_threads` - Size of the shared worker pool (at least 1)
    /// * `frontier` - Link classifier backed by the record store
    /// * `fetcher` / `extractor` - Page collaborators
    /// * `queue` - Producer side of the persistence writer's queue
    pub fn new(
        seed: Url,
        max_depth: u32,
        max_threads: usize,
        frontier: Frontier,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ContentExtractor>,
        queue: WriteQueue,
    ) -> Self {
        Self {
            seed,
            max_depth,
            pool: Arc::new(Semaphore::new(max_threads.max(1))),
            visited: VisitedSet::new(),
            frontier,
            fetcher,
            extractor,
            queue,
            counters: Counters::default(),
        }
    }

    /// Expands `task` and, transitively, everything it links to
    ///
    /// Returns once the whole subtree has finished.
    pub async fn run(self: &Arc<Self>, task: ExpandTask) -> ExpansionState {
        let Some(permit) = self.acquire().await else {
            return ExpansionState::Skipped;
        };
        Arc::clone(self).expand(task, permit, false).await
    }

    /// Expands a URL that was already visited by an earlier run
    ///
    /// The URL is claimed up front so pages linking back to it do not expand it
    /// again, and the visited guard is bypassed for this one expansion.
    pub async fn resume(self: &Arc<Self>, task: ExpandTask) -> ExpansionState {
        self.visited.claim(&task.url);
        let Some(permit) = self.acquire().await else {
            return ExpansionState::Skipped;
        };
        Arc::clone(self).expand(task, permit, true).await
    }

    pub fn stats(&self) -> TraversalStats {
        TraversalStats {
            fetched: self.counters.fetched.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
        }
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        self.pool.clone().acquire_owned().await.ok()
    }

    fn skip(&self) -> ExpansionState {
        self.counters.skipped.fetch_add(1, Ordering::Relaxed);
        ExpansionState::Skipped
    }

    /// Expands a single URL
    ///
    /// # Steps
    ///
    /// 1. Depth guard: beyond `max_depth` → skipped
    /// 2. Visited guard: already claimed → skipped
    /// 3. Fetch (holding `permit`); failure → failed
    /// 4. Extract title and hrefs, then release `permit`
    /// 5. Resolve and classify the hrefs on the pool
    /// 6. Queue the page for the writer
    /// 7. Spawn children at `depth + 1` and wait for all of them
    fn expand(
        self: Arc<Self>,
        task: ExpandTask,
        permit: OwnedSemaphorePermit,
        claimed: bool,
    ) -> BoxFuture<'static, ExpansionState> {
        async move {
            if task.depth > self.max_depth {
                tracing::trace!("Skipping {} at depth {}", task.url, task.depth);
                return self.skip();
            }

            if !claimed && !self.visited.claim(&task.url) {
                tracing::trace!("Already visited {}", task.url);
                return self.skip();
            }

            let page = match self.fetcher.fetch_page(&task.url).await {
                Ok(page) => page,
                Err(e) => {
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::error!("Error scraping {}: {}", task.url, e);
                    return ExpansionState::Failed;
                }
            };
            self.counters.fetched.fetch_add(1, Ordering::Relaxed);

            let content = self.extractor.extract(&page.html);
            drop(permit);

            let links = self.accept_links(&content.hrefs, &page.final_url).await;

            tracing::info!(
                "Scraped {}, depth={}, title='{}'",
                task.url,
                task.depth,
                content.title
            );

            self.queue.enqueue(PageEntry {
                url: task.url.clone(),
                resolved_url: page.final_url,
                depth: task.depth,
                title: content.title,
                links: links.clone(),
            });

            let child_depth = task.depth + 1;
            if child_depth <= self.max_depth {
                self.expand_children(links, child_depth).await;
            }

            ExpansionState::Completed
        }
        .boxed()
    }

    async fn expand_children(self: &Arc<Self>, links: Vec<String>, depth: u32) {
        let mut children = JoinSet::new();

        for link in links {
            let Some(permit) = self.acquire().await else {
                tracing::error!("Worker pool closed; not expanding {}", link);
                break;
            };
            let child = Arc::clone(self).expand(ExpandTask::new(link, depth), permit, false);
            children.spawn(child);
        }

        while let Some(joined) = children.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Expansion task aborted: {}", e);
            }
        }
    }

    /// Resolves the hrefs of one page and keeps the links worth expanding
    ///
    /// Each distinct resolved link is classified once, on the blocking thread
    /// pool while holding a worker permit. Storage errors skip the link they
    /// happened on.
    async fn accept_links(self: &Arc<Self>, hrefs: &[String], source_url: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut classifications = JoinSet::new();

        for href in hrefs {
            let link = match resolve_link(href, &self.seed) {
                Ok(url) => url.to_string(),
                Err(UrlError::Parse(e)) => {
                    tracing::warn!("Error parsing URL {}: {}", href, e);
                    continue;
                }
                Err(e) => {
                    tracing::trace!("Not following {}: {}", href, e);
                    continue;
                }
            };

            if !seen.insert(link.clone()) {
                continue;
            }

            let Some(permit) = self.acquire().await else {
                break;
            };
            let this = Arc::clone(self);
            let source_url = source_url.to_string();
            classifications.spawn_blocking(move || {
                let _permit = permit;
                match this.frontier.classify(&link, &source_url) {
                    Ok(class) => {
                        tracing::trace!("Link {} classified as {}", link, class);
                        class.is_accepted().then_some(link)
                    }
                    Err(e) => {
                        tracing::error!("Error checking {} against the database: {}", link, e);
                        None
                    }
                }
            });
        }

        let mut accepted = Vec::new();
        while let Some(joined) = classifications.join_next().await {
            match joined {
                Ok(Some(link)) => accepted.push(link),
                Ok(None) => {}
                Err(e) => tracing::error!("Link classification task aborted: {}", e),
            }
        }
        accepted
    }
}
