//! Persistence writer
//!
//! Completed pages are handed to a single consumer over an unbounded channel,
//! so a slow database never holds up the crawl. The consumer is the only
//! writer of page results and exits when it receives the shutdown sentinel.

use crate::storage::{PageRecord, RecordStore};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// A completed expansion waiting to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// The URL that was requested
    pub url: String,
    /// The URL the fetch ended on
    pub resolved_url: String,
    pub depth: u32,
    pub title: String,
    /// Links accepted for further traversal
    pub links: Vec<String>,
}

impl From<PageEntry> for PageRecord {
    fn from(entry: PageEntry) -> Self {
        PageRecord {
            url: entry.url,
            source_url: entry.resolved_url,
            depth: entry.depth,
            title: entry.title,
            links: entry.links,
        }
    }
}

/// Messages understood by the writer
#[derive(Debug)]
pub enum WriteCommand {
    Page(PageEntry),
    Shutdown,
}

/// Counters reported by the writer when it exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub written: u64,
    pub failed: u64,
}

/// Producer side of the write queue
///
/// Cheap to clone; every worker holds one.
#[derive(Debug, Clone)]
pub struct WriteQueue {
    tx: UnboundedSender<WriteCommand>,
}

impl WriteQueue {
    /// Hands a page to the writer without waiting
    ///
    /// Returns false if the writer has already gone away.
    pub fn enqueue(&self, entry: PageEntry) -> bool {
        let url = entry.url.clone();
        if self.tx.send(WriteCommand::Page(entry)).is_err() {
            tracing::error!("Persistence writer has stopped; dropping record for {}", url);
            return false;
        }
        true
    }

    /// Sends the shutdown sentinel
    ///
    /// Entries enqueued before this call are still written.
    pub fn shutdown(&self) {
        if self.tx.send(WriteCommand::Shutdown).is_err() {
            tracing::debug!("Persistence writer already stopped");
        }
    }
}

/// Consumer side of the write queue
pub struct PersistenceWriter {
    store: Arc<dyn RecordStore>,
    rx: UnboundedReceiver<WriteCommand>,
}

impl PersistenceWriter {
    /// Creates a connected queue and writer pair
    pub fn channel(store: Arc<dyn RecordStore>) -> (WriteQueue, PersistenceWriter) {
        let (tx, rx) = unbounded_channel();
        (WriteQueue { tx }, PersistenceWriter { store, rx })
    }

    /// Starts the writer on the blocking thread pool
    pub fn spawn(self) -> JoinHandle<WriterStats> {
        tokio::task::spawn_blocking(move || self.run())
    }

    /// Drains the queue until the sentinel arrives or every producer is gone
    ///
    /// Must not be called from inside an async context.
    pub fn run(mut self) -> WriterStats {
        let mut stats = WriterStats::default();

        while let Some(command) = self.rx.blocking_recv() {
            let entry = match command {
                WriteCommand::Page(entry) => entry,
                WriteCommand::Shutdown => break,
            };

            let url = entry.url.clone();
            match self.store.upsert(&entry.into()) {
                Ok(()) => {
                    stats.written += 1;
                    tracing::debug!("Saved {} to database", url);
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::error!("Error saving {} to database: {}", url, e);
                }
            }
        }

        tracing::debug!(
            "Persistence writer exiting ({} written, {} failed)",
            stats.written,
            stats.failed
        );
        stats
    }
}
