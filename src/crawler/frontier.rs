//! Frontier and dedup bookkeeping
//!
//! Two layers keep the crawl from repeating work:
//! - `VisitedSet`: URLs claimed for expansion by this process
//! - `Frontier`: the classify step against the record store, which decides
//!   whether a link discovered on a page is worth expanding

use crate::state::LinkClass;
use crate::storage::{PageRecord, RecordStore, StorageResult};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// URLs claimed for expansion during this run
///
/// Insert-only. `claim` is a compare-and-insert, so two workers racing on the
/// same URL cannot both win.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as visited, returning false if it already was
    pub fn claim(&self, url: &str) -> bool {
        let mut urls = self.urls.lock().unwrap_or_else(|e| e.into_inner());
        urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        let urls = self.urls.lock().unwrap_or_else(|e| e.into_inner());
        urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies discovered links against the record store
///
/// Classification only inserts missing rows and bumps the depth column, so it
/// never overwrites the title, links or final URL the persistence writer saved
/// for the same page. Two pages that link to the same new URL at the same
/// moment both accept it: one inserts the placeholder, the other requeues.
pub struct Frontier {
    store: Arc<dyn RecordStore>,
    max_depth: u32,
}

impl Frontier {
    pub fn new(store: Arc<dyn RecordStore>, max_depth: u32) -> Self {
        Self { store, max_depth }
    }

    /// Classifies one resolved, same-domain link found on `source_url`
    ///
    /// Blocks on the store; call it from a blocking context.
    ///
    /// # Classification
    ///
    /// | Stored record            | Result    | Side effect                 |
    /// |--------------------------|-----------|-----------------------------|
    /// | none                     | `New`     | depth-0 placeholder written |
    /// | `depth < max_depth`      | `Requeue` | stored depth incremented    |
    /// | `depth >= max_depth`     | `Done`    | none                        |
    ///
    /// # Returns
    ///
    /// * `Ok(LinkClass)` - The classification
    /// * `Err(StorageError)` - The store call failed; the link should be
    ///   skipped
    pub fn classify(&self, link: &str, source_url: &str) -> StorageResult<LinkClass> {
        if self
            .store
            .insert_if_absent(&PageRecord::placeholder(link, source_url))?
        {
            return Ok(LinkClass::New);
        }

        if self.store.increment_depth(link, self.max_depth)? {
            Ok(LinkClass::Requeue)
        } else {
            Ok(LinkClass::Done)
        }
    }
}
