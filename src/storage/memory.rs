//! In-memory page store
//!
//! Every access to the summary list goes through one `Mutex`, which makes
//! `save` and `count` linearizable under any number of concurrent workers.

use crate::storage::traits::{PageStore, StoreError, StoreResult};
use crate::storage::PageSummary;
use std::sync::{Mutex, PoisonError};

/// Thread-safe in-memory store for page summaries
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Mutex<Vec<PageSummary>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every saved summary, in save order
    pub fn snapshot(&self) -> Vec<PageSummary> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of `byte_count` over all saved summaries
    pub fn total_bytes(&self) -> u64 {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|p| p.byte_count as u64)
            .sum()
    }

    /// Sum of `link_count` over all saved summaries
    pub fn total_links(&self) -> u64 {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|p| p.link_count as u64)
            .sum()
    }
}

impl PageStore for MemoryStore {
    fn save(&self, summary: PageSummary) -> StoreResult<()> {
        let mut pages = self.pages.lock().map_err(|_| StoreError::Poisoned)?;
        pages.push(summary);
        Ok(())
    }

    fn count(&self) -> usize {
        // A push either happened or it did not, so the length is still meaningful after a poison
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
