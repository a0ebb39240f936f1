//! Storage traits and error types
//!
//! This module defines the trait interface for page stores and
//! associated error types.

use crate::storage::PageSummary;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store lock poisoned by a panicking writer")]
    Poisoned,
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for page store implementations
///
/// Workers share one store, so implementations take `&self` and must provide
/// their own mutual exclusion: `save` must never lose, duplicate, or corrupt
/// an entry under concurrent callers, and `count` must never observe a
/// partially applied `save`.
pub trait PageStore: Send + Sync {
    /// Appends a page summary
    fn save(&self, summary: PageSummary) -> StoreResult<()>;

    /// Number of summaries saved so far
    fn count(&self) -> usize;
}
