//! Storage module for crawl results
//!
//! Workers persist one [`PageSummary`] per successfully fetched URL into a
//! shared [`PageStore`]. The store is the only mutable state the workers share
//! besides the frontier, and it guards its entries with a single lock.
//!
//! Sharing a plain `Vec` between workers without that lock does not compile:
//!
//! ```compile_fail
//! use ripple_crawl::storage::PageSummary;
//!
//! let mut pages: Vec<PageSummary> = Vec::new();
//! let handles: Vec<_> = (0..4)
//!     .map(|i| {
//!         std::thread::spawn(|| {
//!             pages.push(PageSummary::new(format!("https://{}.com", i), 0, 0));
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! ```

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::{PageStore, StoreError, StoreResult};

/// Summary of a successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    /// The URL exactly as it was admitted to the frontier
    pub url: String,

    /// Size of the fetched body in bytes
    pub byte_count: usize,

    /// Number of absolute http(s) links found in the body
    pub link_count: usize,
}

impl PageSummary {
    pub fn new(url: impl Into<String>, byte_count: usize, link_count: usize) -> Self {
        Self {
            url: url.into(),
            byte_count,
            link_count,
        }
    }
}
