//! In-flight accounting for link-following crawls
//!
//! When workers feed discovered links back into the frontier, "close after
//! seeding" no longer works. Instead every URL is counted from just before
//! its admission attempt until its worker has finished with it, including
//! the admission of its own children. The frontier may close when the count
//! drops to zero: the queue is empty and no worker holds an item.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts URLs that are queued or being processed
#[derive(Debug)]
pub struct InFlight {
    pending: AtomicUsize,
}

impl InFlight {
    /// Starts with one token held by the seeding phase
    pub fn new() -> Self {
        Self {
            pending: AtomicUsize::new(1),
        }
    }

    /// Registers an item about to be offered to the frontier
    pub fn begin(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    /// Releases one item (finished, or rejected by the frontier)
    ///
    /// Returns true when this release brought the count to zero.
    pub fn finish(&self) -> bool {
        let previous = self.pending.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "in-flight count underflow");
        previous == 1
    }

    /// Current count, including the seeding token while it is held
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}
