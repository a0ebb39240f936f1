//! Deduplicating, bounded crawl frontier
//!
//! The frontier is the sole arbiter of "has this URL already been scheduled".
//! Admission (membership check + insert) happens under one short critical
//! section; waiting for queue space happens after that lock is released, so a
//! producer blocked on a full queue never stalls `close` or other admissions.
//!
//! Closing drops the frontier's sender. Producers that were admitted before
//! the close still hold a clone of it, so their items are delivered and the
//! channel only reports end-of-sequence once every admitted item is drained.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Admission state guarded by the frontier lock
#[derive(Debug)]
struct Admission {
    /// Every URL admitted so far; an entry is only removed if its
    /// admission is abandoned before the item reaches the queue
    seen: HashSet<String>,

    /// `None` once the frontier is closed
    sender: Option<mpsc::Sender<String>>,

    /// Maximum number of admissions over the frontier's lifetime
    limit: Option<usize>,
}

/// Deduplicating FIFO work queue shared by producers and workers
#[derive(Debug)]
pub struct Frontier {
    admission: Mutex<Admission>,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<String>>>,
    capacity: usize,
}

impl Frontier {
    /// Creates an open frontier whose queue holds at most `capacity` pending URLs
    ///
    /// A capacity of zero is raised to one; anything above the channel's
    /// limit is lowered to it.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, tokio::sync::Semaphore::MAX_PERMITS);
        let (sender, receiver) = mpsc::channel(capacity);

        Self {
            admission: Mutex::new(Admission {
                seen: HashSet::new(),
                sender: Some(sender),
                limit: None,
            }),
            receiver: Arc::new(tokio::sync::Mutex::new(receiver)),
            capacity,
        }
    }

    /// Creates a frontier that admits at most `limit` distinct URLs in total
    pub fn with_admission_limit(capacity: usize, limit: usize) -> Self {
        let frontier = Self::new(capacity);
        frontier.lock().limit = Some(limit);
        frontier
    }

    fn lock(&self) -> MutexGuard<'_, Admission> {
        // The guarded section never panics midway, so a poisoned lock still holds consistent data
        self.admission
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Attempts to admit `url`
    ///
    /// Returns `false` without side effects if the URL was admitted before,
    /// the frontier is closed, or the admission limit is reached. Otherwise
    /// records the URL as seen, waits for queue space, and returns `true`.
    ///
    /// Cancel-safe: if the future is dropped while waiting for space, the
    /// URL is forgotten again and a later call may admit it.
    pub async fn enqueue(&self, url: impl Into<String>) -> bool {
        let url = url.into();

        let sender = {
            let mut admission = self.lock();

            let sender = match &admission.sender {
                Some(sender) => sender.clone(),
                None => return false,
            };

            if admission.seen.contains(&url) {
                return false;
            }

            if let Some(limit) = admission.limit {
                if admission.seen.len() >= limit {
                    return false;
                }
            }

            admission.seen.insert(url.clone());
            sender
        };

        let mut pending = PendingAdmission {
            frontier: self,
            url: Some(url.clone()),
        };

        // The receiver lives as long as `self`, so this only waits for capacity
        let delivered = sender.send(url).await.is_ok();
        if delivered {
            pending.url = None;
        }
        delivered
    }

    /// Returns a handle that yields admitted URLs in FIFO order
    ///
    /// Every handle shares the same queue: each URL is delivered to exactly
    /// one caller of [`Drain::next`].
    pub fn drain(&self) -> Drain {
        Drain {
            receiver: Arc::clone(&self.receiver),
        }
    }

    /// Closes the frontier to further admissions
    ///
    /// Idempotent. Items already admitted stay retrievable.
    pub fn close(&self) {
        let mut admission = self.lock();
        if admission.sender.take().is_some() {
            tracing::debug!(admitted = admission.seen.len(), "Frontier closed");
        }
    }

    /// Returns whether the frontier has been closed
    pub fn is_closed(&self) -> bool {
        self.lock().sender.is_none()
    }

    /// Number of distinct URLs admitted so far
    pub fn admitted(&self) -> usize {
        self.lock().seen.len()
    }

    /// Returns whether `url` has ever been admitted
    pub fn has_seen(&self, url: &str) -> bool {
        self.lock().seen.contains(url)
    }

    /// Queue capacity fixed at construction
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Withdraws a seen entry whose item never reached the queue
struct PendingAdmission<'a> {
    frontier: &'a Frontier,
    url: Option<String>,
}

impl Drop for PendingAdmission<'_> {
    fn drop(&mut self) {
        if let Some(url) = self.url.take() {
            tracing::debug!(url = %url, "Admission abandoned before delivery");
            self.frontier.lock().seen.remove(&url);
        }
    }
}

/// Consumer side of a [`Frontier`]
///
/// Cheap to clone; clones compete for the same items.
#[derive(Debug, Clone)]
pub struct Drain {
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<String>>>,
}

impl Drain {
    /// Waits for the next admitted URL
    ///
    /// Returns `None` once the frontier is closed and every admitted item has
    /// been delivered; from then on it returns `None` immediately. Cancel-safe.
    pub async fn next(&self) -> Option<String> {
        self.receiver.lock().await.recv().await
    }
}
