//! Crawl run report
//!
//! Per-item failures never abort a run. By default they are only counted;
//! with failure collection enabled each one is kept for the caller.

use std::fmt;
use std::time::Duration;

/// Stage of the per-item loop where an item was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    Fetch,
    Store,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Store => write!(f, "store"),
        }
    }
}

/// One skipped item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub url: String,
    pub stage: FailureStage,
    pub error: String,
}

/// Outcome of one worker, merged into the run report
#[derive(Debug, Default)]
pub(crate) struct WorkerOutcome {
    pub processed: usize,
    pub saved: usize,
    pub failed: usize,
    pub failures: Vec<ItemFailure>,
}

/// Summary of a completed (or cancelled) pipeline run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Number of seed URLs supplied, duplicates included
    pub seeds: usize,

    /// Distinct URLs admitted into the frontier
    pub admitted: usize,

    /// Items a worker took from the frontier
    pub processed: usize,

    /// Page summaries saved to the store
    pub saved: usize,

    /// Items skipped after a fetch or store failure
    pub failed: usize,

    /// Details of skipped items, populated only when collection is enabled
    pub failures: Vec<ItemFailure>,

    /// Whether the run stopped early on cancellation or its deadline
    pub cancelled: bool,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlReport {
    pub(crate) fn merge(&mut self, outcome: WorkerOutcome) {
        self.processed += outcome.processed;
        self.saved += outcome.saved;
        self.failed += outcome.failed;
        self.failures.extend(outcome.failures);
    }

    /// Percentage of processed items that were saved
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            (self.saved as f64 / self.processed as f64) * 100.0
        }
    }

    /// Failure count per stage, from the collected failures
    pub fn failures_by_stage(&self, stage: FailureStage) -> usize {
        self.failures.iter().filter(|f| f.stage == stage).count()
    }
}
