//! Statistics for a finished crawl run
//!
//! This module combines the pipeline's [`CrawlReport`] with the contents of
//! the [`MemoryStore`] and prints the result.

use crate::crawler::{CrawlReport, FailureStage, ItemFailure};
use crate::storage::MemoryStore;
use std::collections::HashMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Seed URLs supplied, duplicates included
    pub seeds: usize,

    /// Distinct URLs admitted into the frontier
    pub admitted: usize,

    /// Items taken by a worker
    pub processed: usize,

    /// Pages saved to the store
    pub saved: usize,

    /// Items skipped after a failure
    pub failed: usize,

    /// Sum of saved body sizes
    pub total_bytes: u64,

    /// Sum of links found across saved pages
    pub total_links: u64,

    /// Collected failures per stage (empty unless collection was enabled)
    pub failures_by_stage: HashMap<FailureStage, usize>,

    /// Collected failures
    pub failures: Vec<ItemFailure>,

    /// Whether the run was cut short
    pub cancelled: bool,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Builds statistics from a run report and the store it wrote to
    ///
    /// # Arguments
    ///
    /// * `report` - The report returned by the pipeline
    /// * `store` - The store the pipeline saved pages into
    pub fn from_run(report: &CrawlReport, store: &MemoryStore) -> Self {
        let mut failures_by_stage = HashMap::new();
        for failure in &report.failures {
            *failures_by_stage.entry(failure.stage).or_insert(0) += 1;
        }

        Self {
            seeds: report.seeds,
            admitted: report.admitted,
            processed: report.processed,
            saved: report.saved,
            failed: report.failed,
            total_bytes: store.total_bytes(),
            total_links: store.total_links(),
            failures_by_stage,
            failures: report.failures.clone(),
            cancelled: report.cancelled,
            elapsed: report.elapsed,
        }
    }

    /// Percentage of processed items that were saved
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            (self.saved as f64 / self.processed as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Seeds supplied: {}", stats.seeds);
    println!("  URLs admitted: {}", stats.admitted);
    println!("  Items processed: {}", stats.processed);
    println!("  Pages saved: {}", stats.saved);
    println!("  Items skipped: {}", stats.failed);
    println!("  Bytes fetched: {}", stats.total_bytes);
    println!("  Links found: {}", stats.total_links);
    println!("  Elapsed: {:.2}s", stats.elapsed.as_secs_f64());
    if stats.cancelled {
        println!("  Run was cancelled before the frontier drained");
    }
    println!();

    if !stats.failures_by_stage.is_empty() {
        println!("Failures by Stage:");
        let mut stage_counts: Vec<_> = stats.failures_by_stage.iter().collect();
        stage_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (stage, count) in stage_counts {
            println!("  {}: {}", stage, count);
        }
        println!();
    }

    if !stats.failures.is_empty() {
        println!("Skipped URLs ({}):", stats.failures.len());
        for failure in stats.failures.iter().take(20) {
            println!("  - [{}] {}: {}", failure.stage, failure.url, failure.error);
        }
        if stats.failures.len() > 20 {
            println!("  ... and {} more", stats.failures.len() - 20);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} items saved)",
        stats.success_rate(),
        stats.saved,
        stats.processed
    );
}
