//! Crawler module: the concurrent crawl pipeline
//!
//! This module contains the core crawling logic, including:
//! - The deduplicating, bounded [`Frontier`] of URLs awaiting work
//! - The worker pool that drains it ([`Pipeline`])
//! - The [`Fetcher`] and [`LinkExtractor`] contracts and their HTTP/HTML implementations
//! - In-flight accounting for the link-following mode

mod fetcher;
mod frontier;
mod parser;
mod pipeline;
mod report;
mod tracker;

pub use fetcher::{build_http_client, FetchError, FetchResult, Fetcher, HttpFetcher};
pub use frontier::{Drain, Frontier};
pub use parser::{extract_links, HtmlLinkExtractor, LinkExtractor};
pub use pipeline::{Pipeline, PipelineOptions, DEFAULT_WORKERS};
pub use report::{CrawlReport, FailureStage, ItemFailure};
pub use tracker::InFlight;

use crate::config::{validate, Config};
use crate::storage::MemoryStore;
use crate::RippleError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl over the configured seeds
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP fetcher from the user agent section
/// 3. Create an in-memory page store
/// 4. Run the pipeline until the frontier drains or `cancel` fires
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Token that stops the run early when cancelled
///
/// # Returns
///
/// * `Ok((CrawlReport, Arc<MemoryStore>))` - The run report and the pages it saved
/// * `Err(RippleError)` - The configuration is invalid or the HTTP client could not be built
pub async fn crawl(
    config: &Config,
    cancel: CancellationToken,
) -> Result<(CrawlReport, Arc<MemoryStore>), RippleError> {
    validate(config)?;
    let fetcher = HttpFetcher::from_config(&config.user_agent)?;
    let store = Arc::new(MemoryStore::new());

    let pipeline = Pipeline::new(
        Arc::new(fetcher),
        Arc::new(HtmlLinkExtractor::new()),
        store.clone(),
    )
    .with_options(PipelineOptions::from_config(&config.pipeline));

    let report = pipeline
        .run_with_cancellation(config.seeds.iter().cloned(), cancel)
        .await;

    Ok((report, store))
}
