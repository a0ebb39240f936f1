//! Worker pool orchestration
//!
//! A run seeds one [`Frontier`], starts a fixed number of workers that drain
//! it, and returns once every worker has observed termination. Each worker
//! loops fetch -> extract -> save, skipping any item whose fetch or save
//! fails. The frontier lock and the store lock are never held together.
//!
//! In the default single-pass mode the frontier is closed right after
//! seeding. With `follow_links` enabled, workers admit the links they
//! discover and the frontier closes once nothing is queued or in progress.

use crate::config::PipelineConfig;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::frontier::{Drain, Frontier};
use crate::crawler::parser::LinkExtractor;
use crate::crawler::report::{CrawlReport, FailureStage, ItemFailure, WorkerOutcome};
use crate::crawler::tracker::InFlight;
use crate::state::WorkerState;
use crate::storage::{PageStore, PageSummary};
use std::fmt::Display;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Worker count used when none (or a non-positive one) is configured
pub const DEFAULT_WORKERS: usize = 2;

/// Tunables for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Number of concurrent workers; 0 selects [`DEFAULT_WORKERS`]
    pub workers: usize,

    /// Frontier queue capacity; `None` sizes it to the number of seeds
    pub queue_capacity: Option<usize>,

    /// Deadline applied to every fetch
    pub fetch_timeout: Duration,

    /// Deadline for the whole run
    pub run_timeout: Option<Duration>,

    /// Feed discovered links back into the frontier
    pub follow_links: bool,

    /// Cap on distinct URLs admitted over the run
    pub max_pages: Option<usize>,

    /// Keep per-item failure details in the report
    pub collect_failures: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: None,
            fetch_timeout: Duration::from_secs(10),
            run_timeout: None,
            follow_links: false,
            max_pages: None,
            collect_failures: false,
        }
    }
}

impl PipelineOptions {
    /// Builds options from the `[pipeline]` config section
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            // Negative counts become 0, which selects the default
            workers: usize::try_from(config.workers).unwrap_or(0),
            queue_capacity: (config.queue_capacity > 0).then_some(config.queue_capacity),
            fetch_timeout: Duration::from_millis(config.fetch_timeout_ms),
            run_timeout: (config.run_timeout_ms > 0)
                .then(|| Duration::from_millis(config.run_timeout_ms)),
            follow_links: config.follow_links,
            max_pages: (config.max_pages > 0).then_some(config.max_pages),
            collect_failures: config.collect_failures,
        }
    }

    /// Worker count after applying the default
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            DEFAULT_WORKERS
        } else {
            self.workers
        }
    }
}

/// Frontier -> Fetcher -> LinkExtractor -> PageStore, run by a bounded worker pool
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    store: Arc<dyn PageStore>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Creates a pipeline with default options
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        store: Arc<dyn PageStore>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// The store every worker writes into
    pub fn store(&self) -> &Arc<dyn PageStore> {
        &self.store
    }

    /// Runs the pipeline over `seeds` until the frontier is drained
    ///
    /// Per-item failures are skipped, so this never fails.
    pub async fn run<I, S>(&self, seeds: I) -> CrawlReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_with_cancellation(seeds, CancellationToken::new())
            .await
    }

    /// Runs the pipeline, stopping early when `cancel` fires
    ///
    /// On cancellation workers stop drawing new items, abandon the fetch in
    /// progress, and the run returns promptly with `cancelled` set.
    pub async fn run_with_cancellation<I, S>(
        &self,
        seeds: I,
        cancel: CancellationToken,
    ) -> CrawlReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let started = std::time::Instant::now();
        let seeds: Vec<String> = seeds.into_iter().map(Into::into).collect();
        let workers = self.options.effective_workers();
        let capacity = self.options.queue_capacity.unwrap_or(seeds.len()).max(1);

        let frontier = Arc::new(match self.options.max_pages {
            Some(limit) => Frontier::with_admission_limit(capacity, limit),
            None => Frontier::new(capacity),
        });
        let in_flight = Arc::new(InFlight::new());
        let link_tasks = TaskTracker::new();

        let run_token = cancel.child_token();
        // Cancelling on exit also stops the deadline timer below
        let _run_guard = run_token.clone().drop_guard();
        if let Some(limit) = self.options.run_timeout {
            spawn_deadline(run_token.clone(), limit);
        }

        tracing::info!(
            seeds = seeds.len(),
            workers,
            capacity,
            follow_links = self.options.follow_links,
            "Starting crawl run"
        );

        // Workers start before seeding so a queue smaller than the seed list cannot stall
        let mut pool = JoinSet::new();
        for id in 0..workers {
            let worker = Worker {
                id,
                drain: frontier.drain(),
                frontier: Arc::clone(&frontier),
                in_flight: Arc::clone(&in_flight),
                link_tasks: link_tasks.clone(),
                fetcher: Arc::clone(&self.fetcher),
                extractor: Arc::clone(&self.extractor),
                store: Arc::clone(&self.store),
                cancel: run_token.clone(),
                fetch_timeout: self.options.fetch_timeout,
                follow_links: self.options.follow_links,
                collect_failures: self.options.collect_failures,
            };
            pool.spawn(worker.run());
        }

        self.seed(&frontier, &in_flight, &seeds, &run_token).await;

        let mut report = CrawlReport {
            seeds: seeds.len(),
            ..Default::default()
        };

        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(outcome) => report.merge(outcome),
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }

        // Already closed unless the run was cancelled
        frontier.close();
        link_tasks.close();
        link_tasks.wait().await;

        report.admitted = frontier.admitted();
        report.cancelled = run_token.is_cancelled();
        report.elapsed = started.elapsed();

        tracing::info!(
            admitted = report.admitted,
            saved = report.saved,
            failed = report.failed,
            cancelled = report.cancelled,
            "Crawl run finished in {:?}",
            report.elapsed
        );

        report
    }

    /// Admits the seeds, then releases the frontier for termination
    async fn seed(
        &self,
        frontier: &Frontier,
        in_flight: &InFlight,
        seeds: &[String],
        cancel: &CancellationToken,
    ) {
        let follow = self.options.follow_links;

        for url in seeds {
            if follow {
                in_flight.begin();
            }

            let admitted = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Seeding interrupted by cancellation");
                    break;
                }
                admitted = frontier.enqueue(url.as_str()) => admitted,
            };

            if !admitted {
                tracing::debug!(url = %url, "Seed not admitted (duplicate or over limit)");
                if follow {
                    // The seeding token keeps this from reaching zero
                    in_flight.finish();
                }
            }
        }

        if !follow || in_flight.finish() {
            frontier.close();
        }
    }
}

/// Cancels `token` after `limit` unless it is cancelled first
fn spawn_deadline(token: CancellationToken, limit: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(limit) => {
                tracing::warn!("Run deadline of {:?} reached, cancelling", limit);
                token.cancel();
            }
        }
    });
}

/// Moves `state` to `next` if the transition is legal
///
/// An illegal transition is logged and leaves `state` unchanged.
fn advance_state(worker: usize, state: &mut WorkerState, next: WorkerState) -> bool {
    let from = *state;
    match from.transition(next) {
        Ok(to) => {
            tracing::trace!(worker, %from, %to, "Worker state");
            *state = to;
            true
        }
        Err(e) => {
            tracing::warn!(worker, "{}", e);
            false
        }
    }
}

/// One member of the pool; owns clones of everything it touches
struct Worker {
    id: usize,
    drain: Drain,
    frontier: Arc<Frontier>,
    in_flight: Arc<InFlight>,
    link_tasks: TaskTracker,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    store: Arc<dyn PageStore>,
    cancel: CancellationToken,
    fetch_timeout: Duration,
    follow_links: bool,
    collect_failures: bool,
}

impl Worker {
    async fn run(self) -> WorkerOutcome {
        let mut outcome = WorkerOutcome::default();
        let mut state = WorkerState::Idle;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                url = self.drain.next() => url,
            };

            let Some(url) = next else { break };
            outcome.processed += 1;

            if self.process(url, &mut state, &mut outcome).await.is_break() {
                break;
            }
        }

        self.advance(&mut state, WorkerState::Terminated);
        tracing::debug!(
            worker = self.id,
            processed = outcome.processed,
            saved = outcome.saved,
            "Worker terminated"
        );

        outcome
    }

    /// Handles one item; breaks only on cancellation
    async fn process(
        &self,
        url: String,
        state: &mut WorkerState,
        outcome: &mut WorkerOutcome,
    ) -> ControlFlow<()> {
        self.advance(state, WorkerState::Fetching);

        let deadline = Instant::now() + self.fetch_timeout;
        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!(worker = self.id, url = %url, "Fetch abandoned on cancellation");
                return ControlFlow::Break(());
            }
            result = tokio::time::timeout_at(deadline, self.fetcher.fetch(&url, deadline)) => {
                result.unwrap_or_else(|_| Err(FetchError::DeadlineExceeded { url: url.clone() }))
            }
        };

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(worker = self.id, url = %url, "Skipping: {}", e);
                self.record_failure(outcome, &url, FailureStage::Fetch, &e);
                self.advance(state, WorkerState::Idle);
                self.release(Vec::new());
                return ControlFlow::Continue(());
            }
        };

        self.advance(state, WorkerState::Parsing);
        let content = String::from_utf8_lossy(&page.body);
        let links = self.extractor.extract(&content);

        self.advance(state, WorkerState::Saving);
        let summary = PageSummary::new(url.as_str(), page.body.len(), links.len());
        match self.store.save(summary) {
            Ok(()) => {
                outcome.saved += 1;
                tracing::debug!(
                    worker = self.id,
                    url = %url,
                    bytes = page.body.len(),
                    links = links.len(),
                    "Saved page"
                );
            }
            Err(e) => {
                tracing::warn!(worker = self.id, url = %url, "Failed to save page: {}", e);
                self.record_failure(outcome, &url, FailureStage::Store, &e);
            }
        }

        self.advance(state, WorkerState::Idle);
        self.release(links);
        ControlFlow::Continue(())
    }

    fn advance(&self, state: &mut WorkerState, next: WorkerState) {
        advance_state(self.id, state, next);
    }

    fn record_failure(
        &self,
        outcome: &mut WorkerOutcome,
        url: &str,
        stage: FailureStage,
        error: &dyn Display,
    ) {
        outcome.failed += 1;
        if self.collect_failures {
            outcome.failures.push(ItemFailure {
                url: url.to_string(),
                stage,
                error: error.to_string(),
            });
        }
    }

    /// Marks the current item finished, first admitting its links when following them
    ///
    /// Admission runs on a separate task so a full queue never blocks the
    /// worker that is supposed to drain it.
    fn release(&self, links: Vec<String>) {
        if !self.follow_links {
            return;
        }

        if links.is_empty() {
            if self.in_flight.finish() {
                self.frontier.close();
            }
            return;
        }

        let frontier = Arc::clone(&self.frontier);
        let in_flight = Arc::clone(&self.in_flight);
        let cancel = self.cancel.clone();

        self.link_tasks.spawn(async move {
            for link in links {
                in_flight.begin();
                let admitted = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    admitted = frontier.enqueue(link) => admitted,
                };
                if !admitted {
                    // The parent item is still counted, so this never reaches zero
                    in_flight.finish();
                }
            }

            if in_flight.finish() {
                frontier.close();
            }
        });
    }
}
