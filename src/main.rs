//! Ripple-Crawl main entry point
//!
//! This is the command-line interface for the Ripple-Crawl pipeline.

use anyhow::Context;
use clap::Parser;
use ripple_crawl::config::{load_config_with_hash, validate, Config};
use ripple_crawl::crawler::{crawl, PipelineOptions};
use ripple_crawl::output::{generate_markdown_summary, print_statistics, CrawlStatistics};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Ripple-Crawl: a small concurrent crawl pipeline
///
/// Ripple-Crawl fetches a set of seed URLs with a fixed pool of workers,
/// counts the outbound links on every page, and reports what it saved.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version)]
#[command(about = "A small concurrent crawl pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL (repeatable; added to the configured seeds)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Number of concurrent workers
    #[arg(long)]
    workers: Option<i64>,

    /// Follow discovered links instead of a single pass over the seeds
    #[arg(long)]
    follow_links: bool,

    /// Maximum number of distinct URLs to admit
    #[arg(long)]
    max_pages: Option<usize>,

    /// Record every skipped URL in the report
    #[arg(long)]
    collect_failures: bool,

    /// Overall run deadline in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (cfg, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, Some(hash))
        }
        None => (Config::default(), None),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    if config.seeds.is_empty() {
        anyhow::bail!("No seed URLs given; add `seeds` to the config or pass --seed");
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(&config, config_hash.as_deref()).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            2 => EnvFilter::new("ripple_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line values on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    config.seeds.extend(cli.seeds.iter().cloned());

    if let Some(workers) = cli.workers {
        config.pipeline.workers = workers;
    }
    if cli.follow_links {
        config.pipeline.follow_links = true;
    }
    if let Some(max_pages) = cli.max_pages {
        config.pipeline.max_pages = max_pages;
    }
    if cli.collect_failures {
        config.pipeline.collect_failures = true;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.pipeline.run_timeout_ms = timeout_ms;
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    let options = PipelineOptions::from_config(&config.pipeline);

    println!("=== Ripple-Crawl Dry Run ===\n");

    println!("Pipeline Configuration:");
    println!("  Workers: {}", options.effective_workers());
    match options.queue_capacity {
        Some(capacity) => println!("  Queue capacity: {}", capacity),
        None => println!("  Queue capacity: {} (one per seed)", config.seeds.len()),
    }
    println!("  Fetch timeout: {}ms", config.pipeline.fetch_timeout_ms);
    match options.run_timeout {
        Some(limit) => println!("  Run timeout: {}ms", limit.as_millis()),
        None => println!("  Run timeout: none"),
    }
    println!("  Follow links: {}", options.follow_links);
    if let Some(max_pages) = options.max_pages {
        println!("  Max pages: {}", max_pages);
    }
    println!("  Collect failures: {}", options.collect_failures);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    if !config.output.summary_path.is_empty() {
        println!("\nSummary: {}", config.output.summary_path);
    }

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: Option<&str>) -> anyhow::Result<()> {
    tracing::info!("Total seed URLs: {}", config.seeds.len());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            on_signal.cancel();
        }
    });

    let (report, store) = crawl(config, cancel)
        .await
        .context("Failed to start crawl")?;

    let stats = CrawlStatistics::from_run(&report, &store);
    print_statistics(&stats);

    if !config.output.summary_path.is_empty() {
        generate_markdown_summary(&stats, config_hash, Path::new(&config.output.summary_path))
            .context("Failed to write summary")?;
        println!("\n✓ Summary exported to: {}", config.output.summary_path);
    }

    Ok(())
}
