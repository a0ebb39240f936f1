//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl run,
//! including the overview counters and any collected failures.

use crate::output::stats::CrawlStatistics;
use crate::output::{OutputError, OutputResult};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum number of failures listed in the summary table
const MAX_LISTED_FAILURES: usize = 50;

/// Writes a markdown summary of the run to `output_path`
///
/// # Arguments
///
/// * `stats` - Statistics for the finished run
/// * `config_hash` - Hash of the configuration the run used, if any
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    stats: &CrawlStatistics,
    config_hash: Option<&str>,
    output_path: &Path,
) -> OutputResult<()> {
    if output_path.as_os_str().is_empty() {
        return Err(OutputError::Write("summary path is empty".to_string()));
    }

    let markdown = format_markdown_summary(stats, config_hash, Utc::now());

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote crawl summary to {}", output_path.display());
    Ok(())
}

/// Formats run statistics as markdown
///
/// # Arguments
///
/// * `stats` - Statistics for the finished run
/// * `config_hash` - Hash of the configuration the run used, if any
/// * `generated_at` - Timestamp printed in the header
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(
    stats: &CrawlStatistics,
    config_hash: Option<&str>,
    generated_at: DateTime<Utc>,
) -> String {
    let mut md = String::new();

    md.push_str("# Ripple-Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Generated**: {}\n", generated_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.elapsed.as_secs_f64()
    ));
    let status = if stats.cancelled {
        "cancelled"
    } else {
        "completed"
    };
    md.push_str(&format!("- **Status**: {}\n", status));
    if let Some(hash) = config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Seeds | {} |\n", stats.seeds));
    md.push_str(&format!("| Admitted | {} |\n", stats.admitted));
    md.push_str(&format!("| Processed | {} |\n", stats.processed));
    md.push_str(&format!("| Saved | {} |\n", stats.saved));
    md.push_str(&format!("| Skipped | {} |\n", stats.failed));
    md.push_str(&format!("| Bytes | {} |\n", stats.total_bytes));
    md.push_str(&format!("| Links | {} |\n", stats.total_links));
    md.push_str(&format!(
        "| Success Rate | {:.2}% |\n\n",
        stats.success_rate()
    ));

    if !stats.failures.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| Stage | URL | Error |\n");
        md.push_str("|-------|-----|-------|\n");

        for failure in stats.failures.iter().take(MAX_LISTED_FAILURES) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failure.stage,
                escape_cell(&failure.url),
                escape_cell(&failure.error)
            ));
        }

        if stats.failures.len() > MAX_LISTED_FAILURES {
            md.push_str(&format!(
                "\n... and {} more\n",
                stats.failures.len() - MAX_LISTED_FAILURES
            ));
        }
        md.push('\n');
    } else if stats.failed > 0 {
        md.push_str(&format!(
            "_{} items were skipped; enable `collect-failures` for details._\n\n",
            stats.failed
        ));
    }

    md
}

/// Keeps table cells on one line and out of the column separators
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
