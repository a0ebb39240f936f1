use serde::Deserialize;

/// Main configuration structure for Ripple-Crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// URLs to seed the frontier with
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// Worker pool behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of concurrent workers (non-positive means the default of 2)
    pub workers: i64,

    /// Frontier queue capacity (0 means "number of seeds")
    #[serde(rename = "queue-capacity")]
    pub queue_capacity: usize,

    /// Deadline for a single fetch (milliseconds)
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,

    /// Deadline for the whole run (milliseconds, 0 disables it)
    #[serde(rename = "run-timeout-ms")]
    pub run_timeout_ms: u64,

    /// Feed discovered links back into the frontier
    #[serde(rename = "follow-links")]
    pub follow_links: bool,

    /// Maximum number of URLs ever admitted (0 means unbounded)
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Record every skipped item in the crawl report
    #[serde(rename = "collect-failures")]
    pub collect_failures: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 0,
            fetch_timeout_ms: 10_000,
            run_timeout_ms: 0,
            follow_links: false,
            max_pages: 0,
            collect_failures: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "RippleCrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/ripple-crawl".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the markdown summary file (empty disables the export)
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}
