//! HTTP fetcher implementation
//!
//! This module defines the [`Fetcher`] contract consumed by the worker pool and
//! its reqwest-backed implementation:
//! - Building HTTP clients with proper user agent strings
//! - GET requests bounded by a caller-supplied deadline
//! - Error classification (transport, HTTP status, deadline)

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The URL that was requested
    pub url: String,

    /// HTTP status code (always 2xx for a successful fetch)
    pub status_code: u16,

    /// Raw response body
    pub body: Vec<u8>,

    /// Content-Type header value (empty if absent)
    pub content_type: String,
}

/// Reasons a single fetch can fail
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Unexpected status {status_code} for {url}")]
    Status { url: String, status_code: u16 },

    #[error("Deadline exceeded fetching {url}")]
    DeadlineExceeded { url: String },

    #[error("Fetch failed for {url}: {reason}")]
    Other { url: String, reason: String },
}

impl FetchError {
    /// The URL the failed fetch was for
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::DeadlineExceeded { url }
            | Self::Other { url, .. } => url,
        }
    }
}

/// Retrieves page content for the worker pool
///
/// Implementations should give up once `deadline` passes; the pool also
/// enforces it from the outside.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, deadline: Instant) -> Result<FetchResult, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::UserAgentConfig;
/// use ripple_crawl::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher that issues plain GET requests
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with a client configured from the user agent section
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }

    fn classify(url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::DeadlineExceeded {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, deadline: Instant) -> Result<FetchResult, FetchError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(FetchError::DeadlineExceeded {
                url: url.to_string(),
            });
        }

        let response = self
            .client
            .get(url)
            .timeout(remaining)
            .send()
            .await
            .map_err(|e| Self::classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::classify(url, e))?;

        tracing::debug!(url, status = status.as_u16(), bytes = body.len(), "Fetched");

        Ok(FetchResult {
            url: url.to_string(),
            status_code: status.as_u16(),
            body: body.to_vec(),
            content_type,
        })
    }
}
