//! Shared test doubles

use async_trait::async_trait;
use ripple_crawl::crawler::{FetchError, FetchResult, Fetcher};
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::time::Instant;

/// Fetcher that answers every URL with the same body, except the ones told to fail
pub struct StubFetcher {
    body: String,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_for(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Every URL fetched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str, _deadline: Instant) -> Result<FetchResult, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        tokio::task::yield_now().await;

        if self.failing.contains(url) {
            return Err(FetchError::Other {
                url: url.to_string(),
                reason: "stubbed failure".to_string(),
            });
        }

        Ok(FetchResult {
            url: url.to_string(),
            status_code: 200,
            body: self.body.clone().into_bytes(),
            content_type: "text/html".to_string(),
        })
    }
}
