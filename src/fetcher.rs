//! Concurrent candidate-page retrieval with per-URL failure isolation.
//!
//! Fetches a batch of URLs through a bounded worker pool and hands each
//! body to the content extractor. A failed URL (timeout, non-2xx, parse
//! failure) is logged and dropped; it never aborts or delays its siblings.
//! Results are harvested as they complete, so one slow host cannot hold
//! back the rest of the batch beyond its own timeout.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};

use crate::config::SearchConfig;
use crate::content;
use crate::error::{Result, SearchError};
use crate::http;
use crate::types::PageContent;

/// Bounded-concurrency page fetcher.
///
/// Holds one [`reqwest::Client`] for connection reuse across the batch.
/// The per-URL timeout comes from the client configuration; there is no
/// batch-wide deadline, so worst-case wall time is
/// `ceil(n / max_workers) × fetch_timeout`.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    max_workers: usize,
}

impl PageFetcher {
    /// Build a fetcher from pipeline configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Fetch`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config)?,
            max_workers: config.max_workers,
        })
    }

    /// Fetch and parse every URL, returning the pages that succeeded.
    ///
    /// The returned map contains one entry per successfully fetched and
    /// parsed URL; failed URLs are simply absent. Never returns an error:
    /// per-URL failures are logged with their URL and swallowed.
    pub async fn fetch_all(&self, urls: &[String]) -> HashMap<String, PageContent> {
        let outcomes: Vec<(String, Result<PageContent>)> = stream::iter(urls.iter().cloned())
            .map(|url| {
                let client = self.client.clone();
                async move {
                    let outcome = fetch_one(&client, &url).await;
                    (url, outcome)
                }
            })
            .buffer_unordered(self.max_workers.max(1))
            .collect()
            .await;

        let mut pages = HashMap::new();
        for (url, outcome) in outcomes {
            match outcome {
                Ok(page) => {
                    pages.insert(url, page);
                }
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "candidate page skipped");
                }
            }
        }

        tracing::debug!(
            fetched = pages.len(),
            requested = urls.len(),
            "page fetch batch complete"
        );
        pages
    }
}

/// Fetch a single URL and extract its content.
async fn fetch_one(client: &reqwest::Client, url: &str) -> Result<PageContent> {
    let response = client
        .get(url)
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| SearchError::Fetch(format!("request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Fetch(format!("HTTP status error: {e}")))?;

    let html = response
        .text()
        .await
        .map_err(|e| SearchError::Fetch(format!("body read failed: {e}")))?;

    content::parse_page(&html, url)
}
