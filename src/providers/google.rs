//! Google Programmable Search provider.
//!
//! Queries the Custom Search JSON API, which requires both an API key
//! and a search engine identifier (`cx`). The free tier allows 100
//! queries per day; past that Google answers HTTP 429.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::SearchProvider;
use crate::error::{Result, SearchError};

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Google Custom Search JSON API client.
pub struct GoogleProvider {
    api_key: String,
    engine_id: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a provider from an API key and search engine identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Provider`] if the HTTP client cannot be
    /// constructed.
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SearchError::Provider(format!("Google client build failed: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            client,
        })
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn query(&self, text: &str, count: usize) -> Result<Vec<String>> {
        tracing::trace!(query = text, count, "Google search");

        let num_param = count.to_string();
        let params = [
            ("key", self.api_key.as_str()),
            ("cx", self.engine_id.as_str()),
            ("q", text),
            ("num", num_param.as_str()),
        ];

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::Provider(format!("Google request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited(
                "Google API quota exhausted".into(),
            ));
        }

        let body = response
            .error_for_status()
            .map_err(|e| SearchError::Provider(format!("Google HTTP error: {e}")))?
            .text()
            .await
            .map_err(|e| SearchError::Provider(format!("Google response read failed: {e}")))?;

        tracing::trace!(bytes = body.len(), "Google response received");

        parse_google_response(&body, count)
    }
}

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Deserialize)]
struct GoogleItem {
    link: Option<String>,
}

/// Parse a Custom Search JSON response into candidate URLs.
///
/// Extracted as a separate function for testability with captured
/// responses.
pub(crate) fn parse_google_response(body: &str, max_results: usize) -> Result<Vec<String>> {
    let response: GoogleResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Provider(format!("Google returned invalid JSON: {e}")))?;

    let urls: Vec<String> = response
        .items
        .into_iter()
        .filter_map(|item| item.link)
        .take(max_results)
        .collect();

    tracing::debug!(count = urls.len(), "Google results parsed");
    Ok(urls)
}
