//! Brave Search API provider.
//!
//! Queries the `api.search.brave.com` web search endpoint, which
//! returns JSON and authenticates via a subscription token header.
//! Brave enforces per-plan quotas and answers HTTP 429 when they are
//! exhausted, which the pipeline treats as a signal to fall back to
//! stale cached results.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::SearchProvider;
use crate::error::{Result, SearchError};

const DEFAULT_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result freshness window accepted by the Brave API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Pages discovered within the last 24 hours.
    Day,
    /// Pages discovered within the last 7 days.
    Week,
    /// Pages discovered within the last 31 days.
    Month,
}

impl Freshness {
    /// The query-parameter code Brave expects.
    fn as_param(self) -> &'static str {
        match self {
            Freshness::Day => "pd",
            Freshness::Week => "pw",
            Freshness::Month => "pm",
        }
    }
}

/// Brave Search API client.
pub struct BraveProvider {
    api_key: String,
    freshness: Option<Freshness>,
    endpoint: String,
    client: reqwest::Client,
}

impl BraveProvider {
    /// Create a provider using the given subscription token.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Provider`] if the HTTP client cannot be
    /// constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SearchError::Provider(format!("Brave client build failed: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            freshness: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            client,
        })
    }

    /// Restrict results to a freshness window.
    #[must_use]
    pub fn with_freshness(mut self, freshness: Freshness) -> Self {
        self.freshness = Some(freshness);
        self
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for BraveProvider {
    fn name(&self) -> &'static str {
        "brave"
    }

    async fn query(&self, text: &str, count: usize) -> Result<Vec<String>> {
        tracing::trace!(query = text, count, "Brave search");

        let count_param = count.to_string();
        let mut params = vec![("q", text), ("count", count_param.as_str())];
        if let Some(freshness) = self.freshness {
            params.push(("freshness", freshness.as_param()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::Provider(format!("Brave request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited(
                "Brave API quota exhausted".into(),
            ));
        }

        let body = response
            .error_for_status()
            .map_err(|e| SearchError::Provider(format!("Brave HTTP error: {e}")))?
            .text()
            .await
            .map_err(|e| SearchError::Provider(format!("Brave response read failed: {e}")))?;

        tracing::trace!(bytes = body.len(), "Brave response received");

        parse_brave_response(&body, count)
    }
}

#[derive(Deserialize)]
struct BraveResponse {
    web: Option<BraveWebSection>,
}

#[derive(Deserialize)]
struct BraveWebSection {
    #[serde(default)]
    results: Vec<BraveWebResult>,
}

#[derive(Deserialize)]
struct BraveWebResult {
    url: Option<String>,
}

/// Parse a Brave API JSON response into candidate URLs.
///
/// Extracted as a separate function for testability with captured
/// responses.
pub(crate) fn parse_brave_response(body: &str, max_results: usize) -> Result<Vec<String>> {
    let response: BraveResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Provider(format!("Brave returned invalid JSON: {e}")))?;

    let urls: Vec<String> = response
        .web
        .map(|web| web.results)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|result| result.url)
        .take(max_results)
        .collect();

    tracing::debug!(count = urls.len(), "Brave results parsed");
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_BRAVE_JSON: &str = r#"{
        "query": {"original": "rust programming"},
        "web": {
            "results": [
                {"title": "Rust Programming Language", "url": "https://www.rust-lang.org/"},
                {"title": "The Book", "url": "https://doc.rust-lang.org/book/"},
                {"title": "Rust - Wikipedia", "url": "https://en.wikipedia.org/wiki/Rust"}
            ]
        }
    }"#;

    #[test]
    fn parse_mock_json_returns_urls_in_order() {
        let urls = parse_brave_response(MOCK_BRAVE_JSON, 10).expect("should parse");
        assert_eq!(
            urls,
            vec![
                "https://www.rust-lang.org/",
                "https://doc.rust-lang.org/book/",
                "https://en.wikipedia.org/wiki/Rust"
            ]
        );
    }

    #[test]
    fn parse_respects_max_results() {
        let urls = parse_brave_response(MOCK_BRAVE_JSON, 2).expect("should parse");
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn parse_empty_response_returns_empty() {
        let urls = parse_brave_response("{}", 10).expect("should parse");
        assert!(urls.is_empty());

        let urls = parse_brave_response(r#"{"web": {"results": []}}"#, 10).expect("should parse");
        assert!(urls.is_empty());
    }

    #[test]
    fn parse_skips_entries_without_url() {
        let body = r#"{"web": {"results": [
            {"title": "no url here"},
            {"url": "https://kept.com/"}
        ]}}"#;
        let urls = parse_brave_response(body, 10).expect("should parse");
        assert_eq!(urls, vec!["https://kept.com/"]);
    }

    #[test]
    fn parse_invalid_json_is_provider_error() {
        let result = parse_brave_response("not json at all", 10);
        assert!(matches!(result, Err(SearchError::Provider(_))));
    }

    #[test]
    fn freshness_codes() {
        assert_eq!(Freshness::Day.as_param(), "pd");
        assert_eq!(Freshness::Week.as_param(), "pw");
        assert_eq!(Freshness::Month.as_param(), "pm");
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BraveProvider>();
    }

    #[tokio::test]
    async fn query_sends_token_and_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .and(header("X-Subscription-Token", "test-key"))
            .and(query_param("q", "rust programming"))
            .and(query_param("count", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_BRAVE_JSON))
            .mount(&server)
            .await;

        let provider = BraveProvider::new("test-key")
            .expect("client")
            .with_endpoint(format!("{}/res/v1/web/search", server.uri()));

        let urls = provider
            .query("rust programming", 3)
            .await
            .expect("should succeed");
        assert_eq!(urls.len(), 3);
    }

    #[tokio::test]
    async fn query_includes_freshness_when_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("freshness", "pw"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let provider = BraveProvider::new("test-key")
            .expect("client")
            .with_freshness(Freshness::Week)
            .with_endpoint(server.uri());

        let urls = provider.query("anything", 5).await.expect("should succeed");
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn http_429_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = BraveProvider::new("test-key")
            .expect("client")
            .with_endpoint(server.uri());

        let result = provider.query("anything", 5).await;
        assert!(matches!(result, Err(SearchError::RateLimited(_))));
    }

    #[tokio::test]
    async fn http_500_maps_to_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = BraveProvider::new("test-key")
            .expect("client")
            .with_endpoint(server.uri());

        let result = provider.query("anything", 5).await;
        assert!(matches!(result, Err(SearchError::Provider(_))));
    }

    #[tokio::test]
    #[ignore] // Live test, needs BRAVE_API_KEY; run with `cargo test -- --ignored`
    async fn live_brave_search() {
        let Ok(key) = std::env::var("BRAVE_API_KEY") else {
            return;
        };
        let provider = BraveProvider::new(key).expect("client");
        let urls = provider
            .query("rust programming", 5)
            .await
            .expect("live search should work");
        assert!(!urls.is_empty());
        for url in &urls {
            assert!(url.starts_with("http"));
        }
    }
}
