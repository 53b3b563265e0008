//! Candidate discovery backends.
//!
//! Each module provides a struct implementing [`SearchProvider`] that
//! queries a specific web search API and extracts candidate URLs from
//! its JSON response.

use async_trait::async_trait;

use crate::error::Result;

pub mod brave;
pub mod google;

pub use brave::{BraveProvider, Freshness};
pub use google::GoogleProvider;

/// A pluggable web search backend.
///
/// Implementors call a specific search API and return candidate URLs in
/// the provider's own ranking order. Each provider handles its own:
///
/// - request construction and authentication
/// - quota/rate-limit detection
/// - response parsing
///
/// All implementations must be `Send + Sync`; the pipeline holds one
/// behind an `Arc<dyn SearchProvider>`.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Query the provider and return up to `count` candidate URLs.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::RateLimited`](crate::error::SearchError::RateLimited)
    /// when the provider rejects the request with HTTP 429, or
    /// [`SearchError::Provider`](crate::error::SearchError::Provider) for
    /// any other request or parse failure.
    async fn query(&self, text: &str, count: usize) -> Result<Vec<String>>;
}
