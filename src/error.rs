//! Error types for the websift crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. No API keys or sensitive data appear in
//! error messages.

/// Errors that can occur while searching and ranking web pages.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search provider was unreachable or rejected the request.
    #[error("provider error: {0}")]
    Provider(String),

    /// The search provider rejected the request with HTTP 429.
    #[error("provider rate limited: {0}")]
    RateLimited(String),

    /// Fetching a candidate page failed (network error, timeout, non-2xx).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Failed to extract usable content from a fetched page.
    #[error("parse error: {0}")]
    Parse(String),

    /// The embedding model could not be loaded or failed to encode.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for websift results.
pub type Result<T> = std::result::Result<T, SearchError>;
