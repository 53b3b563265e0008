//! # websift
//!
//! Semantic web search as a library: ask a web search API for candidate
//! pages, read them, and return the URLs whose content actually matches
//! the query.
//!
//! ## Design
//!
//! - Pluggable discovery backends (Brave Search API, Google Programmable
//!   Search) behind the [`SearchProvider`] trait
//! - Host denylist and URL hygiene filtering before any page is fetched
//! - Bounded-concurrency page fetching; unreachable pages are skipped,
//!   never fatal
//! - Local MiniLM sentence embeddings (ONNX) score each page against the
//!   query; no embedding service required
//! - Similarity graph plus max-priority selection turn scores into a
//!   stable ranking
//! - In-memory TTL cache with stale fallback when a provider rate-limits
//!
//! The top-level entry point, [`SearchPipeline::search`], never fails:
//! every upstream problem degrades the response, down to an empty list.
//!
//! ## Security
//!
//! - API keys stay inside the provider the caller constructs; nothing is
//!   read from the environment
//! - Search queries are logged only at trace level
//! - No network listeners; this is a library, not a server
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> websift::Result<()> {
//! use std::sync::Arc;
//! use websift::{BraveProvider, MiniLmEmbedder, SearchConfig, SearchPipeline};
//!
//! let provider = Arc::new(BraveProvider::new("brave-api-key")?);
//! let embedder = Arc::new(MiniLmEmbedder::new());
//! let pipeline = SearchPipeline::new(provider, embedder, SearchConfig::default())?;
//!
//! let urls = pipeline.search("rust async runtimes", 5).await;
//! for url in &urls {
//!     println!("{url}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod content;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod graph;
pub mod http;
pub mod providers;
pub mod ranking;
pub mod types;

pub use config::SearchConfig;
pub use embedding::{Embedder, MiniLmEmbedder};
pub use engine::{SearchPipeline, DEFAULT_RESULT_COUNT};
pub use error::{Result, SearchError};
pub use providers::{BraveProvider, Freshness, GoogleProvider, SearchProvider};
pub use types::{Document, PageContent, RankedUrlsPayload};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_result_count_is_five() {
        assert_eq!(DEFAULT_RESULT_COUNT, 5);
    }

    #[test]
    fn re_exported_config_default_validates() {
        assert!(SearchConfig::default().validate().is_ok());
    }
}
