//! Core types shared across the search pipeline.

use serde::{Deserialize, Serialize};

/// Current schema version for [`RankedUrlsPayload`] cache entries.
///
/// Bumped whenever the payload shape changes so stale cache entries
/// written by an older build are treated as misses, not misread.
pub const RANKED_URLS_SCHEMA_VERSION: u32 = 1;

/// Extracted readable content from a fetched web page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL that was fetched.
    pub url: String,
    /// The page title extracted from HTML. Empty if the page has no title.
    pub title: String,
    /// Cleaned, readable text content with HTML boilerplate stripped.
    pub text: String,
}

/// A successfully fetched, parsed, and scored page.
///
/// Documents exist only inside a single search invocation: they are
/// created at graph-build time and discarded with the graph.
#[derive(Debug, Clone)]
pub struct Document {
    /// The page URL. Natural key: no two documents share a URL
    /// within one similarity graph.
    pub url: String,
    /// The page title. May be empty.
    pub title: String,
    /// Extracted page text used for embedding.
    pub text: String,
    /// Sentence embedding of the page text (L2-normalised).
    pub embedding: Vec<f32>,
    /// Cosine similarity between this document's embedding and the
    /// query embedding. Computed once at graph-build time.
    pub score: f32,
}

/// Versioned cache payload holding a ranked URL list.
///
/// Stored under the search-results cache category. The explicit
/// `version` field guards against shape drift between the code that
/// wrote an entry and the code reading it back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedUrlsPayload {
    /// Schema version; readers reject anything other than
    /// [`RANKED_URLS_SCHEMA_VERSION`].
    pub version: u32,
    /// Ranked URLs, most relevant first.
    pub urls: Vec<String>,
}

impl RankedUrlsPayload {
    /// Wrap a ranked URL list in the current schema version.
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            version: RANKED_URLS_SCHEMA_VERSION,
            urls,
        }
    }

    /// Whether this payload was written with the current schema version.
    pub fn is_current(&self) -> bool {
        self.version == RANKED_URLS_SCHEMA_VERSION
    }
}
