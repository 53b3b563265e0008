//! End-to-end search pipeline: discover, filter, fetch, score, rank.
//!
//! [`SearchPipeline`] wires the provider, page fetcher, embedder, and
//! cache into a single never-failing entry point. Every stage degrades
//! rather than aborts: provider outages fall back to stale cache,
//! unreachable pages are skipped, and embedding failures downgrade the
//! response to unranked candidates.

use std::sync::Arc;

use crate::cache::{CacheCategory, ResultCache};
use crate::config::SearchConfig;
use crate::embedding::Embedder;
use crate::error::{Result, SearchError};
use crate::fetcher::PageFetcher;
use crate::filter::filter_candidates;
use crate::graph::SimilarityGraphBuilder;
use crate::providers::SearchProvider;
use crate::ranking;
use crate::types::{PageContent, RankedUrlsPayload};

/// Number of results returned when the caller does not specify a count.
pub const DEFAULT_RESULT_COUNT: usize = 5;

/// Semantic web search pipeline.
///
/// Holds the injected discovery provider and embedder together with the
/// page fetcher and result cache built from the configuration. The
/// pipeline is cheap to clone-share behind an `Arc` and safe to call
/// concurrently.
pub struct SearchPipeline {
    provider: Arc<dyn SearchProvider>,
    embedder: Arc<dyn Embedder>,
    fetcher: PageFetcher,
    cache: ResultCache,
    config: SearchConfig,
}

impl SearchPipeline {
    /// Assemble a pipeline from its injected parts.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration fails
    /// validation, or [`SearchError::Fetch`] if the fetcher's HTTP
    /// client cannot be constructed.
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        embedder: Arc<dyn Embedder>,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;
        let fetcher = PageFetcher::new(&config)?;
        Ok(Self {
            provider,
            embedder,
            fetcher,
            cache: ResultCache::new(),
            config,
        })
    }

    /// Search the web and return up to `count` URLs, most relevant first.
    ///
    /// This entry point never fails: any upstream problem degrades the
    /// response, down to an empty list in the worst case.
    ///
    /// # Pipeline
    ///
    /// 1. Serve a fresh cache hit for `(query, count)` if one exists
    /// 2. Query the provider for up to `max_candidates` URLs; on rate
    ///    limiting or provider failure, serve stale cached results
    /// 3. Drop denylisted and malformed candidates
    /// 4. Fetch surviving pages concurrently, skipping failures
    /// 5. Embed and score pages against the query, rank by similarity;
    ///    if nothing was fetched or embedding fails, fall back to the
    ///    filtered candidates in provider order, uncached
    /// 6. Pad short rankings with leftover candidates in provider order
    /// 7. Cache the ranked list and return it
    pub async fn search(&self, query: &str, count: usize) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }

        let cache_id = cache_identifier(query, count);

        // 1. Fresh cache hit short-circuits everything else.
        if let Some(payload) = self
            .cache
            .get::<RankedUrlsPayload>(CacheCategory::SearchResults, &cache_id)
            .await
            .filter(RankedUrlsPayload::is_current)
        {
            tracing::debug!(query, count, "serving cached results");
            return payload.urls;
        }

        // 2. Candidate discovery, with stale-cache fallback on failure.
        let candidates = match self.provider.query(query, self.config.max_candidates).await {
            Ok(urls) => urls,
            Err(SearchError::RateLimited(msg)) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error = %msg,
                    "provider rate limited, trying stale cache"
                );
                return self.stale_results(&cache_id).await;
            }
            Err(err) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error = %err,
                    "provider query failed, trying stale cache"
                );
                return self.stale_results(&cache_id).await;
            }
        };

        if candidates.is_empty() {
            tracing::debug!(query, "provider returned no candidates");
            return Vec::new();
        }

        // 3. Denylist and malformed-URL filtering.
        let filtered = filter_candidates(&candidates, &self.config.denylist);
        if filtered.is_empty() {
            tracing::debug!(query, "no candidates survived filtering");
            return Vec::new();
        }

        // 4. Concurrent page fetch; unreachable pages drop out here.
        let pages_by_url = self.fetcher.fetch_all(&filtered).await;

        // Reassemble in candidate order so scoring and tie-breaking stay
        // deterministic for a given provider response.
        let pages: Vec<PageContent> = filtered
            .iter()
            .filter_map(|url| pages_by_url.get(url).cloned())
            .collect();

        if pages.is_empty() {
            tracing::warn!(query, "no pages fetched, returning unranked candidates");
            return truncated(filtered, count);
        }

        // 5. Score against the query and rank by similarity.
        let builder = SimilarityGraphBuilder::new(Arc::clone(&self.embedder), &self.config);
        let graph = match builder.build(&pages, query) {
            Ok(graph) => graph,
            Err(err) => {
                tracing::warn!(
                    query,
                    error = %err,
                    "scoring failed, returning unranked candidates"
                );
                return truncated(filtered, count);
            }
        };
        let mut results = ranking::select_top(&graph, count);

        // 6. Pad short rankings from the leftover candidates.
        if results.len() < count {
            pad_results(&mut results, &filtered, count);
        }

        // 7. Cache the full ranked list for repeat queries.
        let payload = RankedUrlsPayload::new(results.clone());
        self.cache
            .set(
                CacheCategory::SearchResults,
                &cache_id,
                &payload,
                self.config.cache_ttl_seconds,
            )
            .await;

        tracing::debug!(query, returned = results.len(), "search complete");
        results
    }

    /// Search with the default result count.
    pub async fn search_default(&self, query: &str) -> Vec<String> {
        self.search(query, DEFAULT_RESULT_COUNT).await
    }

    /// Serve expired cached results, or an empty list if none exist.
    async fn stale_results(&self, cache_id: &str) -> Vec<String> {
        match self
            .cache
            .get_stale::<RankedUrlsPayload>(CacheCategory::SearchResults, cache_id)
            .await
            .filter(RankedUrlsPayload::is_current)
        {
            Some(payload) => {
                tracing::info!(count = payload.urls.len(), "serving stale cached results");
                payload.urls
            }
            None => Vec::new(),
        }
    }
}

/// Cache identifier binding a query to its requested result count.
fn cache_identifier(query: &str, count: usize) -> String {
    format!("{query}+{count}")
}

/// Truncate a candidate list to at most `count` URLs.
fn truncated(mut urls: Vec<String>, count: usize) -> Vec<String> {
    urls.truncate(count);
    urls
}

/// Append candidates not already selected until `count` is reached.
fn pad_results(results: &mut Vec<String>, candidates: &[String], count: usize) {
    for url in candidates {
        if results.len() >= count {
            break;
        }
        if !results.iter().any(|selected| selected == url) {
            results.push(url.clone());
        }
    }
}
