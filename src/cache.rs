//! In-memory cache for ranked search results and other pipeline payloads.
//!
//! Cache-aside store keyed by `(category, identifier)`. Entries carry their
//! own logical expiry timestamp so callers can choose between fresh reads
//! ([`ResultCache::get`]) and stale-tolerant reads ([`ResultCache::get_stale`])
//! used as a fallback when the search provider is rate limited. Uses [`moka`]
//! for async-friendly storage with automatic capacity eviction.
//!
//! Every operation is non-throwing: serialization or lookup problems are
//! logged and reported as a miss (`None`) or a failed write (`false`), so
//! the rest of the pipeline proceeds as though the cache were empty.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Maximum number of cached entries across all categories.
const MAX_CACHE_ENTRIES: u64 = 100;

/// Namespaces for cache keys, one per subsystem.
///
/// Scoping keys by category keeps identifiers from different subsystems
/// from colliding even when the identifier strings are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    /// Ranked URL lists produced by the search pipeline.
    SearchResults,
    /// Content-addressed identity of already-processed files.
    ProcessedFiles,
}

impl CacheCategory {
    /// Stable name used in key derivation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SearchResults => "search_results",
            Self::ProcessedFiles => "processed_files",
        }
    }
}

/// Composite cache key: category name + identifier digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    category: &'static str,
    digest: u64,
}

impl CacheKey {
    /// Build a deterministic cache key from a category and identifier.
    ///
    /// The identifier is trimmed and lowercased before hashing so that
    /// `"Rust Async"` and `"  rust async "` map to the same entry. The
    /// same `(category, identifier)` pair always yields the same key,
    /// which is what makes stale re-reads after a failed refresh work.
    pub fn new(category: CacheCategory, identifier: &str) -> Self {
        let normalised = identifier.trim().to_lowercase();
        let mut hasher = DefaultHasher::new();
        normalised.hash(&mut hasher);
        Self {
            category: category.name(),
            digest: hasher.finish(),
        }
    }
}

/// A stored payload with its logical expiry.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// JSON-serialised payload.
    payload: String,
    /// Unix timestamp (seconds) after which the entry is stale.
    expires_at: u64,
}

/// Category-scoped cache with TTL-based logical expiry.
///
/// Entries past their TTL are invisible to [`get`](Self::get) but remain
/// readable through [`get_stale`](Self::get_stale) until capacity eviction
/// removes them.
#[derive(Debug, Clone)]
pub struct ResultCache {
    store: Cache<CacheKey, CacheEntry>,
}

impl ResultCache {
    /// Create an empty cache bounded to [`MAX_CACHE_ENTRIES`] entries.
    pub fn new() -> Self {
        Self {
            store: Cache::builder().max_capacity(MAX_CACHE_ENTRIES).build(),
        }
    }

    /// Look up a fresh (unexpired) payload.
    ///
    /// Returns `None` on miss, on logical expiry, and on deserialization
    /// failure. Never returns an error.
    pub async fn get<T: DeserializeOwned>(
        &self,
        category: CacheCategory,
        identifier: &str,
    ) -> Option<T> {
        let key = CacheKey::new(category, identifier);
        let entry = self.store.get(&key).await?;
        if now_unix() >= entry.expires_at {
            tracing::debug!(category = category.name(), "cache entry expired");
            return None;
        }
        decode(&entry.payload, category)
    }

    /// Look up a payload regardless of expiry.
    ///
    /// Used as a fallback when a fresh recompute is impossible (for
    /// example, the search provider is rate limiting). Returns `None`
    /// only when no entry exists at all or it cannot be decoded.
    pub async fn get_stale<T: DeserializeOwned>(
        &self,
        category: CacheCategory,
        identifier: &str,
    ) -> Option<T> {
        let key = CacheKey::new(category, identifier);
        let entry = self.store.get(&key).await?;
        decode(&entry.payload, category)
    }

    /// Store a payload under `(category, identifier)` with the given TTL.
    ///
    /// Returns `true` if the payload was stored. A TTL of 0 disables
    /// caching (nothing is written). Serialization failure is logged and
    /// reported as `false`, never raised.
    pub async fn set<T: Serialize>(
        &self,
        category: CacheCategory,
        identifier: &str,
        payload: &T,
        ttl_seconds: u64,
    ) -> bool {
        if ttl_seconds == 0 {
            return false;
        }
        let json = match serde_json::to_string(payload) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(
                    category = category.name(),
                    error = %err,
                    "cache payload serialization failed"
                );
                return false;
            }
        };
        let key = CacheKey::new(category, identifier);
        let entry = CacheEntry {
            payload: json,
            expires_at: now_unix().saturating_add(ttl_seconds),
        };
        self.store.insert(key, entry).await;
        true
    }

    /// Remove the entry for `(category, identifier)`, if any.
    pub async fn invalidate(&self, category: CacheCategory, identifier: &str) {
        let key = CacheKey::new(category, identifier);
        self.store.invalidate(&key).await;
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a stored JSON payload, logging and absorbing failures.
fn decode<T: DeserializeOwned>(payload: &str, category: CacheCategory) -> Option<T> {
    match serde_json::from_str(payload) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(
                category = category.name(),
                error = %err,
                "cache payload deserialization failed"
            );
            None
        }
    }
}

/// Current time as Unix seconds. Falls back to 0 if the system clock
/// is before the epoch.
fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RankedUrlsPayload;

    #[test]
    fn cache_key_deterministic_for_same_inputs() {
        let key1 = CacheKey::new(CacheCategory::SearchResults, "rust programming+5");
        let key2 = CacheKey::new(CacheCategory::SearchResults, "rust programming+5");
        assert_eq!(key1, key2);
    }

    #[test]
    fn cache_key_differs_when_identifier_differs() {
        let key1 = CacheKey::new(CacheCategory::SearchResults, "rust");
        let key2 = CacheKey::new(CacheCategory::SearchResults, "python");
        assert_ne!(key1, key2);
    }

    #[test]
    fn cache_key_differs_across_categories() {
        let key1 = CacheKey::new(CacheCategory::SearchResults, "same-id");
        let key2 = CacheKey::new(CacheCategory::ProcessedFiles, "same-id");
        assert_ne!(key1, key2);
    }

    #[test]
    fn cache_key_normalises_case_and_whitespace() {
        let key1 = CacheKey::new(CacheCategory::SearchResults, "  RUST Async  ");
        let key2 = CacheKey::new(CacheCategory::SearchResults, "rust async");
        assert_eq!(key1, key2);
    }

    #[tokio::test]
    async fn miss_returns_none() {
        let cache = ResultCache::new();
        let result: Option<RankedUrlsPayload> = cache
            .get(CacheCategory::SearchResults, "nonexistent_query_xyz")
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = ResultCache::new();
        let payload = RankedUrlsPayload::new(vec!["https://cached.com/a".into()]);

        let stored = cache
            .set(CacheCategory::SearchResults, "round_trip", &payload, 600)
            .await;
        assert!(stored);

        let fetched: Option<RankedUrlsPayload> =
            cache.get(CacheCategory::SearchResults, "round_trip").await;
        let fetched = fetched.expect("should be cached");
        assert_eq!(fetched, payload);
    }

    #[tokio::test]
    async fn zero_ttl_disables_writes() {
        let cache = ResultCache::new();
        let payload = RankedUrlsPayload::new(vec!["https://a.com".into()]);

        let stored = cache
            .set(CacheCategory::SearchResults, "disabled", &payload, 0)
            .await;
        assert!(!stored);

        let fetched: Option<RankedUrlsPayload> =
            cache.get(CacheCategory::SearchResults, "disabled").await;
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn expired_entry_invisible_to_get_but_stale_readable() {
        let cache = ResultCache::new();
        let payload = RankedUrlsPayload::new(vec!["https://stale.com".into()]);
        let json = serde_json::to_string(&payload).expect("serialize");

        // Insert an already-expired entry directly.
        let key = CacheKey::new(CacheCategory::SearchResults, "expired_query");
        cache
            .store
            .insert(
                key,
                CacheEntry {
                    payload: json,
                    expires_at: 0,
                },
            )
            .await;

        let fresh: Option<RankedUrlsPayload> =
            cache.get(CacheCategory::SearchResults, "expired_query").await;
        assert!(fresh.is_none());

        let stale: Option<RankedUrlsPayload> = cache
            .get_stale(CacheCategory::SearchResults, "expired_query")
            .await;
        assert_eq!(stale.expect("stale read should succeed"), payload);
    }

    #[tokio::test]
    async fn get_stale_also_returns_fresh_entries() {
        let cache = ResultCache::new();
        let payload = RankedUrlsPayload::new(vec!["https://fresh.com".into()]);
        cache
            .set(CacheCategory::SearchResults, "fresh_query", &payload, 600)
            .await;

        let stale: Option<RankedUrlsPayload> = cache
            .get_stale(CacheCategory::SearchResults, "fresh_query")
            .await;
        assert_eq!(stale.expect("should read"), payload);
    }

    #[tokio::test]
    async fn corrupt_payload_reads_as_miss() {
        let cache = ResultCache::new();
        let key = CacheKey::new(CacheCategory::SearchResults, "corrupt");
        cache
            .store
            .insert(
                key,
                CacheEntry {
                    payload: "{not valid json".into(),
                    expires_at: u64::MAX,
                },
            )
            .await;

        let fetched: Option<RankedUrlsPayload> =
            cache.get(CacheCategory::SearchResults, "corrupt").await;
        assert!(fetched.is_none());

        let stale: Option<RankedUrlsPayload> =
            cache.get_stale(CacheCategory::SearchResults, "corrupt").await;
        assert!(stale.is_none());
    }

    #[tokio::test]
    async fn overwrite_same_key_updates_value() {
        let cache = ResultCache::new();
        let old = RankedUrlsPayload::new(vec!["https://old.com".into()]);
        let new = RankedUrlsPayload::new(vec!["https://new.com".into()]);

        cache
            .set(CacheCategory::SearchResults, "overwrite", &old, 600)
            .await;
        cache
            .set(CacheCategory::SearchResults, "overwrite", &new, 600)
            .await;

        let fetched: Option<RankedUrlsPayload> =
            cache.get(CacheCategory::SearchResults, "overwrite").await;
        assert_eq!(fetched.expect("should be cached").urls[0], "https://new.com");
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = ResultCache::new();
        let payload = RankedUrlsPayload::new(vec!["https://gone.com".into()]);
        cache
            .set(CacheCategory::SearchResults, "invalidate_me", &payload, 600)
            .await;
        cache
            .invalidate(CacheCategory::SearchResults, "invalidate_me")
            .await;

        let fetched: Option<RankedUrlsPayload> = cache
            .get_stale(CacheCategory::SearchResults, "invalidate_me")
            .await;
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn categories_do_not_collide() {
        let cache = ResultCache::new();
        let results = RankedUrlsPayload::new(vec!["https://results.com".into()]);
        cache
            .set(CacheCategory::SearchResults, "shared-id", &results, 600)
            .await;

        let other: Option<RankedUrlsPayload> =
            cache.get(CacheCategory::ProcessedFiles, "shared-id").await;
        assert!(other.is_none());
    }

    #[test]
    fn category_names_are_stable() {
        assert_eq!(CacheCategory::SearchResults.name(), "search_results");
        assert_eq!(CacheCategory::ProcessedFiles.name(), "processed_files");
    }
}
