//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls candidate volume, fetch concurrency and
//! timeouts, caching, the similarity threshold, and the domain denylist.
//! The defaults match the tuning the pipeline was built around.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};

/// Domains whose pages are skipped during candidate filtering.
///
/// These are high-traffic aggregator or storefront sites whose pages
/// rarely carry extractable long-form text worth ranking.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "reddit.com",
    "amazon.com",
    "quora.com",
    "pinterest.com",
    "youtube.com",
    "facebook.com",
    "ebay.com",
];

/// Configuration for the search-and-rank pipeline.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// How many candidate URLs to request from the search provider.
    pub max_candidates: usize,
    /// Maximum number of concurrent page fetches.
    pub max_workers: usize,
    /// Per-URL fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// How long cached ranked results stay fresh, in seconds.
    /// Set to 0 to disable caching entirely.
    pub cache_ttl_seconds: u64,
    /// Minimum pairwise cosine similarity for a graph edge. Strictly
    /// exceeded, never met: at exactly the threshold no edge is created.
    pub similarity_threshold: f32,
    /// Maximum characters of page text passed to the embedding model.
    pub max_embed_chars: usize,
    /// Domain substrings to reject during candidate filtering.
    pub denylist: Vec<String>,
    /// Custom User-Agent string. If `None`, rotates through a built-in
    /// list of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_candidates: 10,
            max_workers: 5,
            fetch_timeout_secs: 6,
            cache_ttl_seconds: 86_400,
            similarity_threshold: 0.4,
            max_embed_chars: 3_000,
            denylist: DEFAULT_DENYLIST.iter().map(|s| (*s).to_owned()).collect(),
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_candidates` must be greater than 0
    /// - `max_workers` must be greater than 0
    /// - `fetch_timeout_secs` must be greater than 0
    /// - `similarity_threshold` must be finite and within `[-1.0, 1.0]`
    /// - `max_embed_chars` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_candidates == 0 {
            return Err(SearchError::Config(
                "max_candidates must be greater than 0".into(),
            ));
        }
        if self.max_workers == 0 {
            return Err(SearchError::Config(
                "max_workers must be greater than 0".into(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(SearchError::Config(
                "fetch_timeout_secs must be greater than 0".into(),
            ));
        }
        if !self.similarity_threshold.is_finite()
            || !(-1.0..=1.0).contains(&self.similarity_threshold)
        {
            return Err(SearchError::Config(
                "similarity_threshold must be within [-1.0, 1.0]".into(),
            ));
        }
        if self.max_embed_chars == 0 {
            return Err(SearchError::Config(
                "max_embed_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.max_candidates, 10);
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.fetch_timeout_secs, 6);
        assert_eq!(config.cache_ttl_seconds, 86_400);
        assert!((config.similarity_threshold - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.max_embed_chars, 3_000);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn default_denylist_covers_known_aggregators() {
        let config = SearchConfig::default();
        assert_eq!(config.denylist.len(), 7);
        assert!(config.denylist.iter().any(|d| d == "reddit.com"));
        assert!(config.denylist.iter().any(|d| d == "youtube.com"));
    }

    #[test]
    fn valid_config_passes_validation() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_max_candidates_rejected() {
        let config = SearchConfig {
            max_candidates: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_candidates"));
    }

    #[test]
    fn zero_max_workers_rejected() {
        let config = SearchConfig {
            max_workers: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_workers"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig {
            fetch_timeout_secs: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fetch_timeout_secs"));
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let config = SearchConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("similarity_threshold"));
    }

    #[test]
    fn nan_threshold_rejected() {
        let config = SearchConfig {
            similarity_threshold: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_embed_chars_rejected() {
        let config = SearchConfig {
            max_embed_chars: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_embed_chars"));
    }

    #[test]
    fn empty_denylist_valid() {
        // An empty denylist just means no candidates are filtered out.
        let config = SearchConfig {
            denylist: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_cache_ttl_valid() {
        // TTL 0 disables caching rather than being an error.
        let config = SearchConfig {
            cache_ttl_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn custom_user_agent() {
        let config = SearchConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        assert_eq!(config.user_agent.as_deref(), Some("CustomBot/1.0"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serde_round_trip_preserves_fields() {
        let config = SearchConfig {
            max_candidates: 20,
            similarity_threshold: 0.5,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let decoded: SearchConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded.max_candidates, 20);
        assert!((decoded.similarity_threshold - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let decoded: SearchConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(decoded.max_workers, 5);
        assert_eq!(decoded.cache_ttl_seconds, 86_400);
    }
}
