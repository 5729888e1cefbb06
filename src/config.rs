//! Configuration for search, scoring, and spelling suggestion behavior.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Weights for the four relevance score components.
///
/// Weights must sum to 1.0 (within a small epsilon) so that the final score
/// stays in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the textual match component.
    pub textual: f64,
    /// Weight of the recency component.
    pub recency: f64,
    /// Weight of the popularity component.
    pub popularity: f64,
    /// Weight of the quality component.
    pub quality: f64,
}

impl ScoreWeights {
    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.textual + self.recency + self.popularity + self.quality
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            textual: 0.5,
            recency: 0.2,
            popularity: 0.2,
            quality: 0.1,
        }
    }
}

/// Configuration for search operations.
///
/// Owned by the engine instance and immutable for its lifetime; individual
/// calls may pass an override via `search_with_config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Relevance score component weights.
    pub weights: ScoreWeights,
    /// Half-life for the exponential recency decay, in days.
    pub recency_half_life_days: f64,
    /// Age in days past which the recency score is zero.
    pub recency_max_age_days: f64,
    /// Cap on raw results fetched per entity kind in one fan-out leg.
    pub max_results_per_entity: usize,
    /// Page size used when the caller does not specify one.
    pub default_page_size: usize,
    /// Upper bound on the caller-requested page size.
    pub max_page_size: usize,
    /// Queries shorter than this (after trimming) return an empty response.
    pub min_query_len: usize,
    /// Queries longer than this are truncated.
    pub max_query_len: usize,
    /// Deadline for each adapter leg and each count estimate, in milliseconds.
    /// `None` disables the deadline.
    pub adapter_timeout_ms: Option<u64>,
    /// Per-kind result cap for autocomplete suggestions.
    pub suggest_limit: usize,
    /// "Did you mean" is only attempted when the current result count is at
    /// or below this threshold.
    pub spelling_trigger_max_results: u64,
    /// Minimum normalized Levenshtein similarity for a corpus candidate.
    pub spelling_min_similarity: f64,
    /// A suggestion must promise more than this multiple of the current
    /// result count to be kept.
    pub spelling_improvement_factor: f64,
    /// Number of runner-up suggestions returned alongside the best one.
    pub spelling_max_alternatives: usize,
    /// Corpus is rebuilt lazily once it is older than this many seconds.
    pub corpus_ttl_secs: u64,
    /// Number of records sampled per entity kind when building the corpus.
    pub corpus_sample_per_kind: usize,
    /// Frequency multiplier for words from past successful queries.
    pub corpus_query_weight: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            weights: ScoreWeights::default(),
            recency_half_life_days: 90.0,
            recency_max_age_days: 730.0,
            max_results_per_entity: 100,
            default_page_size: 20,
            max_page_size: 100,
            min_query_len: 2,
            max_query_len: 1000,
            adapter_timeout_ms: Some(5000),
            suggest_limit: 10,
            spelling_trigger_max_results: 5,
            spelling_min_similarity: 0.7,
            spelling_improvement_factor: 2.0,
            spelling_max_alternatives: 2,
            corpus_ttl_secs: 3600,
            corpus_sample_per_kind: 200,
            corpus_query_weight: 2,
        }
    }
}

impl SearchConfig {
    /// Validate the configuration.
    ///
    /// Checks that the score weights sum to 1.0 and that limits are non-zero.
    pub fn validate(&self) -> Result<()> {
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(SearchError::config(format!(
                "score weights must sum to 1.0, got {sum}"
            )));
        }
        if self.recency_half_life_days <= 0.0 {
            return Err(SearchError::config("recency half-life must be positive"));
        }
        if self.max_results_per_entity == 0 {
            return Err(SearchError::config("max_results_per_entity must be > 0"));
        }
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(SearchError::config("page sizes must be > 0"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(SearchError::config(
                "default_page_size cannot exceed max_page_size",
            ));
        }
        Ok(())
    }

    /// Clamp a caller-requested page size to the configured bounds.
    pub fn clamp_page_size(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(limit) => limit.clamp(1, self.max_page_size),
            None => self.default_page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let config = SearchConfig {
            weights: ScoreWeights {
                textual: 0.5,
                recency: 0.5,
                popularity: 0.5,
                quality: 0.1,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_page_size_clamping() {
        let config = SearchConfig::default();
        assert_eq!(config.clamp_page_size(None), 20);
        assert_eq!(config.clamp_page_size(Some(50)), 50);
        assert_eq!(config.clamp_page_size(Some(500)), 100);
        assert_eq!(config.clamp_page_size(Some(0)), 1);
    }

    #[test]
    fn test_default_page_size_must_fit_max() {
        let config = SearchConfig {
            default_page_size: 200,
            max_page_size: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
