//! The "did you mean" suggestion service.
//!
//! Holds the shared corpus behind a read/write lock, refreshes it lazily,
//! and turns low-result queries into ranked spelling suggestions backed by
//! lightweight per-kind count estimates.

use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};
use parking_lot::RwLock;

use crate::adapter;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::spelling::corpus::{self, Corpus, tokenize};
use crate::spelling::levenshtein::{levenshtein_distance, similarity};
use crate::store::{RecordStore, Visibility};
use crate::types::{DidYouMeanResponse, EntityKind, SearchFilters, SpellingSuggestion};

/// Per-word cap on corpus candidates, bounding the count-estimate fan-out.
const MAX_CANDIDATES_PER_WORD: usize = 3;

/// Weight of similarity vs. frequency when ranking word candidates.
const CANDIDATE_SIMILARITY_WEIGHT: f64 = 0.7;
const CANDIDATE_FREQUENCY_WEIGHT: f64 = 0.3;

/// Weight of confidence vs. estimated results when ranking suggestions.
const SUGGESTION_CONFIDENCE_WEIGHT: f64 = 0.6;
const SUGGESTION_ESTIMATE_WEIGHT: f64 = 0.4;

/// Spell-correction service owning the corpus handle.
///
/// The corpus is shared, process-lifetime state: every suggestion request
/// reads it, and the lazy refresh rewrites it. The lock plus a double-checked
/// staleness test keeps concurrent refreshes from stomping each other and
/// keeps readers off half-built corpora.
#[derive(Debug, Default)]
pub struct SpellChecker {
    corpus: RwLock<Corpus>,
}

impl SpellChecker {
    /// Create a checker with an empty corpus; the first suggestion request
    /// populates it.
    pub fn new() -> Self {
        SpellChecker {
            corpus: RwLock::new(Corpus::new()),
        }
    }

    /// Number of distinct words currently in the corpus.
    pub fn corpus_len(&self) -> usize {
        self.corpus.read().len()
    }

    /// Seed the corpus directly. Intended for tests and warm starts.
    pub fn seed(&self, corpus: Corpus) {
        *self.corpus.write() = corpus;
    }

    /// Rebuild the corpus unconditionally.
    pub async fn refresh<S: RecordStore>(&self, store: &S, config: &SearchConfig) -> Result<()> {
        let fresh = corpus::build(store, config).await?;
        *self.corpus.write() = fresh;
        Ok(())
    }

    /// Rebuild the corpus if it has gone stale.
    ///
    /// The build runs without holding the lock; the staleness test is
    /// repeated under the write lock before the swap so a concurrent refresh
    /// that finished first wins. A failed build is logged and the previous
    /// corpus (possibly empty) stays in use.
    pub async fn ensure_fresh<S: RecordStore>(&self, store: &S, config: &SearchConfig) {
        let ttl = Duration::from_secs(config.corpus_ttl_secs);
        if !self.corpus.read().is_stale(ttl) {
            return;
        }

        match corpus::build(store, config).await {
            Ok(fresh) => {
                let mut guard = self.corpus.write();
                if guard.is_stale(ttl) {
                    *guard = fresh;
                }
            }
            Err(e) => warn!("corpus rebuild failed, keeping previous corpus: {e}"),
        }
    }

    /// Produce a "did you mean" response for a query that returned
    /// `current_result_count` results.
    pub async fn suggest<S: RecordStore>(
        &self,
        store: &S,
        original: &str,
        current_result_count: u64,
        scopes: &[(EntityKind, Visibility)],
        config: &SearchConfig,
    ) -> Result<DidYouMeanResponse> {
        if current_result_count > config.spelling_trigger_max_results {
            return Ok(DidYouMeanResponse::none());
        }

        self.ensure_fresh(store, config).await;

        let words = tokenize(original);
        if words.is_empty() {
            return Ok(DidYouMeanResponse::none());
        }

        // Gather candidate substitutions under the read lock, then drop it
        // before any store call.
        let candidates: Vec<(String, f64)> = {
            let corpus = self.corpus.read();
            let mut candidates: Vec<(String, f64)> = Vec::new();
            for (i, word) in words.iter().enumerate() {
                for (replacement, confidence) in word_candidates(&corpus, word, config) {
                    let mut corrected = words.clone();
                    corrected[i] = replacement;
                    let suggested = corrected.join(" ");
                    match candidates.iter_mut().find(|(q, _)| *q == suggested) {
                        Some((_, best)) => *best = best.max(confidence),
                        None => candidates.push((suggested, confidence)),
                    }
                }
            }
            candidates
        };

        if candidates.is_empty() {
            return Ok(DidYouMeanResponse::none());
        }

        let min_estimate =
            (config.spelling_improvement_factor * current_result_count as f64).floor() as u64;

        let estimates = join_all(candidates.iter().map(|(suggested, confidence)| {
            let suggested = suggested.clone();
            let confidence = *confidence;
            async move {
                let estimated = estimate_count(store, &suggested, scopes, config).await;
                (suggested, confidence, estimated)
            }
        }))
        .await;

        let mut suggestions: Vec<SpellingSuggestion> = estimates
            .into_iter()
            .filter(|(_, _, estimated)| *estimated > min_estimate)
            .map(|(suggested, confidence, estimated)| SpellingSuggestion {
                edit_distance: levenshtein_distance(original, &suggested),
                original: original.to_string(),
                suggested,
                confidence,
                estimated_results: estimated,
            })
            .collect();

        if suggestions.is_empty() {
            return Ok(DidYouMeanResponse::none());
        }

        suggestions.sort_by(|a, b| {
            suggestion_rank(b)
                .partial_cmp(&suggestion_rank(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.suggested.cmp(&b.suggested))
        });

        let mut rest = suggestions.split_off(1);
        rest.truncate(config.spelling_max_alternatives);
        debug!(
            "did-you-mean for {original:?}: {} ({} alternatives)",
            suggestions[0].suggested,
            rest.len()
        );

        Ok(DidYouMeanResponse {
            has_alternative: true,
            suggestion: suggestions.pop(),
            alternatives: rest,
        })
    }
}

fn suggestion_rank(suggestion: &SpellingSuggestion) -> f64 {
    SUGGESTION_CONFIDENCE_WEIGHT * suggestion.confidence
        + SUGGESTION_ESTIMATE_WEIGHT * (suggestion.estimated_results as f64 / 100.0).min(1.0)
}

/// Corpus candidates for one query word: words within the length pruning
/// window scoring above the similarity threshold, ranked by a blend of
/// similarity and frequency. Returns `(word, similarity)` pairs.
fn word_candidates(corpus: &Corpus, word: &str, config: &SearchConfig) -> Vec<(String, f64)> {
    let word_len = word.chars().count();
    let window = (word_len / 4).max(1);

    let mut scored: Vec<(String, f64, f64)> = corpus
        .words_near_length(word_len, window)
        .into_iter()
        .filter(|(candidate, _)| *candidate != word)
        .filter_map(|(candidate, frequency)| {
            let sim = similarity(word, candidate);
            if sim > config.spelling_min_similarity {
                let rank = CANDIDATE_SIMILARITY_WEIGHT * sim
                    + CANDIDATE_FREQUENCY_WEIGHT * (frequency as f64 / 100.0).min(1.0);
                Some((candidate.to_string(), sim, rank))
            } else {
                None
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(MAX_CANDIDATES_PER_WORD);
    scored.into_iter().map(|(word, sim, _)| (word, sim)).collect()
}

/// Estimate the result count of a corrected query: one count query per
/// entity kind, fanned out concurrently. A kind whose count fails or times
/// out contributes zero, so a single kind cannot block suggestion
/// generation for the others.
async fn estimate_count<S: RecordStore>(
    store: &S,
    text: &str,
    scopes: &[(EntityKind, Visibility)],
    config: &SearchConfig,
) -> u64 {
    let futures = scopes.iter().map(|(kind, visibility)| {
        let query = adapter::build_query(
            *kind,
            Some(text),
            &SearchFilters::default(),
            visibility.clone(),
            config.max_results_per_entity,
        );
        async move {
            if query.visibility == Visibility::Nothing {
                return 0;
            }
            let count = match config.adapter_timeout_ms {
                Some(ms) => {
                    match tokio::time::timeout(Duration::from_millis(ms), store.count(&query)).await
                    {
                        Ok(result) => result,
                        Err(_) => {
                            warn!("count estimate timed out for {}", query.kind);
                            return 0;
                        }
                    }
                }
                None => store.count(&query).await,
            };
            match count {
                Ok(count) => count,
                Err(e) => {
                    warn!("count estimate failed for {}: {e}", query.kind);
                    0
                }
            }
        }
    });
    join_all(futures).await.into_iter().sum()
}
