//! The word-frequency corpus backing "did you mean" suggestions.
//!
//! Built from a bounded sample of entity titles/descriptions plus the text
//! of past queries that returned results (weighted higher). The corpus is
//! process-lifetime state, rebuilt lazily once it goes stale.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use futures::future::join_all;
use log::{debug, warn};

use crate::adapter;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::store::{RecordStore, Visibility};
use crate::types::{EntityKind, SearchFilters};

/// Minimum token length; shorter alphanumeric runs carry too little signal.
const MIN_TOKEN_LEN: usize = 3;

/// Cap on past queries pulled into one corpus build.
const RECENT_QUERY_LIMIT: usize = 500;

/// Tokenize text into corpus words: lowercase alphanumeric runs of length
/// greater than 2.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() >= MIN_TOKEN_LEN)
        .map(|word| word.to_lowercase())
        .collect()
}

/// A word -> frequency map with a build timestamp.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    words: AHashMap<String, u32>,
    built_at: Option<Instant>,
}

impl Corpus {
    /// Create an empty, never-built corpus.
    pub fn new() -> Self {
        Corpus::default()
    }

    /// Whether the corpus should be rebuilt. An empty, never-built corpus is
    /// always stale.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        match self.built_at {
            Some(built_at) => built_at.elapsed() > ttl,
            None => true,
        }
    }

    /// Add a single word with the given weight.
    pub fn add_word(&mut self, word: &str, weight: u32) {
        let normalized = word.to_lowercase();
        if normalized.chars().count() < MIN_TOKEN_LEN {
            return;
        }
        *self.words.entry(normalized).or_insert(0) += weight;
    }

    /// Tokenize a text fragment and add every token with the given weight.
    pub fn add_text(&mut self, text: &str, weight: u32) {
        for token in tokenize(text) {
            *self.words.entry(token).or_insert(0) += weight;
        }
    }

    /// Frequency of a word, zero if absent.
    pub fn frequency(&self, word: &str) -> u32 {
        self.words.get(&word.to_lowercase()).copied().unwrap_or(0)
    }

    /// Whether the word is known.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(&word.to_lowercase())
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the corpus holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words whose length is within `window` of `len`, with frequencies.
    ///
    /// This is the pruning pass of candidate generation: only words of a
    /// similar length can be within a small edit distance.
    pub fn words_near_length(&self, len: usize, window: usize) -> Vec<(&str, u32)> {
        self.words
            .iter()
            .filter(|(word, _)| word.chars().count().abs_diff(len) <= window)
            .map(|(word, freq)| (word.as_str(), *freq))
            .collect()
    }

    /// Stamp the corpus as freshly built.
    pub fn mark_built(&mut self) {
        self.built_at = Some(Instant::now());
    }
}

/// Build a fresh corpus from the store.
///
/// Samples up to `corpus_sample_per_kind` records per entity kind (titles,
/// descriptions, and tags) and folds in recent successful query texts at
/// `corpus_query_weight` times the weight of content words. A failed sample
/// for one kind is logged and skipped; the rest of the build proceeds.
pub async fn build<S: RecordStore>(store: &S, config: &SearchConfig) -> Result<Corpus> {
    let mut corpus = Corpus::new();

    let samples = join_all(EntityKind::ALL.iter().map(|kind| {
        let query = adapter::build_query(
            *kind,
            None,
            &SearchFilters::default(),
            Visibility::Everything,
            config.corpus_sample_per_kind,
        );
        async move { (*kind, store.fetch(&query).await) }
    }))
    .await;

    for (kind, sample) in samples {
        match sample {
            Ok(records) => {
                for record in records {
                    corpus.add_text(&record.title, 1);
                    if let Some(description) = &record.description {
                        corpus.add_text(description, 1);
                    }
                    for tag in &record.tags {
                        corpus.add_text(tag, 1);
                    }
                }
            }
            Err(e) => warn!("corpus sample failed for {kind}: {e}"),
        }
    }

    match store.recent_queries(RECENT_QUERY_LIMIT).await {
        Ok(queries) => {
            for query in queries {
                corpus.add_text(&query, config.corpus_query_weight);
            }
        }
        Err(e) => warn!("corpus query history unavailable: {e}"),
    }

    corpus.mark_built();
    debug!("corpus built with {} distinct words", corpus.len());
    Ok(corpus)
}
