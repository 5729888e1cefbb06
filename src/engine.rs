//! The top-level search orchestrator.
//!
//! One engine value owns the configuration and the spelling corpus handle
//! and borrows its three collaborators (record store, visibility provider,
//! analytics sink) behind `Arc`s. Every search fans one task per requested
//! entity kind out, joins them, and degrades gracefully when a kind fails.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use log::warn;

use crate::adapter;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::facets;
use crate::query::QueryParser;
use crate::ranking;
use crate::spelling::SpellChecker;
use crate::store::{
    AnalyticsSink, ClickEvent, RawRecord, RecordStore, SearchEvent, Visibility, VisibilityProvider,
};
use crate::types::{
    DidYouMeanResponse, EnhancedSearchFacets, EntityKind, SearchFilters, SearchQuery,
    SearchResponse, SuggestionItem,
};

/// Unified multi-entity search engine.
pub struct SearchEngine<S, V, A> {
    store: Arc<S>,
    visibility: Arc<V>,
    analytics: Arc<A>,
    config: SearchConfig,
    spell: SpellChecker,
}

impl<S, V, A> SearchEngine<S, V, A>
where
    S: RecordStore,
    V: VisibilityProvider,
    A: AnalyticsSink + 'static,
{
    /// Create an engine after validating the configuration.
    pub fn new(
        store: Arc<S>,
        visibility: Arc<V>,
        analytics: Arc<A>,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(SearchEngine {
            store,
            visibility,
            analytics,
            config,
            spell: SpellChecker::new(),
        })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Execute a search with the engine's configuration.
    pub async fn search(
        &self,
        query: &SearchQuery,
        user_id: Option<&str>,
    ) -> Result<SearchResponse> {
        self.search_with_config(query, user_id, &self.config).await
    }

    /// Execute a search with a per-call configuration override.
    pub async fn search_with_config(
        &self,
        query: &SearchQuery,
        user_id: Option<&str>,
        config: &SearchConfig,
    ) -> Result<SearchResponse> {
        config.validate()?;
        let started = Instant::now();
        let page = query.page.max(1);
        let limit = config.clamp_page_size(query.limit);

        // A too-short query is not an error: empty response, timing recorded.
        let Some(text) = QueryParser::new(config).parse(&query.text) else {
            return Ok(SearchResponse::empty(
                query.text.trim().to_string(),
                page,
                limit,
                started.elapsed().as_millis() as u64,
            ));
        };

        let kinds = query.effective_kinds();
        let (scopes, mut degraded_kinds) = self.resolve_scopes(&kinds, user_id);

        // Fan-out: one task per kind, launched together and awaited jointly.
        // Each kind is fetched with its own facetable filters relaxed; they
        // are re-applied in memory below, so the same candidates also back
        // facet counts that honor the own-selection exclusion rule.
        let legs = join_all(scopes.iter().map(|(kind, visibility)| {
            let text = text.as_str();
            let visibility = visibility.clone();
            let relaxed = facets::without_kind(&query.filters, *kind);
            async move {
                let leg = adapter::fetch_candidates(
                    self.store.as_ref(),
                    *kind,
                    text,
                    &relaxed,
                    visibility,
                    config,
                );
                let outcome = match config.adapter_timeout_ms {
                    Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), leg).await {
                        Ok(result) => result,
                        Err(_) => Err(SearchError::timeout(format!(
                            "{kind} adapter exceeded {ms}ms"
                        ))),
                    },
                    None => leg.await,
                };
                (*kind, outcome)
            }
        }))
        .await;

        // Fan-in with per-kind failure isolation: merge the successes and
        // flag the failed kinds instead of aborting the whole response.
        let now = Utc::now();
        let mut candidates: Vec<(EntityKind, Vec<RawRecord>)> = Vec::new();
        for (kind, outcome) in legs {
            match outcome {
                Ok(records) => candidates.push((kind, records)),
                Err(e) => {
                    warn!("search degraded, {kind} adapter failed: {e}");
                    degraded_kinds.push(kind);
                }
            }
        }

        let per_kind_results = candidates
            .iter()
            .map(|(_, records)| {
                records
                    .iter()
                    .filter(|record| adapter::matches_kind_filters(record, &query.filters))
                    .map(|record| adapter::map_record(record.clone(), &text, now, config))
                    .collect()
            })
            .collect();

        let (results, pagination) =
            ranking::rank_and_paginate(per_kind_results, query.sort, page, limit);
        let facet_groups = facets::compute(&candidates, &query.filters);
        let execution_time_ms = started.elapsed().as_millis() as u64;

        self.spawn_search_event(SearchEvent {
            query: text.clone(),
            kinds,
            result_count: pagination.total,
            execution_time_ms,
            user_id: user_id.map(str::to_string),
        });

        Ok(SearchResponse {
            results,
            pagination,
            facets: facet_groups,
            query: text,
            execution_time_ms,
            degraded_kinds,
        })
    }

    /// Autocomplete: per-kind concurrent lookups with a small cap and no
    /// scoring, ordered by match quality (exact, prefix, arbitrary).
    pub async fn get_suggestions(
        &self,
        prefix: &str,
        kinds: Option<Vec<EntityKind>>,
        limit: usize,
        user_id: Option<&str>,
    ) -> Result<Vec<SuggestionItem>> {
        let Some(prefix) = QueryParser::new(&self.config).parse(prefix) else {
            return Ok(Vec::new());
        };
        let kinds = match kinds {
            Some(kinds) if !kinds.is_empty() => kinds,
            _ => EntityKind::ALL.to_vec(),
        };
        let limit = limit.clamp(1, self.config.max_page_size);
        let per_kind_cap = self.config.suggest_limit.min(limit);
        let (scopes, _) = self.resolve_scopes(&kinds, user_id);

        let legs = join_all(scopes.iter().map(|(kind, visibility)| {
            let prefix = prefix.as_str();
            let visibility = visibility.clone();
            async move {
                adapter::run_suggest(self.store.as_ref(), *kind, prefix, visibility, per_kind_cap)
                    .await
            }
        }))
        .await;

        let mut items: Vec<SuggestionItem> = Vec::new();
        for leg in legs {
            match leg {
                Ok(mut kind_items) => items.append(&mut kind_items),
                Err(e) => warn!("suggestion lookup failed: {e}"),
            }
        }

        let needle = prefix.to_lowercase();
        items.sort_by(|a, b| {
            adapter::suggest_rank(&a.title, &needle)
                .cmp(&adapter::suggest_rank(&b.title, &needle))
                .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
                .then_with(|| a.id.cmp(&b.id))
        });
        items.truncate(limit);
        Ok(items)
    }

    /// "Did you mean" for a query that returned `current_result_count`
    /// results.
    pub async fn get_spelling_suggestion(
        &self,
        query: &str,
        current_result_count: u64,
        user_id: Option<&str>,
    ) -> Result<DidYouMeanResponse> {
        let (scopes, _) = self.resolve_scopes(&EntityKind::ALL, user_id);
        self.spell
            .suggest(
                self.store.as_ref(),
                query.trim(),
                current_result_count,
                &scopes,
                &self.config,
            )
            .await
    }

    /// Facet groups with the own-selection exclusion rule and the headline
    /// "N of M results" totals.
    pub async fn get_enhanced_facets(
        &self,
        query: &str,
        kinds: Option<Vec<EntityKind>>,
        filters: &SearchFilters,
        user_id: Option<&str>,
    ) -> Result<EnhancedSearchFacets> {
        let Some(text) = QueryParser::new(&self.config).parse(query) else {
            return Ok(EnhancedSearchFacets {
                groups: Vec::new(),
                total_unfiltered: 0,
                total_filtered: 0,
            });
        };
        let kinds = match kinds {
            Some(kinds) if !kinds.is_empty() => kinds,
            _ => EntityKind::ALL.to_vec(),
        };
        let (scopes, _) = self.resolve_scopes(&kinds, user_id);
        facets::enhanced(self.store.as_ref(), &text, &scopes, filters, &self.config).await
    }

    /// Forward a result click to the analytics sink, fire-and-forget.
    pub fn track_click(&self, result_id: &str, query: &str, position: usize) {
        let event = ClickEvent {
            result_id: result_id.to_string(),
            query: query.to_string(),
            position,
        };
        let sink = Arc::clone(&self.analytics);
        tokio::spawn(async move {
            if let Err(e) = sink.record_click(event).await {
                warn!("click tracking failed: {e}");
            }
        });
    }

    /// Rebuild the spelling corpus immediately.
    pub async fn refresh_corpus(&self) -> Result<()> {
        self.spell.refresh(self.store.as_ref(), &self.config).await
    }

    /// The spell-correction service, for direct seeding/inspection.
    pub fn spell_checker(&self) -> &SpellChecker {
        &self.spell
    }

    /// Resolve the visibility scope per kind. A kind whose scope lookup
    /// fails is failed closed: skipped and reported as degraded.
    fn resolve_scopes(
        &self,
        kinds: &[EntityKind],
        user_id: Option<&str>,
    ) -> (Vec<(EntityKind, Visibility)>, Vec<EntityKind>) {
        let mut scopes = Vec::with_capacity(kinds.len());
        let mut degraded = Vec::new();
        for kind in kinds {
            match self.visibility.scope(user_id, *kind) {
                Ok(visibility) => scopes.push((*kind, visibility)),
                Err(e) => {
                    warn!("visibility lookup failed for {kind}: {e}");
                    degraded.push(*kind);
                }
            }
        }
        (scopes, degraded)
    }

    fn spawn_search_event(&self, event: SearchEvent) {
        let sink = Arc::clone(&self.analytics);
        tokio::spawn(async move {
            if let Err(e) = sink.record_search(event).await {
                warn!("search analytics failed: {e}");
            }
        });
    }
}
