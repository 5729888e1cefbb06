//! # unisearch
//!
//! A unified multi-entity search engine. One query fans out concurrently
//! across asset, creator, project, and license stores; heterogeneous results
//! are scored with a single composite relevance model (textual match,
//! recency decay, popularity, quality), ranked and paginated together, and
//! accompanied by faceted filter counts. A self-maintaining word-frequency
//! corpus powers typo-tolerant "did you mean" suggestions.
//!
//! ## Features
//!
//! - Fan-out/fan-in per-kind search with per-kind failure isolation
//! - Weighted composite relevance scoring with exponential recency decay
//! - Facet aggregation with own-selection exclusion
//! - Edit-distance spelling suggestions from a lazily rebuilt corpus
//! - Match-quality-ordered autocomplete
//!
//! The persistent store, authorization provider, and analytics sink are
//! external collaborators consumed through the traits in [`store`].

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod facets;
pub mod query;
pub mod ranking;
pub mod scoring;
pub mod spelling;
pub mod store;
pub mod types;

pub use crate::config::{ScoreWeights, SearchConfig};
pub use crate::engine::SearchEngine;
pub use crate::error::{Result, SearchError};
pub use crate::query::QueryParser;
pub use crate::spelling::SpellChecker;
pub use crate::store::{
    AnalyticsSink, ClickEvent, Condition, RawRecord, RecordAttrs, RecordQuery, RecordStore,
    SearchEvent, TextPredicate, Visibility, VisibilityProvider,
};
pub use crate::types::{
    AssetFilters, CreatorFilters, DidYouMeanResponse, EnhancedSearchFacets, EntityKind,
    EntityMetadata, FacetGroup, FacetOption, Highlight, LicenseFilters, PaginationInfo,
    ProjectFilters, ScoreBreakdown, SearchFilters, SearchQuery, SearchResponse, SearchResult,
    SortOrder, SpellingSuggestion, SuggestionItem,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
