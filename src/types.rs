//! Core data model: entity kinds, queries, results, facets, and suggestions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScoreWeights;

/// The record kinds a search can fan out across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Asset,
    Creator,
    Project,
    License,
}

impl EntityKind {
    /// All entity kinds, in canonical order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Asset,
        EntityKind::Creator,
        EntityKind::Project,
        EntityKind::License,
    ];

    /// Lowercase name used in serialized payloads and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Asset => "asset",
            EntityKind::Creator => "creator",
            EntityKind::Project => "project",
            EntityKind::License => "license",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort directive for the merged result sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Descending relevance score (the default).
    #[default]
    Relevance,
    /// Newest creation date first.
    Newest,
    /// Oldest creation date first.
    Oldest,
    /// Title, ascending, case-insensitive.
    Title,
}

/// Attribute filters applicable to asset records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetFilters {
    /// Asset type (e.g. "logo", "photo", "video").
    pub asset_type: Option<String>,
    /// Workflow status (e.g. "approved", "pending").
    pub status: Option<String>,
    /// File format (e.g. "png", "svg").
    pub format: Option<String>,
}

/// Attribute filters applicable to creator records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatorFilters {
    /// Verification status (e.g. "verified", "pending").
    pub verification: Option<String>,
}

/// Attribute filters applicable to project records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFilters {
    /// Project type (e.g. "campaign", "rebrand").
    pub project_type: Option<String>,
    /// Workflow status (e.g. "active", "archived").
    pub status: Option<String>,
}

/// Attribute filters applicable to license records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseFilters {
    /// License type (e.g. "exclusive", "royalty_free").
    pub license_type: Option<String>,
}

/// Structured filters for a search request.
///
/// Per-kind sub-filters only constrain their own kind; the shared fields
/// (owner, tags, date range) apply to every requested kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub assets: AssetFilters,
    pub creators: CreatorFilters,
    pub projects: ProjectFilters,
    pub licenses: LicenseFilters,
    /// Restrict to records owned by this id.
    pub owner_id: Option<String>,
    /// Records must carry at least one of these tags.
    pub tags: Vec<String>,
    /// Lower bound (inclusive) on creation date.
    pub date_from: Option<DateTime<Utc>>,
    /// Upper bound (inclusive) on creation date.
    pub date_to: Option<DateTime<Utc>>,
}

impl SearchFilters {
    /// True if no filter of any kind is set.
    pub fn is_empty(&self) -> bool {
        self.assets == AssetFilters::default()
            && self.creators == CreatorFilters::default()
            && self.projects == ProjectFilters::default()
            && self.licenses == LicenseFilters::default()
            && self.owner_id.is_none()
            && self.tags.is_empty()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }
}

/// A search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Raw query text, sanitized by the parser before use.
    pub text: String,
    /// Entity kinds to search; empty means all kinds.
    pub kinds: Vec<EntityKind>,
    /// Structured filters.
    #[serde(default)]
    pub filters: SearchFilters,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    /// Requested page size; clamped to the configured maximum.
    pub limit: Option<usize>,
    /// Sort directive.
    #[serde(default)]
    pub sort: SortOrder,
}

fn default_page() -> usize {
    1
}

impl SearchQuery {
    /// Create a query over all entity kinds with default pagination.
    pub fn new<S: Into<String>>(text: S) -> Self {
        SearchQuery {
            text: text.into(),
            page: 1,
            ..Default::default()
        }
    }

    /// Restrict the query to the given kinds.
    pub fn kinds(mut self, kinds: Vec<EntityKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Set the structured filters.
    pub fn filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Set the page (1-based) and page size.
    pub fn page(mut self, page: usize, limit: usize) -> Self {
        self.page = page.max(1);
        self.limit = Some(limit);
        self
    }

    /// Set the sort directive.
    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// The kinds this query actually targets (empty request means all).
    pub fn effective_kinds(&self) -> Vec<EntityKind> {
        if self.kinds.is_empty() {
            EntityKind::ALL.to_vec()
        } else {
            let mut kinds = self.kinds.clone();
            kinds.sort();
            kinds.dedup();
            kinds
        }
    }
}

/// The four independent relevance signals, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub textual: f64,
    pub recency: f64,
    pub popularity: f64,
    pub quality: f64,
}

impl ScoreBreakdown {
    /// Combine the components into the final relevance score.
    ///
    /// The result is clamped to `[0, 1]`; with valid weights the clamp is a
    /// no-op.
    pub fn final_score(&self, weights: &ScoreWeights) -> f64 {
        let score = self.textual * weights.textual
            + self.recency * weights.recency
            + self.popularity * weights.popularity
            + self.quality * weights.quality;
        score.clamp(0.0, 1.0)
    }
}

/// Highlighted fragments for a result.
///
/// The first case-insensitive occurrence of the query in the title and
/// description is wrapped in `<mark>..</mark>`; `None` when there is no match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Entity-specific metadata payload, tagged by kind.
///
/// Modeled as a sum type so per-kind mappers are exhaustive and cannot drop
/// fields silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntityMetadata {
    Asset {
        asset_type: String,
        status: String,
        format: Option<String>,
        thumbnail_url: Option<String>,
        download_count: u64,
    },
    Creator {
        verification: String,
        specialty: Option<String>,
        rating: Option<f64>,
        collaboration_count: u64,
        avatar_url: Option<String>,
    },
    Project {
        project_type: String,
        status: String,
        asset_count: u64,
    },
    License {
        license_type: String,
        active: bool,
        price_cents: Option<u64>,
    },
}

impl EntityMetadata {
    /// The entity kind this payload belongs to.
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityMetadata::Asset { .. } => EntityKind::Asset,
            EntityMetadata::Creator { .. } => EntityKind::Creator,
            EntityMetadata::Project { .. } => EntityKind::Project,
            EntityMetadata::License { .. } => EntityKind::License,
        }
    }
}

/// A single normalized search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub kind: EntityKind,
    pub title: String,
    pub description: Option<String>,
    /// Final relevance score in `[0, 1]`, a deterministic function of the
    /// breakdown and the configured weights.
    pub relevance_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub highlight: Highlight,
    pub metadata: EntityMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pagination metadata, derived arithmetically from the merged result count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub limit: usize,
    /// Total merged result count before slicing.
    pub total: usize,
    /// Total number of pages.
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// One facet option value with its count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
    pub count: u64,
    /// Whether this value is part of the caller's active filter set.
    pub is_selected: bool,
}

/// A facet field with its ordered option counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetGroup {
    /// Field identifier (e.g. "asset_type").
    pub field: String,
    /// Display label (e.g. "Asset Type").
    pub label: String,
    /// Entity kind this facet partitions.
    pub kind: EntityKind,
    pub options: Vec<FacetOption>,
}

/// Facet groups plus the headline totals for "N of M results" affordances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedSearchFacets {
    pub groups: Vec<FacetGroup>,
    /// Total results ignoring all filters.
    pub total_unfiltered: u64,
    /// Total results under the currently applied filters.
    pub total_filtered: u64,
}

/// The full response to a search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub pagination: PaginationInfo,
    pub facets: Vec<FacetGroup>,
    /// The sanitized query text this response answers.
    pub query: String,
    pub execution_time_ms: u64,
    /// Kinds whose adapter failed or timed out; their results are missing
    /// from this response.
    pub degraded_kinds: Vec<EntityKind>,
}

impl SearchResponse {
    /// An empty response for queries below the minimum length.
    pub fn empty(query: String, page: usize, limit: usize, execution_time_ms: u64) -> Self {
        SearchResponse {
            results: Vec::new(),
            pagination: PaginationInfo {
                page,
                limit,
                total: 0,
                total_pages: 0,
                has_next: false,
                has_previous: false,
            },
            facets: Vec::new(),
            query,
            execution_time_ms,
            degraded_kinds: Vec::new(),
        }
    }
}

/// One autocomplete suggestion entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub id: String,
    pub title: String,
    pub kind: EntityKind,
    /// Secondary line (e.g. asset type, creator specialty).
    pub subtitle: Option<String>,
    pub thumbnail: Option<String>,
}

/// One "did you mean" candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellingSuggestion {
    pub original: String,
    pub suggested: String,
    /// Word similarity confidence in `[0, 1]`.
    pub confidence: f64,
    /// Estimated result count for the suggested query.
    pub estimated_results: u64,
    /// Levenshtein distance between the original and suggested full queries.
    pub edit_distance: usize,
}

/// Response of the "did you mean" service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidYouMeanResponse {
    pub has_alternative: bool,
    /// Best suggestion, when one survived the thresholds.
    pub suggestion: Option<SpellingSuggestion>,
    /// Up to `spelling_max_alternatives` runner-ups.
    pub alternatives: Vec<SpellingSuggestion>,
}

impl DidYouMeanResponse {
    /// A response carrying no alternative.
    pub fn none() -> Self {
        DidYouMeanResponse {
            has_alternative: false,
            suggestion: None,
            alternatives: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&EntityKind::Asset).unwrap(),
            "\"asset\""
        );
        let kind: EntityKind = serde_json::from_str("\"license\"").unwrap();
        assert_eq!(kind, EntityKind::License);
    }

    #[test]
    fn test_effective_kinds_defaults_to_all() {
        let query = SearchQuery::new("logo");
        assert_eq!(query.effective_kinds(), EntityKind::ALL.to_vec());

        let query = SearchQuery::new("logo").kinds(vec![
            EntityKind::Creator,
            EntityKind::Asset,
            EntityKind::Asset,
        ]);
        assert_eq!(
            query.effective_kinds(),
            vec![EntityKind::Asset, EntityKind::Creator]
        );
    }

    #[test]
    fn test_final_score_is_weighted_sum() {
        let breakdown = ScoreBreakdown {
            textual: 1.0,
            recency: 0.5,
            popularity: 0.25,
            quality: 1.0,
        };
        let weights = ScoreWeights::default();
        let expected = 1.0 * 0.5 + 0.5 * 0.2 + 0.25 * 0.2 + 1.0 * 0.1;
        assert!((breakdown.final_score(&weights) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_final_score_clamped() {
        let breakdown = ScoreBreakdown {
            textual: 1.0,
            recency: 1.0,
            popularity: 1.0,
            quality: 1.0,
        };
        let weights = ScoreWeights::default();
        assert!(breakdown.final_score(&weights) <= 1.0);
    }

    #[test]
    fn test_metadata_tagged_by_kind() {
        let metadata = EntityMetadata::Asset {
            asset_type: "logo".to_string(),
            status: "approved".to_string(),
            format: Some("svg".to_string()),
            thumbnail_url: None,
            download_count: 42,
        };
        assert_eq!(metadata.kind(), EntityKind::Asset);

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["type"], "asset");
        assert_eq!(json["download_count"], 42);
    }

    #[test]
    fn test_empty_filters() {
        assert!(SearchFilters::default().is_empty());

        let filters = SearchFilters {
            tags: vec!["brand".to_string()],
            ..Default::default()
        };
        assert!(!filters.is_empty());
    }
}
