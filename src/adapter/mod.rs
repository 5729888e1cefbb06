//! Per-entity-kind search adapters.
//!
//! Each kind module contributes its searchable text fields and the attribute
//! conditions its filters translate to; the shared plumbing here builds the
//! bounded [`RecordQuery`], runs it against the store, and normalizes raw
//! rows into scored [`SearchResult`]s.

pub mod assets;
pub mod creators;
pub mod licenses;
pub mod projects;

use chrono::{DateTime, Utc};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::scoring;
use crate::store::{
    Condition, RawRecord, RecordAttrs, RecordQuery, RecordStore, TextPredicate, Visibility,
};
use crate::types::{
    EntityKind, EntityMetadata, Highlight, SearchFilters, SearchResult, SuggestionItem,
};

/// Searchable text fields for a kind, OR-ed by the text predicate.
pub fn text_fields(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Asset => assets::TEXT_FIELDS,
        EntityKind::Creator => creators::TEXT_FIELDS,
        EntityKind::Project => projects::TEXT_FIELDS,
        EntityKind::License => licenses::TEXT_FIELDS,
    }
}

/// Build the bounded store query for one kind.
///
/// Combines the kind's text predicate, the kind-applicable attribute
/// filters, the shared filters (owner, tags, date range), the unconditional
/// soft-delete exclusion, and the caller-supplied visibility scope.
pub fn build_query(
    kind: EntityKind,
    text: Option<&str>,
    filters: &SearchFilters,
    visibility: Visibility,
    limit: usize,
) -> RecordQuery {
    let mut conditions = vec![Condition::NotDeleted];

    conditions.extend(match kind {
        EntityKind::Asset => assets::conditions(&filters.assets),
        EntityKind::Creator => creators::conditions(&filters.creators),
        EntityKind::Project => projects::conditions(&filters.projects),
        EntityKind::License => licenses::conditions(&filters.licenses),
    });

    if let Some(owner_id) = &filters.owner_id {
        conditions.push(Condition::Equals {
            field: "owner_id".to_string(),
            value: owner_id.clone(),
        });
    }
    if !filters.tags.is_empty() {
        conditions.push(Condition::AnyTag(filters.tags.clone()));
    }
    if filters.date_from.is_some() || filters.date_to.is_some() {
        conditions.push(Condition::DateBetween {
            from: filters.date_from,
            to: filters.date_to,
        });
    }

    RecordQuery {
        kind,
        text: text.map(|needle| TextPredicate {
            needle: needle.to_string(),
            fields: text_fields(kind).iter().map(|f| f.to_string()).collect(),
        }),
        conditions,
        visibility,
        limit,
    }
}

/// Run one fan-out leg: fetch the kind's bounded, filtered candidate set.
///
/// A `Nothing` scope short-circuits without touching the store.
pub async fn fetch_candidates<S: RecordStore>(
    store: &S,
    kind: EntityKind,
    text: &str,
    filters: &SearchFilters,
    visibility: Visibility,
    config: &SearchConfig,
) -> Result<Vec<RawRecord>> {
    if visibility == Visibility::Nothing {
        return Ok(Vec::new());
    }
    let query = build_query(
        kind,
        Some(text),
        filters,
        visibility,
        config.max_results_per_entity,
    );
    store.fetch(&query).await
}

/// Whether a record satisfies its own kind's attribute filters.
///
/// Used to narrow candidate sets fetched with those filters relaxed, so the
/// same records can back both the result list and facet counts.
pub fn matches_kind_filters(record: &RawRecord, filters: &SearchFilters) -> bool {
    let conditions = match record.attrs.kind() {
        EntityKind::Asset => assets::conditions(&filters.assets),
        EntityKind::Creator => creators::conditions(&filters.creators),
        EntityKind::Project => projects::conditions(&filters.projects),
        EntityKind::License => licenses::conditions(&filters.licenses),
    };
    conditions.iter().all(|condition| match condition {
        Condition::Equals { field, value } => record
            .attr_value(field)
            .is_some_and(|v| v.eq_ignore_ascii_case(value)),
        _ => true,
    })
}

/// Normalize one raw record into a scored search result.
pub fn map_record(
    record: RawRecord,
    query_text: &str,
    now: DateTime<Utc>,
    config: &SearchConfig,
) -> SearchResult {
    let breakdown = scoring::score_record(
        query_text,
        &record.title,
        record.description.as_deref(),
        record.created_at,
        &record.attrs,
        now,
        config,
    );
    let highlight = Highlight {
        title: highlight_fragment(&record.title, query_text),
        description: record
            .description
            .as_deref()
            .and_then(|d| highlight_fragment(d, query_text)),
    };

    SearchResult {
        id: record.id,
        kind: record.attrs.kind(),
        title: record.title,
        description: record.description,
        relevance_score: breakdown.final_score(&config.weights),
        score_breakdown: breakdown,
        highlight,
        metadata: metadata_for(&record.attrs),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

/// Exhaustive conversion from raw attributes to the tagged metadata payload.
pub fn metadata_for(attrs: &RecordAttrs) -> EntityMetadata {
    match attrs {
        RecordAttrs::Asset {
            asset_type,
            status,
            format,
            thumbnail_url,
            download_count,
        } => EntityMetadata::Asset {
            asset_type: asset_type.clone(),
            status: status.clone(),
            format: format.clone(),
            thumbnail_url: thumbnail_url.clone(),
            download_count: *download_count,
        },
        RecordAttrs::Creator {
            verification,
            specialty,
            rating,
            collaboration_count,
            avatar_url,
        } => EntityMetadata::Creator {
            verification: verification.clone(),
            specialty: specialty.clone(),
            rating: *rating,
            collaboration_count: *collaboration_count,
            avatar_url: avatar_url.clone(),
        },
        RecordAttrs::Project {
            project_type,
            status,
            asset_count,
        } => EntityMetadata::Project {
            project_type: project_type.clone(),
            status: status.clone(),
            asset_count: *asset_count,
        },
        RecordAttrs::License {
            license_type,
            active,
            price_cents,
        } => EntityMetadata::License {
            license_type: license_type.clone(),
            active: *active,
            price_cents: *price_cents,
        },
    }
}

/// Wrap the first case-insensitive occurrence of the needle in
/// `<mark>..</mark>`. Returns `None` when the text does not contain it.
pub fn highlight_fragment(text: &str, needle: &str) -> Option<String> {
    if needle.is_empty() {
        return None;
    }
    let start = text.to_lowercase().find(&needle.to_lowercase())?;
    // find() on the lowercased copy can land inside a multi-byte boundary of
    // the original when casing changes byte lengths; skip highlighting then.
    if !text.is_char_boundary(start) || !text.is_char_boundary(start + needle.len()) {
        return None;
    }
    let end = start + needle.len();
    Some(format!(
        "{}<mark>{}</mark>{}",
        &text[..start],
        &text[start..end],
        &text[end..]
    ))
}

/// Run one autocomplete leg: small-cap prefix-oriented fetch, ordered by
/// match quality (exact title, then prefix, then arbitrary), no scoring.
pub async fn run_suggest<S: RecordStore>(
    store: &S,
    kind: EntityKind,
    prefix: &str,
    visibility: Visibility,
    limit: usize,
) -> Result<Vec<SuggestionItem>> {
    if visibility == Visibility::Nothing {
        return Ok(Vec::new());
    }
    let query = build_query(kind, Some(prefix), &SearchFilters::default(), visibility, limit);
    let mut records = store.fetch(&query).await?;

    let needle = prefix.to_lowercase();
    records.sort_by(|a, b| {
        suggest_rank(&a.title, &needle)
            .cmp(&suggest_rank(&b.title, &needle))
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(records
        .into_iter()
        .take(limit)
        .map(|record| SuggestionItem {
            id: record.id,
            title: record.title,
            kind,
            subtitle: subtitle_for(&record.attrs),
            thumbnail: thumbnail_for(&record.attrs),
        })
        .collect())
}

/// Match-quality rank for autocomplete ordering: exact title match first,
/// then prefix match, then arbitrary.
pub(crate) fn suggest_rank(title: &str, needle_lower: &str) -> u8 {
    let title_lower = title.to_lowercase();
    if title_lower == *needle_lower {
        0
    } else if title_lower.starts_with(needle_lower) {
        1
    } else {
        2
    }
}

fn subtitle_for(attrs: &RecordAttrs) -> Option<String> {
    match attrs {
        RecordAttrs::Asset { asset_type, .. } => Some(asset_type.clone()),
        RecordAttrs::Creator {
            specialty,
            verification,
            ..
        } => specialty.clone().or_else(|| Some(verification.clone())),
        RecordAttrs::Project { project_type, .. } => Some(project_type.clone()),
        RecordAttrs::License { license_type, .. } => Some(license_type.clone()),
    }
}

fn thumbnail_for(attrs: &RecordAttrs) -> Option<String> {
    match attrs {
        RecordAttrs::Asset { thumbnail_url, .. } => thumbnail_url.clone(),
        RecordAttrs::Creator { avatar_url, .. } => avatar_url.clone(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetFilters;

    #[test]
    fn test_build_query_always_excludes_deleted() {
        let query = build_query(
            EntityKind::Asset,
            Some("logo"),
            &SearchFilters::default(),
            Visibility::Everything,
            100,
        );
        assert!(query.conditions.contains(&Condition::NotDeleted));
        assert_eq!(query.limit, 100);
        let text = query.text.unwrap();
        assert_eq!(text.needle, "logo");
        assert!(text.fields.contains(&"title".to_string()));
    }

    #[test]
    fn test_build_query_carries_filters_and_visibility() {
        let filters = SearchFilters {
            assets: AssetFilters {
                asset_type: Some("logo".to_string()),
                ..Default::default()
            },
            owner_id: Some("owner-7".to_string()),
            tags: vec!["brand".to_string()],
            ..Default::default()
        };
        let query = build_query(
            EntityKind::Asset,
            Some("mark"),
            &filters,
            Visibility::OwnedBy("owner-7".to_string()),
            50,
        );
        assert_eq!(query.visibility, Visibility::OwnedBy("owner-7".to_string()));
        assert!(query.conditions.iter().any(|c| matches!(
            c,
            Condition::Equals { field, value } if field == "asset_type" && value == "logo"
        )));
        assert!(query.conditions.iter().any(|c| matches!(
            c,
            Condition::Equals { field, value } if field == "owner_id" && value == "owner-7"
        )));
        assert!(query
            .conditions
            .iter()
            .any(|c| matches!(c, Condition::AnyTag(tags) if tags == &vec!["brand".to_string()])));
    }

    #[test]
    fn test_highlight_first_match_only() {
        assert_eq!(
            highlight_fragment("Brand Logo and logo pack", "logo"),
            Some("Brand <mark>Logo</mark> and logo pack".to_string())
        );
        assert_eq!(highlight_fragment("Sunset photo", "logo"), None);
        assert_eq!(highlight_fragment("anything", ""), None);
    }

    #[test]
    fn test_suggest_rank_ordering() {
        assert_eq!(suggest_rank("logo", "logo"), 0);
        assert_eq!(suggest_rank("Logo Pack", "logo"), 1);
        assert_eq!(suggest_rank("Brand Logo", "logo"), 2);
    }
}
