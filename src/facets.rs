//! Facet aggregation: per-value counts for filterable fields, partitioned
//! per entity kind.

use ahash::AHashMap;
use futures::future::join_all;
use log::warn;

use crate::adapter;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::store::{RawRecord, RecordStore, Visibility};
use crate::types::{EnhancedSearchFacets, EntityKind, FacetGroup, FacetOption, SearchFilters};

/// The filterable fields exposed as facets for a kind, with display labels.
pub fn facet_fields(kind: EntityKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        EntityKind::Asset => &[("asset_type", "Asset Type"), ("status", "Status")],
        EntityKind::Creator => &[("verification", "Verification")],
        EntityKind::Project => &[("project_type", "Project Type")],
        EntityKind::License => &[("license_type", "License Type")],
    }
}

/// The caller's active selection for a faceted field, if any.
fn selected_value<'a>(filters: &'a SearchFilters, kind: EntityKind, field: &str) -> Option<&'a str> {
    match (kind, field) {
        (EntityKind::Asset, "asset_type") => filters.assets.asset_type.as_deref(),
        (EntityKind::Asset, "status") => filters.assets.status.as_deref(),
        (EntityKind::Creator, "verification") => filters.creators.verification.as_deref(),
        (EntityKind::Project, "project_type") => filters.projects.project_type.as_deref(),
        (EntityKind::License, "license_type") => filters.licenses.license_type.as_deref(),
        _ => None,
    }
}

/// A copy of the filters with one faceted field's own selection removed, so
/// its counts reflect all available values.
fn without_field(filters: &SearchFilters, kind: EntityKind, field: &str) -> SearchFilters {
    let mut filters = filters.clone();
    match (kind, field) {
        (EntityKind::Asset, "asset_type") => filters.assets.asset_type = None,
        (EntityKind::Asset, "status") => filters.assets.status = None,
        (EntityKind::Creator, "verification") => filters.creators.verification = None,
        (EntityKind::Project, "project_type") => filters.projects.project_type = None,
        (EntityKind::License, "license_type") => filters.licenses.license_type = None,
        _ => {}
    }
    filters
}

/// A copy of the filters with every facetable filter for one kind removed.
pub(crate) fn without_kind(filters: &SearchFilters, kind: EntityKind) -> SearchFilters {
    let mut filters = filters.clone();
    match kind {
        EntityKind::Asset => filters.assets = Default::default(),
        EntityKind::Creator => filters.creators = Default::default(),
        EntityKind::Project => filters.projects = Default::default(),
        EntityKind::License => filters.licenses = Default::default(),
    }
    filters
}

/// Tally one field over a candidate record set into an ordered facet group.
fn tally<'a, I>(
    kind: EntityKind,
    field: &str,
    label: &str,
    records: I,
    selected: Option<&str>,
) -> FacetGroup
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut counts: AHashMap<String, u64> = AHashMap::new();
    for record in records {
        if let Some(value) = record.attr_value(field) {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
    }

    let mut options: Vec<FacetOption> = counts
        .into_iter()
        .map(|(value, count)| FacetOption {
            is_selected: selected.is_some_and(|s| s.eq_ignore_ascii_case(&value)),
            label: display_label(&value),
            value,
            count,
        })
        .collect();
    options.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    FacetGroup {
        field: field.to_string(),
        label: label.to_string(),
        kind,
        options,
    }
}

/// Humanize a stored value for display ("royalty_free" -> "Royalty Free").
fn display_label(value: &str) -> String {
    value
        .split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compute facet groups from candidate sets fetched with each kind's own
/// facetable filters relaxed.
///
/// Every field is tallied with the other active per-kind filters applied in
/// memory and its own selection excluded, so a field with an active filter
/// still counts all of its available values.
pub fn compute(
    candidates: &[(EntityKind, Vec<RawRecord>)],
    filters: &SearchFilters,
) -> Vec<FacetGroup> {
    let mut groups = Vec::new();
    for (kind, records) in candidates {
        for (field, label) in facet_fields(*kind) {
            let relaxed = without_field(filters, *kind, field);
            let group = tally(
                *kind,
                field,
                label,
                records
                    .iter()
                    .filter(|record| adapter::matches_kind_filters(record, &relaxed)),
                selected_value(filters, *kind, field),
            );
            if !group.options.is_empty() {
                groups.push(group);
            }
        }
    }
    groups
}

/// Compute enhanced facets straight from the store.
///
/// For each faceted field whose filter is currently active, the kind's query
/// is re-issued with that field's own selection removed. Also computes the
/// two headline totals (all filters ignored / current filters applied) via
/// per-kind count queries. Per-kind failures are logged and skipped (counts
/// as zero) so one kind cannot sink the whole call.
pub async fn enhanced<S: RecordStore>(
    store: &S,
    text: &str,
    scopes: &[(EntityKind, Visibility)],
    filters: &SearchFilters,
    config: &SearchConfig,
) -> Result<EnhancedSearchFacets> {
    let mut groups = Vec::new();

    for (kind, visibility) in scopes {
        if *visibility == Visibility::Nothing {
            continue;
        }

        let filtered_query = adapter::build_query(
            *kind,
            Some(text),
            filters,
            visibility.clone(),
            config.max_results_per_entity,
        );
        let filtered_records = match store.fetch(&filtered_query).await {
            Ok(records) => records,
            Err(e) => {
                warn!("facet fetch failed for {kind}, skipping kind: {e}");
                continue;
            }
        };

        for (field, label) in facet_fields(*kind) {
            let selected = selected_value(filters, *kind, field);
            let group = if selected.is_some() {
                let relaxed = without_field(filters, *kind, field);
                let relaxed_query = adapter::build_query(
                    *kind,
                    Some(text),
                    &relaxed,
                    visibility.clone(),
                    config.max_results_per_entity,
                );
                match store.fetch(&relaxed_query).await {
                    Ok(relaxed_records) => tally(*kind, field, label, &relaxed_records, selected),
                    Err(e) => {
                        warn!("relaxed facet fetch failed for {kind}/{field}: {e}");
                        continue;
                    }
                }
            } else {
                tally(*kind, field, label, &filtered_records, selected)
            };
            if !group.options.is_empty() {
                groups.push(group);
            }
        }
    }

    let total_unfiltered = total_count(store, text, scopes, &SearchFilters::default(), config).await;
    let total_filtered = total_count(store, text, scopes, filters, config).await;

    Ok(EnhancedSearchFacets {
        groups,
        total_unfiltered,
        total_filtered,
    })
}

/// Sum of per-kind match counts, fanned out concurrently. Per-kind failures
/// are logged and counted as zero so one kind cannot sink the whole call.
async fn total_count<S: RecordStore>(
    store: &S,
    text: &str,
    scopes: &[(EntityKind, Visibility)],
    filters: &SearchFilters,
    config: &SearchConfig,
) -> u64 {
    let futures = scopes.iter().map(|(kind, visibility)| {
        let query = adapter::build_query(
            *kind,
            Some(text),
            filters,
            visibility.clone(),
            config.max_results_per_entity,
        );
        async move {
            if query.visibility == Visibility::Nothing {
                return 0;
            }
            match store.count(&query).await {
                Ok(count) => count,
                Err(e) => {
                    warn!("facet count failed for {}: {e}", query.kind);
                    0
                }
            }
        }
    });
    join_all(futures).await.into_iter().sum()
}
