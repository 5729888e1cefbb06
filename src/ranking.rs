//! Merging, ordering, and pagination of per-kind result lists.

use std::cmp::Ordering;

use crate::types::{PaginationInfo, SearchResult, SortOrder};

/// Merge per-kind result lists, sort per the directive, and slice one page.
///
/// The relevance sort is descending by score with a deterministic tie-break
/// on ascending `(kind, id)`, so equal-scored results keep a stable order
/// regardless of fan-out arrival order.
pub fn rank_and_paginate(
    per_kind: Vec<Vec<SearchResult>>,
    sort: SortOrder,
    page: usize,
    limit: usize,
) -> (Vec<SearchResult>, PaginationInfo) {
    let mut merged: Vec<SearchResult> = per_kind.into_iter().flatten().collect();
    sort_results(&mut merged, sort);

    let total = merged.len();
    let page = page.max(1);
    let start = (page - 1).saturating_mul(limit);
    let results: Vec<SearchResult> = if start >= total {
        Vec::new()
    } else {
        merged.drain(start..total.min(start + limit)).collect()
    };

    let pagination = paginate(page, limit, total);
    (results, pagination)
}

/// Sort results in place per the directive.
pub fn sort_results(results: &mut [SearchResult], sort: SortOrder) {
    match sort {
        SortOrder::Relevance => results.sort_by(compare_by_relevance),
        SortOrder::Newest => {
            results.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| tie_break(a, b)))
        }
        SortOrder::Oldest => {
            results.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| tie_break(a, b)))
        }
        SortOrder::Title => results.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| tie_break(a, b))
        }),
    }
}

fn compare_by_relevance(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.relevance_score
        .partial_cmp(&a.relevance_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| tie_break(a, b))
}

fn tie_break(a: &SearchResult, b: &SearchResult) -> Ordering {
    a.kind.cmp(&b.kind).then_with(|| a.id.cmp(&b.id))
}

/// Derive pagination metadata arithmetically from the merged total.
pub fn paginate(page: usize, limit: usize, total: usize) -> PaginationInfo {
    let page = page.max(1);
    let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
    PaginationInfo {
        page,
        limit,
        total,
        total_pages,
        has_next: page * limit < total,
        has_previous: page > 1 && total > 0,
    }
}
