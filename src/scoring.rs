//! Relevance scoring: four independent signals combined linearly.

use chrono::{DateTime, Utc};

use crate::config::SearchConfig;
use crate::store::RecordAttrs;
use crate::types::ScoreBreakdown;

/// Flat bonus when the description contains the query.
const DESCRIPTION_BONUS: f64 = 0.3;

/// Score when the title contains the query as a substring.
const TITLE_CONTAINS_SCORE: f64 = 0.7;

/// Scale applied to the per-word overlap fraction.
const WORD_OVERLAP_SCALE: f64 = 0.5;

/// Popularity/quality score when no signal is available.
const NEUTRAL_SCORE: f64 = 0.5;

/// Textual relevance of a title/description pair against a query.
///
/// Exact case-insensitive title match scores 1.0; a title containing the
/// query scores 0.7; otherwise the fraction of query words individually
/// contained in title words, scaled by 0.5. A description containing the
/// query adds a flat +0.3; the total is capped at 1.0.
pub fn textual_relevance(query: &str, title: &str, description: Option<&str>) -> f64 {
    let query_lower = query.to_lowercase();
    let title_lower = title.to_lowercase();

    let mut score = if title_lower == query_lower {
        1.0
    } else if title_lower.contains(&query_lower) {
        TITLE_CONTAINS_SCORE
    } else {
        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        if query_words.is_empty() {
            0.0
        } else {
            let title_words: Vec<&str> = title_lower.split_whitespace().collect();
            let matched = query_words
                .iter()
                .filter(|qw| title_words.iter().any(|tw| tw.contains(*qw)))
                .count();
            (matched as f64 / query_words.len() as f64) * WORD_OVERLAP_SCALE
        }
    };

    if let Some(description) = description
        && description.to_lowercase().contains(&query_lower)
    {
        score += DESCRIPTION_BONUS;
    }

    score.min(1.0)
}

/// Recency score: exponential decay with a configurable half-life, zero once
/// the age exceeds the configured maximum.
///
/// `score = e^(-ln(2)/half_life * age_days)`, so a record exactly one
/// half-life old scores 0.5. Monotonically non-increasing in age.
pub fn recency_score(created_at: DateTime<Utc>, now: DateTime<Utc>, config: &SearchConfig) -> f64 {
    let age_days = (now - created_at).num_seconds().max(0) as f64 / 86_400.0;
    recency_score_for_age(age_days, config)
}

/// Recency score from a precomputed age in days.
pub fn recency_score_for_age(age_days: f64, config: &SearchConfig) -> f64 {
    if age_days > config.recency_max_age_days {
        return 0.0;
    }
    let lambda = std::f64::consts::LN_2 / config.recency_half_life_days;
    (-lambda * age_days).exp().clamp(0.0, 1.0)
}

/// Kind-specific popularity signal, normalized into `[0, 1]` via capped
/// linear scaling. Neutral 0.5 when no signal is available.
pub fn popularity_score(attrs: &RecordAttrs) -> f64 {
    match attrs {
        RecordAttrs::Asset { download_count, .. } => (*download_count as f64 / 1000.0).min(1.0),
        RecordAttrs::Creator {
            rating,
            collaboration_count,
            ..
        } => {
            let collab = (*collaboration_count as f64 / 50.0).min(1.0);
            match rating {
                Some(rating) => 0.5 * collab + 0.5 * (rating / 5.0).clamp(0.0, 1.0),
                None if *collaboration_count == 0 => NEUTRAL_SCORE,
                None => collab,
            }
        }
        RecordAttrs::Project { asset_count, .. } => {
            if *asset_count == 0 {
                NEUTRAL_SCORE
            } else {
                (*asset_count as f64 / 25.0).min(1.0)
            }
        }
        // Licenses carry no usage signal.
        RecordAttrs::License { .. } => NEUTRAL_SCORE,
    }
}

/// Quality indicator from verification/approval/active status, mapped to a
/// small discrete scale.
pub fn quality_score(attrs: &RecordAttrs) -> f64 {
    match attrs {
        RecordAttrs::Asset { status, .. } => status_scale(status),
        RecordAttrs::Creator { verification, .. } => status_scale(verification),
        RecordAttrs::Project { status, .. } => status_scale(status),
        RecordAttrs::License { active, .. } => {
            if *active {
                1.0
            } else {
                NEUTRAL_SCORE
            }
        }
    }
}

fn status_scale(status: &str) -> f64 {
    match status.to_lowercase().as_str() {
        "approved" | "verified" | "active" => 1.0,
        "pending" | "draft" => 0.7,
        _ => NEUTRAL_SCORE,
    }
}

/// Compute the full breakdown for one record.
pub fn score_record(
    query: &str,
    title: &str,
    description: Option<&str>,
    created_at: DateTime<Utc>,
    attrs: &RecordAttrs,
    now: DateTime<Utc>,
    config: &SearchConfig,
) -> ScoreBreakdown {
    ScoreBreakdown {
        textual: textual_relevance(query, title, description),
        recency: recency_score(created_at, now, config),
        popularity: popularity_score(attrs),
        quality: quality_score(attrs),
    }
}
