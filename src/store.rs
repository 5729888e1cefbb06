//! Interfaces to the external collaborators: the record store, the
//! visibility provider, and the analytics sink.
//!
//! The search core never talks to a database directly. Each adapter builds a
//! bounded [`RecordQuery`] and hands it to a [`RecordStore`] implementation;
//! authorization scopes come from a [`VisibilityProvider`] and are ANDed into
//! the query, never decided here.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::EntityKind;

/// Case-insensitive substring match, OR-ed across the named text fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPredicate {
    /// The sanitized needle to look for.
    pub needle: String,
    /// Field names to search (e.g. `["title", "description", "tags"]`).
    pub fields: Vec<String>,
}

/// A single attribute condition, ANDed with the others in a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Field equals the value, case-insensitively.
    Equals { field: String, value: String },
    /// Record carries at least one of the given tags.
    AnyTag(Vec<String>),
    /// Creation date falls inside the (inclusive) bounds; open bounds allowed.
    DateBetween {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
    /// Soft-deleted records are excluded. Every adapter adds this
    /// unconditionally, so deletions never require an index action.
    NotDeleted,
}

/// The visibility scope the authorization provider returns for one user and
/// entity kind. Adapters AND it into their query verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Visibility {
    /// No restriction.
    Everything,
    /// Only records owned by this id.
    OwnedBy(String),
    /// Only records with these ids.
    Within(Vec<String>),
    /// Nothing is visible; the adapter skips the store entirely.
    Nothing,
}

impl Visibility {
    /// Whether a record with the given owner and id is inside this scope.
    pub fn allows(&self, owner_id: &str, record_id: &str) -> bool {
        match self {
            Visibility::Everything => true,
            Visibility::OwnedBy(owner) => owner == owner_id,
            Visibility::Within(ids) => ids.iter().any(|id| id == record_id),
            Visibility::Nothing => false,
        }
    }
}

/// A bounded text + attribute query against one entity kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordQuery {
    pub kind: EntityKind,
    /// Text predicate; `None` matches all records (used for corpus sampling
    /// and unfiltered counts).
    pub text: Option<TextPredicate>,
    pub conditions: Vec<Condition>,
    pub visibility: Visibility,
    /// Hard cap on returned rows; bounds worst-case fan-out cost.
    pub limit: usize,
}

/// Kind-specific raw attributes, mirroring the metadata payload so mappers
/// are exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordAttrs {
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

impl RecordAttrs {
    /// The entity kind these attributes belong to.
    pub fn kind(&self) -> EntityKind {
        match self {
            RecordAttrs::Asset { .. } => EntityKind::Asset,
            RecordAttrs::Creator { .. } => EntityKind::Creator,
            RecordAttrs::Project { .. } => EntityKind::Project,
            RecordAttrs::License { .. } => EntityKind::License,
        }
    }
}

/// A raw row returned by the store, before normalization into a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub attrs: RecordAttrs,
}

impl RawRecord {
    /// All text values a named field resolves to on this record.
    ///
    /// This defines the reference semantics of [`TextPredicate`] field names;
    /// store implementations must match against the same fields.
    pub fn field_text(&self, field: &str) -> Vec<&str> {
        match field {
            "title" => vec![self.title.as_str()],
            "description" => self.description.as_deref().into_iter().collect(),
            "tags" => self.tags.iter().map(String::as_str).collect(),
            "specialty" => match &self.attrs {
                RecordAttrs::Creator {
                    specialty: Some(s), ..
                } => vec![s.as_str()],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// The value of a named attribute field, for condition evaluation.
    pub fn attr_value(&self, field: &str) -> Option<&str> {
        match (&self.attrs, field) {
            (RecordAttrs::Asset { asset_type, .. }, "asset_type") => Some(asset_type),
            (RecordAttrs::Asset { status, .. }, "status") => Some(status),
            (RecordAttrs::Asset { format, .. }, "format") => format.as_deref(),
            (RecordAttrs::Creator { verification, .. }, "verification") => Some(verification),
            (RecordAttrs::Project { project_type, .. }, "project_type") => Some(project_type),
            (RecordAttrs::Project { status, .. }, "status") => Some(status),
            (RecordAttrs::License { license_type, .. }, "license_type") => Some(license_type),
            (_, "owner_id") => Some(&self.owner_id),
            _ => None,
        }
    }

    /// Reference evaluation of a full [`RecordQuery`] against this record.
    ///
    /// Production stores translate the query into their native predicates;
    /// this method pins down the exact semantics they must reproduce and
    /// backs the in-memory store used in tests.
    pub fn matches(&self, query: &RecordQuery) -> bool {
        if self.attrs.kind() != query.kind {
            return false;
        }
        if !query.visibility.allows(&self.owner_id, &self.id) {
            return false;
        }
        if let Some(text) = &query.text {
            let needle = text.needle.to_lowercase();
            let hit = text.fields.iter().any(|field| {
                self.field_text(field)
                    .iter()
                    .any(|value| value.to_lowercase().contains(&needle))
            });
            if !hit {
                return false;
            }
        }
        for condition in &query.conditions {
            let ok = match condition {
                Condition::Equals { field, value } => self
                    .attr_value(field)
                    .is_some_and(|v| v.eq_ignore_ascii_case(value)),
                Condition::AnyTag(tags) => tags.iter().any(|tag| {
                    self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
                }),
                Condition::DateBetween { from, to } => {
                    from.is_none_or(|from| self.created_at >= from)
                        && to.is_none_or(|to| self.created_at <= to)
                }
                Condition::NotDeleted => self.deleted_at.is_none(),
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

/// The persistent record store, one bounded query at a time.
///
/// Futures are `Send` so the orchestrator can fan legs out across tasks.
pub trait RecordStore: Send + Sync {
    /// Fetch rows matching the query, capped at `query.limit`.
    fn fetch(&self, query: &RecordQuery) -> impl Future<Output = Result<Vec<RawRecord>>> + Send;

    /// Count rows matching the query without materializing them.
    fn count(&self, query: &RecordQuery) -> impl Future<Output = Result<u64>> + Send;

    /// Texts of recent past queries that returned results, newest first,
    /// for the spelling corpus.
    fn recent_queries(&self, limit: usize) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Supplies per-user visibility scopes. The search core performs no
/// authorization decisions itself.
pub trait VisibilityProvider: Send + Sync {
    /// The scope the given user has over the given entity kind.
    fn scope(&self, user_id: Option<&str>, kind: EntityKind) -> Result<Visibility>;
}

/// A recorded search execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEvent {
    pub query: String,
    pub kinds: Vec<EntityKind>,
    pub result_count: usize,
    pub execution_time_ms: u64,
    pub user_id: Option<String>,
}

/// A recorded result click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
    pub result_id: String,
    pub query: String,
    /// Zero-based position of the clicked result in the returned page.
    pub position: usize,
}

/// Best-effort analytics sink. Calls are issued fire-and-forget; failures
/// are logged by the orchestrator and never surfaced or retried.
pub trait AnalyticsSink: Send + Sync {
    fn record_search(&self, event: SearchEvent) -> impl Future<Output = Result<()>> + Send;

    fn record_click(&self, event: ClickEvent) -> impl Future<Output = Result<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn asset_record(id: &str, title: &str, tags: &[&str]) -> RawRecord {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        RawRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: Some("A reusable brand mark".to_string()),
            owner_id: "owner-1".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: at,
            updated_at: at,
            deleted_at: None,
            attrs: RecordAttrs::Asset {
                asset_type: "logo".to_string(),
                status: "approved".to_string(),
                format: Some("svg".to_string()),
                thumbnail_url: None,
                download_count: 10,
            },
        }
    }

    fn base_query(kind: EntityKind) -> RecordQuery {
        RecordQuery {
            kind,
            text: None,
            conditions: vec![Condition::NotDeleted],
            visibility: Visibility::Everything,
            limit: 100,
        }
    }

    #[test]
    fn test_text_predicate_or_across_fields() {
        let record = asset_record("a1", "Brand Logo", &["identity"]);

        let mut query = base_query(EntityKind::Asset);
        query.text = Some(TextPredicate {
            needle: "reusable".to_string(),
            fields: vec!["title".to_string(), "description".to_string()],
        });
        assert!(record.matches(&query));

        query.text = Some(TextPredicate {
            needle: "identity".to_string(),
            fields: vec!["title".to_string()],
        });
        assert!(!record.matches(&query));

        query.text = Some(TextPredicate {
            needle: "identity".to_string(),
            fields: vec!["title".to_string(), "tags".to_string()],
        });
        assert!(record.matches(&query));
    }

    #[test]
    fn test_soft_deleted_excluded() {
        let mut record = asset_record("a1", "Brand Logo", &[]);
        let query = base_query(EntityKind::Asset);
        assert!(record.matches(&query));

        record.deleted_at = Some(Utc::now());
        assert!(!record.matches(&query));
    }

    #[test]
    fn test_visibility_scopes() {
        let record = asset_record("a1", "Brand Logo", &[]);

        let mut query = base_query(EntityKind::Asset);
        query.visibility = Visibility::OwnedBy("owner-1".to_string());
        assert!(record.matches(&query));

        query.visibility = Visibility::OwnedBy("owner-2".to_string());
        assert!(!record.matches(&query));

        query.visibility = Visibility::Within(vec!["a1".to_string()]);
        assert!(record.matches(&query));

        query.visibility = Visibility::Nothing;
        assert!(!record.matches(&query));
    }

    #[test]
    fn test_equals_condition_case_insensitive() {
        let record = asset_record("a1", "Brand Logo", &[]);

        let mut query = base_query(EntityKind::Asset);
        query.conditions.push(Condition::Equals {
            field: "asset_type".to_string(),
            value: "LOGO".to_string(),
        });
        assert!(record.matches(&query));

        query.conditions.push(Condition::Equals {
            field: "status".to_string(),
            value: "pending".to_string(),
        });
        assert!(!record.matches(&query));
    }

    #[test]
    fn test_date_between_condition() {
        let record = asset_record("a1", "Brand Logo", &[]);
        let mut query = base_query(EntityKind::Asset);

        query.conditions.push(Condition::DateBetween {
            from: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            to: None,
        });
        assert!(record.matches(&query));

        query.conditions.push(Condition::DateBetween {
            from: None,
            to: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
        });
        assert!(!record.matches(&query));
    }

    #[test]
    fn test_kind_mismatch_never_matches() {
        let record = asset_record("a1", "Brand Logo", &[]);
        let query = base_query(EntityKind::Creator);
        assert!(!record.matches(&query));
    }
}
