//! In-memory collaborator doubles shared by the integration tests.
// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;

use unisearch::{
    ClickEvent, EntityKind, RawRecord, RecordAttrs, RecordQuery, RecordStore, Result, SearchError,
    SearchEvent, Visibility, VisibilityProvider,
};

/// Route `log` output through the test harness.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory record store evaluating queries with the reference semantics
/// of `RawRecord::matches`. Failures and latency are injectable per kind.
#[derive(Default)]
pub struct MemoryStore {
    pub records: Vec<RawRecord>,
    pub past_queries: Vec<String>,
    fail_kinds: Mutex<HashSet<EntityKind>>,
    delay_kinds: Mutex<Vec<(EntityKind, Duration)>>,
}

impl MemoryStore {
    pub fn new(records: Vec<RawRecord>) -> Self {
        MemoryStore {
            records,
            ..Default::default()
        }
    }

    pub fn with_past_queries(mut self, queries: Vec<&str>) -> Self {
        self.past_queries = queries.into_iter().map(str::to_string).collect();
        self
    }

    /// Make every query against the given kind fail.
    pub fn fail_kind(&self, kind: EntityKind) {
        self.fail_kinds.lock().insert(kind);
    }

    /// Delay every query against the given kind.
    pub fn delay_kind(&self, kind: EntityKind, delay: Duration) {
        self.delay_kinds.lock().push((kind, delay));
    }

    async fn guard(&self, kind: EntityKind) -> Result<()> {
        let delay = self
            .delay_kinds
            .lock()
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_kinds.lock().contains(&kind) {
            return Err(SearchError::store(format!("injected failure for {kind}")));
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    async fn fetch(&self, query: &RecordQuery) -> Result<Vec<RawRecord>> {
        self.guard(query.kind).await?;
        Ok(self
            .records
            .iter()
            .filter(|record| record.matches(query))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn count(&self, query: &RecordQuery) -> Result<u64> {
        self.guard(query.kind).await?;
        Ok(self
            .records
            .iter()
            .filter(|record| record.matches(query))
            .count() as u64)
    }

    async fn recent_queries(&self, limit: usize) -> Result<Vec<String>> {
        Ok(self.past_queries.iter().take(limit).cloned().collect())
    }
}

/// Visibility provider returning one fixed scope for every kind.
pub struct StaticVisibility {
    pub scope: Visibility,
}

impl StaticVisibility {
    pub fn everything() -> Self {
        StaticVisibility {
            scope: Visibility::Everything,
        }
    }

    pub fn owned_by(owner: &str) -> Self {
        StaticVisibility {
            scope: Visibility::OwnedBy(owner.to_string()),
        }
    }
}

impl VisibilityProvider for StaticVisibility {
    fn scope(&self, _user_id: Option<&str>, _kind: EntityKind) -> Result<Visibility> {
        Ok(self.scope.clone())
    }
}

/// Analytics sink recording every event, optionally failing.
#[derive(Default)]
pub struct RecordingAnalytics {
    pub searches: Mutex<Vec<SearchEvent>>,
    pub clicks: Mutex<Vec<ClickEvent>>,
    pub failing: bool,
}

impl unisearch::AnalyticsSink for RecordingAnalytics {
    async fn record_search(&self, event: SearchEvent) -> Result<()> {
        if self.failing {
            return Err(SearchError::analytics("sink unavailable"));
        }
        self.searches.lock().push(event);
        Ok(())
    }

    async fn record_click(&self, event: ClickEvent) -> Result<()> {
        if self.failing {
            return Err(SearchError::analytics("sink unavailable"));
        }
        self.clicks.lock().push(event);
        Ok(())
    }
}

fn timestamps(days_ago: i64) -> DateTime<Utc> {
    Utc::now() - ChronoDuration::days(days_ago)
}

/// An approved asset record created `days_ago` days ago.
pub fn asset(id: &str, title: &str, description: Option<&str>, days_ago: i64) -> RawRecord {
    let at = timestamps(days_ago);
    RawRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: description.map(str::to_string),
        owner_id: "owner-1".to_string(),
        tags: Vec::new(),
        created_at: at,
        updated_at: at,
        deleted_at: None,
        attrs: RecordAttrs::Asset {
            asset_type: "logo".to_string(),
            status: "approved".to_string(),
            format: Some("svg".to_string()),
            thumbnail_url: None,
            download_count: 0,
        },
    }
}

pub fn asset_typed(id: &str, title: &str, asset_type: &str, status: &str) -> RawRecord {
    let mut record = asset(id, title, None, 10);
    record.attrs = RecordAttrs::Asset {
        asset_type: asset_type.to_string(),
        status: status.to_string(),
        format: None,
        thumbnail_url: None,
        download_count: 0,
    };
    record
}

/// A verified creator record.
pub fn creator(id: &str, title: &str, specialty: Option<&str>, days_ago: i64) -> RawRecord {
    let at = timestamps(days_ago);
    RawRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        owner_id: id.to_string(),
        tags: Vec::new(),
        created_at: at,
        updated_at: at,
        deleted_at: None,
        attrs: RecordAttrs::Creator {
            verification: "verified".to_string(),
            specialty: specialty.map(str::to_string),
            rating: Some(4.5),
            collaboration_count: 12,
            avatar_url: None,
        },
    }
}

/// An active project record.
pub fn project(id: &str, title: &str, days_ago: i64) -> RawRecord {
    let at = timestamps(days_ago);
    RawRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        owner_id: "owner-1".to_string(),
        tags: Vec::new(),
        created_at: at,
        updated_at: at,
        deleted_at: None,
        attrs: RecordAttrs::Project {
            project_type: "campaign".to_string(),
            status: "active".to_string(),
            asset_count: 5,
        },
    }
}

/// An active license record.
pub fn license(id: &str, title: &str, days_ago: i64) -> RawRecord {
    let at = timestamps(days_ago);
    RawRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        owner_id: "owner-1".to_string(),
        tags: Vec::new(),
        created_at: at,
        updated_at: at,
        deleted_at: None,
        attrs: RecordAttrs::License {
            license_type: "royalty_free".to_string(),
            active: true,
            price_cents: Some(4900),
        },
    }
}
