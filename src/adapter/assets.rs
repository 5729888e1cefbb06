//! Asset adapter: searchable fields and filter conditions.

use crate::store::Condition;
use crate::types::AssetFilters;

/// Text fields searched for assets.
pub const TEXT_FIELDS: &[&str] = &["title", "description", "tags"];

/// Translate asset filters into attribute conditions.
pub fn conditions(filters: &AssetFilters) -> Vec<Condition> {
    let mut conditions = Vec::new();
    if let Some(asset_type) = &filters.asset_type {
        conditions.push(Condition::Equals {
            field: "asset_type".to_string(),
            value: asset_type.clone(),
        });
    }
    if let Some(status) = &filters.status {
        conditions.push(Condition::Equals {
            field: "status".to_string(),
            value: status.clone(),
        });
    }
    if let Some(format) = &filters.format {
        conditions.push(Condition::Equals {
            field: "format".to_string(),
            value: format.clone(),
        });
    }
    conditions
}
