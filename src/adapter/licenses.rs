//! License adapter: searchable fields and filter conditions.

use crate::store::Condition;
use crate::types::LicenseFilters;

/// Text fields searched for licenses.
pub const TEXT_FIELDS: &[&str] = &["title", "description"];

/// Translate license filters into attribute conditions.
pub fn conditions(filters: &LicenseFilters) -> Vec<Condition> {
    let mut conditions = Vec::new();
    if let Some(license_type) = &filters.license_type {
        conditions.push(Condition::Equals {
            field: "license_type".to_string(),
            value: license_type.clone(),
        });
    }
    conditions
}
