//! Creator adapter: searchable fields and filter conditions.

use crate::store::Condition;
use crate::types::CreatorFilters;

/// Text fields searched for creators. Specialty is a creator-only text
/// field, so creators match on it where other kinds cannot.
pub const TEXT_FIELDS: &[&str] = &["title", "description", "specialty", "tags"];

/// Translate creator filters into attribute conditions.
pub fn conditions(filters: &CreatorFilters) -> Vec<Condition> {
    let mut conditions = Vec::new();
    if let Some(verification) = &filters.verification {
        conditions.push(Condition::Equals {
            field: "verification".to_string(),
            value: verification.clone(),
        });
    }
    conditions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_filter() {
        let filters = CreatorFilters {
            verification: Some("verified".to_string()),
        };
        let conditions = conditions(&filters);
        assert_eq!(
            conditions,
            vec![Condition::Equals {
                field: "verification".to_string(),
                value: "verified".to_string(),
            }]
        );
    }
}
