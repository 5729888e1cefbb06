//! Project adapter: searchable fields and filter conditions.

use crate::store::Condition;
use crate::types::ProjectFilters;

/// Text fields searched for projects.
pub const TEXT_FIELDS: &[&str] = &["title", "description", "tags"];

/// Translate project filters into attribute conditions.
pub fn conditions(filters: &ProjectFilters) -> Vec<Condition> {
    let mut conditions = Vec::new();
    if let Some(project_type) = &filters.project_type {
        conditions.push(Condition::Equals {
            field: "project_type".to_string(),
            value: project_type.clone(),
        });
    }
    if let Some(status) = &filters.status {
        conditions.push(Condition::Equals {
            field: "status".to_string(),
            value: status.clone(),
        });
    }
    conditions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_and_status_translate() {
        let filters = ProjectFilters {
            project_type: Some("campaign".to_string()),
            status: Some("active".to_string()),
        };
        assert_eq!(conditions(&filters).len(), 2);
    }
}
