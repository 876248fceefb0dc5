//! Record projection
//!
//! A [`FieldProjection`] reduces each record to a fixed set of fields before
//! it is accumulated. Fields missing on the source come out as `null`, so
//! every projected record has the same keys.

use crate::types::{JsonObject, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Set of field names to keep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldProjection {
    fields: BTreeSet<String>,
}

impl FieldProjection {
    /// Create a projection from field names
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list, e.g. `login,id`.
    ///
    /// Returns `None` when the list names no fields.
    pub fn parse(list: &str) -> Option<Self> {
        let projection = Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty()),
        );
        (!projection.is_empty()).then_some(projection)
    }

    /// Field names
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no field is named
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reduce `record` to the named fields
    pub fn project(&self, record: &Record) -> Record {
        let projected: JsonObject = self
            .fields
            .iter()
            .map(|field| {
                let value = record.get(field).cloned().unwrap_or(Value::Null);
                (field.clone(), value)
            })
            .collect();
        Value::Object(projected)
    }
}

/// Apply an optional projection; without one the record passes through
pub fn project(record: Record, projection: Option<&FieldProjection>) -> Record {
    match projection {
        Some(projection) => projection.project(&record),
        None => record,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_project_keeps_named_fields() {
        let projection = FieldProjection::new(["login", "id"]);
        let record = json!({"login": "alice", "id": 7, "site_admin": false});

        assert_eq!(
            projection.project(&record),
            json!({"login": "alice", "id": 7})
        );
    }

    #[test]
    fn test_project_missing_field_is_null() {
        let projection = FieldProjection::new(["login", "email"]);
        let record = json!({"login": "alice"});

        assert_eq!(
            projection.project(&record),
            json!({"login": "alice", "email": null})
        );
    }

    #[test]
    fn test_project_non_object_record() {
        let projection = FieldProjection::new(["id"]);
        assert_eq!(projection.project(&json!(42)), json!({"id": null}));
    }

    #[test]
    fn test_project_is_idempotent() {
        let projection = FieldProjection::new(["full_name", "stargazers_count"]);
        let record = json!({
            "full_name": "a/b",
            "stargazers_count": 12,
            "owner": {"login": "a"}
        });

        let once = projection.project(&record);
        let twice = projection.project(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_project_copies_nested_values() {
        let projection = FieldProjection::new(["owner"]);
        let record = json!({"owner": {"login": "a", "id": 1}, "id": 9});

        assert_eq!(
            projection.project(&record),
            json!({"owner": {"login": "a", "id": 1}})
        );
    }

    #[test]
    fn test_project_without_projection_passes_through() {
        let record = json!({"login": "alice", "id": 7});
        assert_eq!(project(record.clone(), None), record);
    }

    #[test]
    fn test_parse() {
        let projection = FieldProjection::parse(" login, id ,,").unwrap();
        assert_eq!(projection.fields().collect::<Vec<_>>(), vec!["id", "login"]);
        assert_eq!(projection.len(), 2);

        assert!(FieldProjection::parse("").is_none());
        assert!(FieldProjection::parse(" , ").is_none());
    }
}
