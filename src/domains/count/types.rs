use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Column used to de-duplicate rows when none is specified
pub const DEFAULT_UNIQUE_COLUMN: &str = "person_id";

/// One numeric metric definition with up to two optional filter predicates.
///
/// Filter members are plain strings; a `(variable, value)` pair only reaches
/// the persisted form when both members are non-empty. `index` mirrors the
/// count's position in the document's `counts` collection and is rewritten
/// on every reindex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Count {
    pub id: String,
    pub name: String,
    pub unique_column: String,
    pub variable1: String,
    pub value1: String,
    pub variable2: String,
    pub value2: String,
    pub index: usize,
}

/// Persisted filter block of one count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountFilters {
    #[serde(default)]
    pub unique: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<String>,
}

/// Persisted form of one count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub filters: CountFilters,
}

impl Count {
    pub fn new(index: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            unique_column: DEFAULT_UNIQUE_COLUMN.to_string(),
            variable1: String::new(),
            value1: String::new(),
            variable2: String::new(),
            value2: String::new(),
            index,
        }
    }

    /// Backfill a generated id if the stored one is blank
    pub fn ensure_id(&mut self) {
        if self.id.trim().is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
    }

    /// A count without an id or name is excluded from the persisted document
    pub fn is_persistable(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty()
    }

    pub fn filters(&self) -> CountFilters {
        let first = filter_pair(&self.variable1, &self.value1);
        let second = filter_pair(&self.variable2, &self.value2);
        CountFilters {
            unique: if self.unique_column.trim().is_empty() {
                DEFAULT_UNIQUE_COLUMN.to_string()
            } else {
                self.unique_column.clone()
            },
            variable1: first.clone().map(|(v, _)| v),
            value1: first.map(|(_, v)| v),
            variable2: second.clone().map(|(v, _)| v),
            value2: second.map(|(_, v)| v),
        }
    }

    pub fn from_record(record: CountRecord, index: usize) -> Self {
        let mut count = Self {
            id: record.id,
            name: record.name,
            unique_column: record.filters.unique,
            variable1: record.filters.variable1.unwrap_or_default(),
            value1: record.filters.value1.unwrap_or_default(),
            variable2: record.filters.variable2.unwrap_or_default(),
            value2: record.filters.value2.unwrap_or_default(),
            index,
        };
        count.ensure_id();
        if count.unique_column.trim().is_empty() {
            count.unique_column = DEFAULT_UNIQUE_COLUMN.to_string();
        }
        count
    }

    pub fn to_record(&self) -> CountRecord {
        CountRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            filters: self.filters(),
        }
    }
}

// Both members must be non-empty for the pair to count as a filter
fn filter_pair(variable: &str, value: &str) -> Option<(String, String)> {
    if variable.trim().is_empty() || value.trim().is_empty() {
        None
    } else {
        Some((variable.to_string(), value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_count_defaults() {
        let count = Count::new(3);
        assert!(!count.id.is_empty());
        assert!(count.name.is_empty());
        assert_eq!(count.unique_column, DEFAULT_UNIQUE_COLUMN);
        assert_eq!(count.index, 3);
    }

    #[test]
    fn test_filter_pair_requires_both_members() {
        let mut count = Count::new(0);
        count.name = "Enrolled".to_string();
        count.variable1 = "status".to_string();
        // value1 left empty: pair must not be emitted
        count.variable2 = "site".to_string();
        count.value2 = "north".to_string();

        let filters = count.filters();
        assert_eq!(filters.unique, DEFAULT_UNIQUE_COLUMN);
        assert!(filters.variable1.is_none());
        assert!(filters.value1.is_none());
        assert_eq!(filters.variable2.as_deref(), Some("site"));
        assert_eq!(filters.value2.as_deref(), Some("north"));
    }

    #[test]
    fn test_is_persistable() {
        let mut count = Count::new(0);
        assert!(!count.is_persistable()); // no name yet
        count.name = "Enrolled".to_string();
        assert!(count.is_persistable());
        count.id = "  ".to_string();
        assert!(!count.is_persistable());
    }

    #[test]
    fn test_from_record_backfills_id_and_unique() {
        let record = CountRecord {
            id: String::new(),
            name: "Enrolled".to_string(),
            filters: CountFilters {
                unique: String::new(),
                variable1: Some("status".to_string()),
                value1: Some("active".to_string()),
                variable2: None,
                value2: None,
            },
        };
        let count = Count::from_record(record, 1);
        assert!(!count.id.is_empty());
        assert_eq!(count.unique_column, DEFAULT_UNIQUE_COLUMN);
        assert_eq!(count.variable1, "status");
        assert_eq!(count.value1, "active");
        assert!(count.variable2.is_empty());
        assert_eq!(count.index, 1);
    }

    #[test]
    fn test_filters_serialization_skips_empty_pairs() {
        let mut count = Count::new(0);
        count.name = "Enrolled".to_string();
        let json = serde_json::to_value(count.to_record()).unwrap();
        let filters = &json["filters"];
        assert_eq!(filters["unique"], DEFAULT_UNIQUE_COLUMN);
        assert!(filters.get("variable1").is_none());
        assert!(filters.get("value2").is_none());
    }
}
