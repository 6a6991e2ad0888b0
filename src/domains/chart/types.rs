use crate::domains::chart::schema::ChartType;
use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One visualization definition inside a section.
///
/// `section_index` and `chart_index` mirror the chart's current position in
/// its parent collections; the UI routes edit events by them, so they are
/// rewritten on every reindex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub id: String,
    pub name: String,
    pub chart_type: ChartType,
    pub fields: HashMap<String, String>,
    pub section_index: usize,
    pub chart_index: usize,
}

/// Persisted form of one chart (one entry of a section's `items` array)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

impl Chart {
    /// New chart at the given position: generated id, default type `Bar`,
    /// empty name, empty values for every `Bar` field key.
    pub fn new(section_index: usize, chart_index: usize) -> Self {
        let chart_type = ChartType::Bar;
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            chart_type,
            fields: empty_fields(chart_type),
            section_index,
            chart_index,
        }
    }

    /// Switch the chart type, re-deriving the field map over the new type's
    /// schema. Values for keys shared between the old and new schema are
    /// carried over; everything else is dropped or defaulted to empty.
    pub fn set_type(&mut self, new_type: ChartType) {
        let mut fields = HashMap::with_capacity(new_type.field_keys().len());
        for key in new_type.field_keys() {
            let value = self.fields.remove(*key).unwrap_or_default();
            fields.insert((*key).to_string(), value);
        }
        self.chart_type = new_type;
        self.fields = fields;
    }

    /// Set one field value. The key must belong to the current type's schema.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> DomainResult<()> {
        if !self.chart_type.has_field(key) {
            return Err(DomainError::FieldNotInSchema {
                chart_type: self.chart_type.to_string(),
                field: key.to_string(),
            });
        }
        self.fields.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Field values in schema order, the form handed to the rendering
    /// collaborator and used by the UI to regenerate input rows.
    pub fn ordered_fields(&self) -> Vec<(&'static str, String)> {
        self.chart_type
            .field_keys()
            .iter()
            .map(|key| (*key, self.fields.get(*key).cloned().unwrap_or_default()))
            .collect()
    }

    /// Align the field map with the current type's schema: unknown keys are
    /// dropped, missing keys default to empty. Used when loading records
    /// whose filters drifted from the registry.
    pub fn normalize_fields(&mut self) {
        let chart_type = self.chart_type;
        let mut fields = HashMap::with_capacity(chart_type.field_keys().len());
        for key in chart_type.field_keys() {
            let value = self.fields.remove(*key).unwrap_or_default();
            fields.insert((*key).to_string(), value);
        }
        self.fields = fields;
    }

    /// Backfill a generated id if the stored one is blank
    pub fn ensure_id(&mut self) {
        if self.id.trim().is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
    }

    pub fn from_record(record: ChartRecord, section_index: usize, chart_index: usize) -> Self {
        let mut chart = Self {
            id: record.id,
            name: record.name,
            chart_type: record.chart_type,
            fields: record.filters,
            section_index,
            chart_index,
        };
        chart.ensure_id();
        chart.normalize_fields();
        chart
    }

    pub fn to_record(&self) -> ChartRecord {
        ChartRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            chart_type: self.chart_type,
            filters: self.fields.clone(),
        }
    }
}

fn empty_fields(chart_type: ChartType) -> HashMap<String, String> {
    chart_type
        .field_keys()
        .iter()
        .map(|key| ((*key).to_string(), String::new()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chart_defaults() {
        let chart = Chart::new(2, 1);
        assert!(!chart.id.is_empty());
        assert!(chart.name.is_empty());
        assert_eq!(chart.chart_type, ChartType::Bar);
        assert_eq!(chart.section_index, 2);
        assert_eq!(chart.chart_index, 1);

        let keys: Vec<&str> = chart.fields.keys().map(String::as_str).collect();
        for key in ChartType::Bar.field_keys() {
            assert!(keys.contains(key));
            assert_eq!(chart.fields[*key], "");
        }
        assert_eq!(keys.len(), ChartType::Bar.field_keys().len());
    }

    #[test]
    fn test_set_type_preserves_shared_keys() {
        // Bar: unique, variable, value, group_by
        // Histogram: unique, variable, bin_size
        let mut chart = Chart::new(0, 0);
        chart.set_field("unique", "person_id").unwrap();
        chart.set_field("variable", "age").unwrap();
        chart.set_field("value", "1").unwrap();
        chart.set_field("group_by", "site").unwrap();

        chart.set_type(ChartType::Histogram);

        assert_eq!(chart.chart_type, ChartType::Histogram);
        assert_eq!(chart.fields.len(), ChartType::Histogram.field_keys().len());
        assert_eq!(chart.fields["unique"], "person_id");
        assert_eq!(chart.fields["variable"], "age");
        assert_eq!(chart.fields["bin_size"], "");
        assert!(!chart.fields.contains_key("value"));
        assert!(!chart.fields.contains_key("group_by"));
    }

    #[test]
    fn test_set_type_same_type_keeps_values() {
        let mut chart = Chart::new(0, 0);
        chart.set_field("variable", "gender").unwrap();
        chart.set_type(ChartType::Bar);
        assert_eq!(chart.fields["variable"], "gender");
    }

    #[test]
    fn test_set_field_rejects_unknown_key() {
        let mut chart = Chart::new(0, 0);
        let err = chart.set_field("bin_size", "10").unwrap_err();
        assert!(matches!(err, DomainError::FieldNotInSchema { .. }));
        // State untouched
        assert!(!chart.fields.contains_key("bin_size"));
    }

    #[test]
    fn test_ordered_fields_follow_schema_order() {
        let mut chart = Chart::new(0, 0);
        chart.set_field("value", "1").unwrap();
        let ordered = chart.ordered_fields();
        let keys: Vec<&str> = ordered.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ChartType::Bar.field_keys());
        assert_eq!(ordered[2], ("value", "1".to_string()));
    }

    #[test]
    fn test_from_record_normalizes_fields() {
        let mut filters = HashMap::new();
        filters.insert("variable".to_string(), "age".to_string());
        filters.insert("obsolete".to_string(), "x".to_string());
        let record = ChartRecord {
            id: "  ".to_string(),
            name: "Ages".to_string(),
            chart_type: ChartType::Pie,
            filters,
        };

        let chart = Chart::from_record(record, 1, 3);
        assert!(!chart.id.trim().is_empty());
        assert_eq!(chart.section_index, 1);
        assert_eq!(chart.chart_index, 3);
        assert_eq!(chart.fields.len(), ChartType::Pie.field_keys().len());
        assert_eq!(chart.fields["variable"], "age");
        assert_eq!(chart.fields["unique"], "");
        assert!(!chart.fields.contains_key("obsolete"));
    }
}
