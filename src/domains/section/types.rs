use crate::domains::chart::{Chart, ChartRecord};
use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// A named grouping of charts.
///
/// Charts are addressed by their contiguous zero-based position; every
/// removal renumbers the survivors and rewrites their routing fields before
/// the next edit intent can be processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub section_name: String,
    pub charts: Vec<Chart>,
    pub index: usize,
}

/// Persisted form of one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    #[serde(default)]
    pub section_name: String,
    #[serde(default)]
    pub items: Vec<ChartRecord>,
}

impl Section {
    pub fn new(index: usize) -> Self {
        Self {
            section_name: String::new(),
            charts: Vec::new(),
            index,
        }
    }

    /// A section with an empty name is dropped silently on save
    pub fn is_persistable(&self) -> bool {
        !self.section_name.trim().is_empty()
    }

    /// Append a new chart at the next contiguous index and return that index
    pub fn add_chart(&mut self) -> usize {
        let chart_index = self.charts.len();
        self.charts.push(Chart::new(self.index, chart_index));
        chart_index
    }

    /// Remove the chart at `index` and renumber the survivors.
    ///
    /// Out-of-range indices are a no-op reported to the caller; sibling
    /// indices are never disturbed by a failed removal.
    pub fn remove_chart(&mut self, index: usize) -> DomainResult<()> {
        if index >= self.charts.len() {
            return Err(DomainError::index_out_of_range(
                "charts",
                index,
                self.charts.len(),
            ));
        }
        self.charts.remove(index);
        self.reindex_charts();
        Ok(())
    }

    /// Checked mutable access for index-routed field edits
    pub fn chart_mut(&mut self, index: usize) -> DomainResult<&mut Chart> {
        let len = self.charts.len();
        self.charts
            .get_mut(index)
            .ok_or(DomainError::index_out_of_range("charts", index, len))
    }

    /// Reassign this section's position and push it down into chart routing
    /// fields
    pub fn set_index(&mut self, index: usize) {
        self.index = index;
        self.reindex_charts();
    }

    fn reindex_charts(&mut self) {
        for (chart_index, chart) in self.charts.iter_mut().enumerate() {
            chart.section_index = self.index;
            chart.chart_index = chart_index;
        }
    }

    pub fn from_record(record: SectionRecord, index: usize) -> Self {
        let charts = record
            .items
            .into_iter()
            .enumerate()
            .map(|(chart_index, item)| Chart::from_record(item, index, chart_index))
            .collect();
        Self {
            section_name: record.section_name,
            charts,
            index,
        }
    }

    pub fn to_record(&self) -> SectionRecord {
        SectionRecord {
            section_name: self.section_name.clone(),
            items: self.charts.iter().map(Chart::to_record).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_chart_returns_contiguous_indices() {
        let mut section = Section::new(0);
        assert_eq!(section.add_chart(), 0);
        assert_eq!(section.add_chart(), 1);
        assert_eq!(section.add_chart(), 2);
        for (i, chart) in section.charts.iter().enumerate() {
            assert_eq!(chart.chart_index, i);
            assert_eq!(chart.section_index, 0);
        }
    }

    #[test]
    fn test_remove_chart_reindexes_survivors() {
        let mut section = Section::new(1);
        for _ in 0..4 {
            section.add_chart();
        }
        let removed_id = section.charts[1].id.clone();
        let kept: Vec<String> = section
            .charts
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 1)
            .map(|(_, c)| c.id.clone())
            .collect();

        section.remove_chart(1).unwrap();

        assert_eq!(section.charts.len(), 3);
        assert!(section.charts.iter().all(|c| c.id != removed_id));
        // Relative order preserved, indices contiguous from 0
        let ids: Vec<String> = section.charts.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, kept);
        for (i, chart) in section.charts.iter().enumerate() {
            assert_eq!(chart.chart_index, i);
            assert_eq!(chart.section_index, 1);
        }
    }

    #[test]
    fn test_remove_chart_out_of_range_is_a_no_op() {
        let mut section = Section::new(0);
        section.add_chart();
        let before = section.clone();
        let err = section.remove_chart(5).unwrap_err();
        assert!(matches!(
            err,
            DomainError::IndexOutOfRange {
                collection: "charts",
                index: 5,
                len: 1
            }
        ));
        assert_eq!(section, before);
    }

    #[test]
    fn test_set_index_rewrites_chart_routing() {
        let mut section = Section::new(0);
        section.add_chart();
        section.add_chart();
        section.set_index(4);
        assert!(section.charts.iter().all(|c| c.section_index == 4));
    }

    #[test]
    fn test_record_round_trip_keeps_charts() {
        let mut section = Section::new(0);
        section.section_name = "Demographics".to_string();
        section.add_chart();
        section
            .chart_mut(0)
            .unwrap()
            .set_field("variable", "age")
            .unwrap();

        let record = section.to_record();
        assert_eq!(record.items.len(), 1);

        let restored = Section::from_record(record, 2);
        assert_eq!(restored.section_name, "Demographics");
        assert_eq!(restored.index, 2);
        assert_eq!(restored.charts.len(), 1);
        assert_eq!(restored.charts[0].section_index, 2);
        assert_eq!(restored.charts[0].fields["variable"], "age");
    }
}
