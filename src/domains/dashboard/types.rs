use crate::domains::chart::Chart;
use crate::domains::count::{Count, CountRecord};
use crate::domains::section::{Section, SectionRecord};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{Validate, ValidationBuilder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NEW_DASHBOARD_NAME: &str = "New Dashboard";

/// One dashboard configuration: report metadata plus the ordered count and
/// section collections. This is the in-memory editing model; the persisted
/// shape is [`DashboardRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub report_id: String,
    pub report_name: String,
    pub date_created: String,
    pub counts: Vec<Count>,
    pub sections: Vec<Section>,
}

/// Persisted form of one dashboard (one element of the store file)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRecord {
    #[serde(default)]
    pub report_id: String,
    #[serde(default)]
    pub report_name: String,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub visualization_types: VisualizationTypes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualizationTypes {
    #[serde(default)]
    pub counts: Vec<CountRecord>,
    #[serde(default)]
    pub charts: ChartsEnvelope,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartsEnvelope {
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
}

impl Dashboard {
    /// Fresh template: generated id, placeholder name, creation date stamped
    /// once, empty collections.
    pub fn new_template() -> Self {
        Self {
            report_id: Uuid::new_v4().to_string(),
            report_name: NEW_DASHBOARD_NAME.to_string(),
            date_created: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            counts: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Append a new count at the next contiguous index and return that index
    pub fn add_count(&mut self) -> usize {
        let index = self.counts.len();
        self.counts.push(Count::new(index));
        index
    }

    /// Remove the count at `index`, renumbering the survivors
    pub fn remove_count(&mut self, index: usize) -> DomainResult<()> {
        if index >= self.counts.len() {
            return Err(DomainError::index_out_of_range(
                "counts",
                index,
                self.counts.len(),
            ));
        }
        self.counts.remove(index);
        for (i, count) in self.counts.iter_mut().enumerate() {
            count.index = i;
        }
        Ok(())
    }

    /// Checked mutable access for index-routed count edits
    pub fn count_mut(&mut self, index: usize) -> DomainResult<&mut Count> {
        let len = self.counts.len();
        self.counts
            .get_mut(index)
            .ok_or(DomainError::index_out_of_range(
                "counts", index, len,
            ))
    }

    /// Append a new section at the next contiguous index and return that index
    pub fn add_section(&mut self) -> usize {
        let index = self.sections.len();
        self.sections.push(Section::new(index));
        index
    }

    /// Remove the section at `index`, renumbering the survivors and the
    /// routing fields of every chart they hold
    pub fn remove_section(&mut self, index: usize) -> DomainResult<()> {
        if index >= self.sections.len() {
            return Err(DomainError::index_out_of_range(
                "sections",
                index,
                self.sections.len(),
            ));
        }
        self.sections.remove(index);
        for (i, section) in self.sections.iter_mut().enumerate() {
            section.set_index(i);
        }
        Ok(())
    }

    /// Checked mutable access for index-routed section edits
    pub fn section_mut(&mut self, index: usize) -> DomainResult<&mut Section> {
        let len = self.sections.len();
        self.sections
            .get_mut(index)
            .ok_or(DomainError::index_out_of_range(
                "sections", index, len,
            ))
    }

    /// Checked mutable access to one chart, routed by (section, chart) indices
    pub fn chart_mut(&mut self, section: usize, chart: usize) -> DomainResult<&mut Chart> {
        self.section_mut(section)?.chart_mut(chart)
    }

    /// Every violation a strict caller could surface. Saving only requires
    /// `report_name`; the nested violations are reported here but resolved
    /// by permissive filtering in [`Dashboard::to_record`].
    pub fn violations(&self) -> Vec<ValidationError> {
        let mut violations = Vec::new();
        if self.report_name.trim().is_empty() {
            violations.push(ValidationError::required("report_name"));
        }
        for (i, count) in self.counts.iter().enumerate() {
            if count.id.trim().is_empty() {
                violations.push(ValidationError::required(&format!("counts[{i}].id")));
            }
            if count.name.trim().is_empty() {
                violations.push(ValidationError::required(&format!("counts[{i}].name")));
            }
        }
        for (i, section) in self.sections.iter().enumerate() {
            if !section.is_persistable() {
                violations.push(ValidationError::required(&format!(
                    "sections[{i}].section_name"
                )));
            }
        }
        violations
    }

    /// Assemble the persisted form, applying the permissive filtering rules:
    /// counts without an id or name and sections without a name are dropped,
    /// everything else (charts included) is carried over.
    pub fn to_record(&self) -> DashboardRecord {
        let counts = self
            .counts
            .iter()
            .filter(|count| {
                if count.is_persistable() {
                    true
                } else {
                    log::warn!(
                        "dropping incomplete count at index {} from report {}",
                        count.index,
                        self.report_id
                    );
                    false
                }
            })
            .map(Count::to_record)
            .collect();

        let sections = self
            .sections
            .iter()
            .filter(|section| {
                if section.is_persistable() {
                    true
                } else {
                    log::warn!(
                        "dropping unnamed section at index {} from report {}",
                        section.index,
                        self.report_id
                    );
                    false
                }
            })
            .map(Section::to_record)
            .collect();

        DashboardRecord {
            report_id: self.report_id.clone(),
            report_name: self.report_name.clone(),
            date_created: self.date_created.clone(),
            visualization_types: VisualizationTypes {
                counts,
                charts: ChartsEnvelope { sections },
            },
        }
    }

    /// Rebuild the editing model from a stored record, re-deriving every
    /// routing index and normalizing chart field maps against the registry.
    pub fn from_record(record: DashboardRecord) -> Self {
        let report_id = if record.report_id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            record.report_id
        };
        let counts = record
            .visualization_types
            .counts
            .into_iter()
            .enumerate()
            .map(|(index, count)| Count::from_record(count, index))
            .collect();
        let sections = record
            .visualization_types
            .charts
            .sections
            .into_iter()
            .enumerate()
            .map(|(index, section)| Section::from_record(section, index))
            .collect();
        Self {
            report_id,
            report_name: record.report_name,
            date_created: record.date_created,
            counts,
            sections,
        }
    }
}

impl Validate for Dashboard {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("report_name", Some(self.report_name.clone()))
            .required()
            .not_blank()
            .validate()
    }
}
