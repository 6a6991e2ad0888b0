use crate::domains::chart::ChartType;
use crate::domains::dashboard::repository::{DashboardStore, SelectorEntry, StorePosition};
use crate::domains::dashboard::types::Dashboard;
use crate::errors::{ServiceError, ServiceResult};
use std::str::FromStr;
use std::sync::Arc;

/// Which of a count's two optional filter predicate slots an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSlot {
    First,
    Second,
}

/// One discrete mutation request from the UI collaborator, routed by the
/// collection indices the controls carried when they were rendered.
///
/// Chart types arrive as the raw string the widget holds; parsing failures
/// are user errors reported back, never crashes.
#[derive(Debug, Clone, PartialEq)]
pub enum EditIntent {
    SetReportName(String),
    AddCount,
    RemoveCount {
        count: usize,
    },
    SetCountName {
        count: usize,
        name: String,
    },
    SetCountUniqueColumn {
        count: usize,
        unique_column: String,
    },
    SetCountFilter {
        count: usize,
        slot: FilterSlot,
        variable: String,
        value: String,
    },
    AddSection,
    RemoveSection {
        section: usize,
    },
    SetSectionName {
        section: usize,
        name: String,
    },
    AddChart {
        section: usize,
    },
    RemoveChart {
        section: usize,
        chart: usize,
    },
    SetChartName {
        section: usize,
        chart: usize,
        name: String,
    },
    SetChartType {
        section: usize,
        chart: usize,
        chart_type: String,
    },
    SetChartField {
        section: usize,
        chart: usize,
        field: String,
        value: String,
    },
}

struct ActiveEdit {
    origin: StorePosition,
    document: Dashboard,
}

/// Drives one editing session against the store.
///
/// State machine: `Idle -> Editing -> {Editing}* -> Saved | Cancelled`.
/// Intents apply strictly one at a time; a failed intent leaves the
/// in-memory document unchanged and is returned for user-facing reporting.
/// Nothing touches the store until `save`.
pub struct EditSession {
    store: Arc<DashboardStore>,
    editing: Option<ActiveEdit>,
}

impl EditSession {
    pub fn new(store: Arc<DashboardStore>) -> Self {
        Self {
            store,
            editing: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Enter `Editing`: template a fresh document (`StorePosition::New`) or
    /// deep copy the stored one at the given position.
    pub fn open(&mut self, position: StorePosition) -> ServiceResult<&Dashboard> {
        if self.editing.is_some() {
            return Err(ServiceError::EditInProgress);
        }
        let document = match position {
            StorePosition::New => Dashboard::new_template(),
            StorePosition::At(index) => self.store.get(index)?,
        };
        log::debug!("opened dashboard {} for editing", document.report_id);
        let edit = self.editing.insert(ActiveEdit {
            origin: position,
            document,
        });
        Ok(&edit.document)
    }

    /// The current document, for the UI to re-render after each intent
    pub fn document(&self) -> ServiceResult<&Dashboard> {
        self.editing
            .as_ref()
            .map(|edit| &edit.document)
            .ok_or(ServiceError::NoActiveEdit)
    }

    /// Apply one edit intent to the in-memory document
    pub fn apply(&mut self, intent: EditIntent) -> ServiceResult<()> {
        let document = &mut self
            .editing
            .as_mut()
            .ok_or(ServiceError::NoActiveEdit)?
            .document;

        match intent {
            EditIntent::SetReportName(name) => {
                document.report_name = name;
            }
            EditIntent::AddCount => {
                document.add_count();
            }
            EditIntent::RemoveCount { count } => {
                document.remove_count(count)?;
            }
            EditIntent::SetCountName { count, name } => {
                document.count_mut(count)?.name = name;
            }
            EditIntent::SetCountUniqueColumn {
                count,
                unique_column,
            } => {
                document.count_mut(count)?.unique_column = unique_column;
            }
            EditIntent::SetCountFilter {
                count,
                slot,
                variable,
                value,
            } => {
                let count = document.count_mut(count)?;
                match slot {
                    FilterSlot::First => {
                        count.variable1 = variable;
                        count.value1 = value;
                    }
                    FilterSlot::Second => {
                        count.variable2 = variable;
                        count.value2 = value;
                    }
                }
            }
            EditIntent::AddSection => {
                document.add_section();
            }
            EditIntent::RemoveSection { section } => {
                document.remove_section(section)?;
            }
            EditIntent::SetSectionName { section, name } => {
                document.section_mut(section)?.section_name = name;
            }
            EditIntent::AddChart { section } => {
                document.section_mut(section)?.add_chart();
            }
            EditIntent::RemoveChart { section, chart } => {
                document.section_mut(section)?.remove_chart(chart)?;
            }
            EditIntent::SetChartName {
                section,
                chart,
                name,
            } => {
                document.chart_mut(section, chart)?.name = name;
            }
            EditIntent::SetChartType {
                section,
                chart,
                chart_type,
            } => {
                // Parse before touching the chart so an unknown type is a
                // clean no-op
                let new_type = ChartType::from_str(&chart_type)?;
                document.chart_mut(section, chart)?.set_type(new_type);
            }
            EditIntent::SetChartField {
                section,
                chart,
                field,
                value,
            } => {
                document.chart_mut(section, chart)?.set_field(&field, value)?;
            }
        }
        Ok(())
    }

    /// Persist the document and return to `Idle`, handing back the refreshed
    /// selector list. Validation or persistence failures keep the session in
    /// `Editing` so the operator can correct and retry.
    pub fn save(&mut self) -> ServiceResult<Vec<SelectorEntry>> {
        let edit = self.editing.as_ref().ok_or(ServiceError::NoActiveEdit)?;
        let position = self.store.save(edit.origin, &edit.document)?;
        log::debug!(
            "saved dashboard {} at position {}",
            edit.document.report_id,
            position
        );
        self.editing = None;
        Ok(self.store.list())
    }

    /// Discard the in-memory document without touching the store
    pub fn cancel(&mut self) -> ServiceResult<()> {
        let edit = self.editing.take().ok_or(ServiceError::NoActiveEdit)?;
        log::debug!("cancelled edit of dashboard {}", edit.document.report_id);
        Ok(())
    }
}
