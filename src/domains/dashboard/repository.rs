use crate::domains::dashboard::types::{Dashboard, DashboardRecord};
use crate::errors::{DomainError, DomainResult, StoreError, StoreResult};
use crate::validation::Validate;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Sentinel the UI sends instead of an index when the operator picks the
/// synthetic "create new" selector entry
pub const NEW_DASHBOARD_SENTINEL: &str = "new";

const NEW_DASHBOARD_LABEL: &str = "Create new dashboard";

/// Where a save lands in the store's ordered collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePosition {
    /// Append; the edit originated from the "new" selector entry
    New,
    /// Overwrite the document at this position
    At(usize),
}

/// One row of the selector list handed to the UI collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEntry {
    pub position: StorePosition,
    pub report_id: String,
    pub report_name: String,
}

/// Owns the persisted collection of dashboard documents.
///
/// The whole collection lives behind one mutex; `save`/`delete` hold it
/// across the full read-modify-write-file sequence so concurrent sessions
/// cannot lose each other's updates. The file rewrite is all-or-nothing
/// (temp file then rename); on I/O failure the in-memory collection rolls
/// back to its pre-operation snapshot.
#[derive(Debug)]
pub struct DashboardStore {
    path: PathBuf,
    records: Mutex<Vec<DashboardRecord>>,
}

impl DashboardStore {
    /// Open the store, normalizing whatever is on disk (a single document
    /// object, an array of documents, or a missing/corrupt file) into an
    /// ordered collection. Never fails; anomalies are logged and treated as
    /// an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = load_records(&path);
        log::debug!(
            "loaded {} dashboard(s) from {}",
            records.len(),
            path.display()
        );
        Self {
            path,
            records: Mutex::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Selector list for the UI: every stored document in order, then the
    /// synthetic "create new" entry.
    pub fn list(&self) -> Vec<SelectorEntry> {
        let records = self.lock();
        let mut entries: Vec<SelectorEntry> = records
            .iter()
            .enumerate()
            .map(|(index, record)| SelectorEntry {
                position: StorePosition::At(index),
                report_id: record.report_id.clone(),
                report_name: record.report_name.clone(),
            })
            .collect();
        entries.push(SelectorEntry {
            position: StorePosition::New,
            report_id: NEW_DASHBOARD_SENTINEL.to_string(),
            report_name: NEW_DASHBOARD_LABEL.to_string(),
        });
        entries
    }

    /// Deep copy of the document at `index`, safe to mutate until saved back
    pub fn get(&self, index: usize) -> DomainResult<Dashboard> {
        let records = self.lock();
        let record = records.get(index).ok_or(DomainError::index_out_of_range(
            "dashboards",
            index,
            records.len(),
        ))?;
        Ok(Dashboard::from_record(record.clone()))
    }

    /// Persist `document` at `position` and return the position it landed at.
    ///
    /// `At(i)` beyond the current collection falls back to append rather than
    /// failing; the UI's view of indices can be one refresh behind a
    /// concurrent delete.
    pub fn save(&self, position: StorePosition, document: &Dashboard) -> DomainResult<usize> {
        document.validate()?;
        let record = document.to_record();

        let mut records = self.lock();
        let snapshot = records.clone();
        let index = match position {
            StorePosition::New => {
                records.push(record);
                records.len() - 1
            }
            StorePosition::At(i) if i < records.len() => {
                records[i] = record;
                i
            }
            StorePosition::At(i) => {
                log::warn!(
                    "save index {} out of range (len {}), appending instead",
                    i,
                    records.len()
                );
                records.push(record);
                records.len() - 1
            }
        };

        if let Err(err) = write_records(&self.path, &records) {
            log::error!("failed to persist store to {}: {}", self.path.display(), err);
            *records = snapshot;
            return Err(err.into());
        }
        log::debug!(
            "saved dashboard {} at position {}",
            document.report_id,
            index
        );
        Ok(index)
    }

    /// Remove the document at `index` and persist, with the same
    /// all-or-nothing write and rollback contract as `save`
    pub fn delete(&self, index: usize) -> DomainResult<()> {
        let mut records = self.lock();
        if index >= records.len() {
            return Err(DomainError::index_out_of_range(
                "dashboards",
                index,
                records.len(),
            ));
        }
        let snapshot = records.clone();
        let removed = records.remove(index);

        if let Err(err) = write_records(&self.path, &records) {
            log::error!("failed to persist store to {}: {}", self.path.display(), err);
            *records = snapshot;
            return Err(err.into());
        }
        log::debug!("deleted dashboard {} at position {}", removed.report_id, index);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DashboardRecord>> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the collection itself is still a valid snapshot.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load_records(path: &Path) -> Vec<DashboardRecord> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            log::warn!("could not read {}: {}", path.display(), err);
            return Vec::new();
        }
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("store file {} is corrupt: {}", path.display(), err);
            return Vec::new();
        }
    };

    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(err) => {
                    log::warn!("skipping malformed dashboard entry: {}", err);
                    None
                }
            })
            .collect(),
        Value::Object(_) => match serde_json::from_value(value) {
            Ok(record) => vec![record],
            Err(err) => {
                log::warn!("store file {} is corrupt: {}", path.display(), err);
                Vec::new()
            }
        },
        _ => {
            log::warn!(
                "store file {} holds neither an object nor an array",
                path.display()
            );
            Vec::new()
        }
    }
}

// Full-file rewrite: serialize to a temp file in the same directory, then
// rename over the store path so readers never observe a partial write.
fn write_records(path: &Path, records: &[DashboardRecord]) -> StoreResult<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new_in("."),
    }
    .map_err(StoreError::from)?;

    serde_json::to_writer_pretty(&tmp, records).map_err(StoreError::from)?;
    tmp.persist(path)
        .map_err(|err| StoreError::Io(err.to_string()))?;
    Ok(())
}
