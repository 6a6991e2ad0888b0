//! Core editing model for dashboard definitions.
//!
//! A dashboard document holds report metadata, a list of metric counts, and
//! a list of chart sections. Every nested entity is addressed by its
//! contiguous position inside its parent collection because the external UI
//! layer routes edit events by index; removals renumber the survivors before
//! the next intent is processed. Documents persist as a single JSON file
//! owned by [`DashboardStore`], rewritten whole on every save.

// Public modules
pub mod domains;
pub mod errors;
pub mod validation;

pub use domains::chart::{Chart, ChartType};
pub use domains::count::Count;
pub use domains::dashboard::{
    Dashboard, DashboardStore, EditIntent, EditSession, FilterSlot, SelectorEntry, StorePosition,
};
pub use domains::section::Section;
pub use errors::{DomainError, ServiceError, StoreError, ValidationError};
