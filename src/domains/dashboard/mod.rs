pub mod repository;
pub mod service;
pub mod types;

pub use repository::{DashboardStore, SelectorEntry, StorePosition, NEW_DASHBOARD_SENTINEL};
pub use service::{EditIntent, EditSession, FilterSlot};
pub use types::{Dashboard, DashboardRecord};
