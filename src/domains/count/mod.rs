pub mod types;

pub use types::{Count, CountFilters, CountRecord, DEFAULT_UNIQUE_COLUMN};
