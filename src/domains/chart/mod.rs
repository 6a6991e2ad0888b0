pub mod schema;
pub mod types;

pub use schema::ChartType;
pub use types::{Chart, ChartRecord};
