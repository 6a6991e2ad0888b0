pub mod types;

pub use types::{Section, SectionRecord};
