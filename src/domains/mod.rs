pub mod chart;
pub mod count;
pub mod dashboard;
pub mod section;
