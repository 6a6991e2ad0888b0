use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed enumeration of chart types the rendering collaborator understands.
///
/// Each type carries a fixed, ordered list of field keys; the key order is
/// the order the UI renders its inputs and the renderer consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    Line,
    Bar,
    Pie,
    Column,
    Histogram,
    PivotTable,
}

impl ChartType {
    pub const ALL: [ChartType; 6] = [
        ChartType::Line,
        ChartType::Bar,
        ChartType::Pie,
        ChartType::Column,
        ChartType::Histogram,
        ChartType::PivotTable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "Line",
            ChartType::Bar => "Bar",
            ChartType::Pie => "Pie",
            ChartType::Column => "Column",
            ChartType::Histogram => "Histogram",
            ChartType::PivotTable => "PivotTable",
        }
    }

    /// Ordered field keys for this chart type.
    ///
    /// Numeric-looking keys (`bin_size`, `top_n`) are still string-valued in
    /// the model; the renderer parses them.
    pub fn field_keys(&self) -> &'static [&'static str] {
        match self {
            ChartType::Line => &["unique", "variable", "value", "date_variable"],
            ChartType::Bar => &["unique", "variable", "value", "group_by"],
            ChartType::Pie => &["unique", "variable", "value"],
            ChartType::Column => &["unique", "variable", "value", "group_by"],
            ChartType::Histogram => &["unique", "variable", "bin_size"],
            ChartType::PivotTable => &[
                "unique",
                "row_variable",
                "column_variable",
                "value",
                "top_n",
            ],
        }
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.field_keys().contains(&key)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Line" => Ok(ChartType::Line),
            "Bar" => Ok(ChartType::Bar),
            "Pie" => Ok(ChartType::Pie),
            "Column" => Ok(ChartType::Column),
            "Histogram" => Ok(ChartType::Histogram),
            "PivotTable" => Ok(ChartType::PivotTable),
            _ => Err(DomainError::UnknownChartType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for chart_type in ChartType::ALL {
            assert_eq!(chart_type.as_str().parse::<ChartType>().unwrap(), chart_type);
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = "Radar".parse::<ChartType>().unwrap_err();
        assert!(matches!(err, DomainError::UnknownChartType(name) if name == "Radar"));
    }

    #[test]
    fn test_every_type_has_fields() {
        for chart_type in ChartType::ALL {
            assert!(!chart_type.field_keys().is_empty());
            assert!(chart_type.has_field("unique"));
        }
    }

    #[test]
    fn test_histogram_and_pivot_numeric_keys() {
        assert!(ChartType::Histogram.has_field("bin_size"));
        assert!(ChartType::PivotTable.has_field("top_n"));
        assert!(!ChartType::Bar.has_field("bin_size"));
    }
}
