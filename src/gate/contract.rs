// Contract - per-model input shape expectations and what was observed instead

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed (rows, cols) a model expects for one inference input
///
/// A request may carry either exactly one row or exactly `expected_rows`
/// rows; every row must have `expected_cols` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeContract {
    pub expected_rows: usize,
    pub expected_cols: usize,
}

impl ShapeContract {
    pub const fn new(expected_rows: usize, expected_cols: usize) -> Self {
        Self {
            expected_rows,
            expected_cols,
        }
    }

    pub fn accepts_rows(&self, rows: usize) -> bool {
        rows == 1 || rows == self.expected_rows
    }
}

/// First contract violation found in a request payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum ObservedShape {
    NotAnArray,
    Rows { rows: usize },
    RowNotArray { row: usize },
    RowWidth { row: usize, cols: usize },
    NonNumeric { row: usize, col: usize },
    OutOfRange { row: usize, col: usize },
}

impl fmt::Display for ObservedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedShape::NotAnArray => write!(f, "got a non-array value"),
            ObservedShape::Rows { rows } => write!(f, "got {} rows", rows),
            ObservedShape::RowNotArray { row } => write!(f, "row {} is not an array", row),
            ObservedShape::RowWidth { row, cols } => {
                write!(f, "row {} has {} columns", row, cols)
            }
            ObservedShape::NonNumeric { row, col } => {
                write!(f, "value at row {}, column {} is not a finite number", row, col)
            }
            ObservedShape::OutOfRange { row, col } => {
                write!(f, "value at row {}, column {} is out of f32 range", row, col)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_one_or_expected_rows() {
        let contract = ShapeContract::new(64, 129);
        assert!(contract.accepts_rows(1));
        assert!(contract.accepts_rows(64));
        assert!(!contract.accepts_rows(0));
        assert!(!contract.accepts_rows(63));
        assert!(!contract.accepts_rows(65));
    }

    #[test]
    fn test_observed_shape_display() {
        assert_eq!(
            ObservedShape::RowWidth { row: 3, cols: 5 }.to_string(),
            "row 3 has 5 columns"
        );
        assert_eq!(ObservedShape::Rows { rows: 10 }.to_string(), "got 10 rows");
        assert_eq!(
            ObservedShape::OutOfRange { row: 0, col: 2 }.to_string(),
            "value at row 0, column 2 is out of f32 range"
        );
    }
}
