use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::MAX_COLUMNS;
use crate::spreadsheet::reference::MAX_ROWS;
use std::fmt::Display;
use thiserror::Error;

/// Errors related to merged cell ranges.
#[derive(Error, Debug, PartialEq)]
pub enum RangeError {
    #[error("Invalid merge range {0}: start after end")]
    Inverted(String),

    #[error("Invalid merge range {0}: outside worksheet bounds")]
    OutOfBounds(String),

    #[error("Invalid merge range {0}: single cell")]
    SingleCell(String),

    #[error("Merge range {0} overlaps existing merge {1}")]
    Overlap(String, String),
}

/// A rectangular block of cells merged into one (1-based, inclusive bounds).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MergeRange {
    pub row_lower_bound: usize,
    pub row_upper_bound: usize,
    pub col_lower_bound: usize,
    pub col_upper_bound: usize,
}

impl MergeRange {
    /// Creates a validated range spanning columns `col_lower_bound..=col_upper_bound` of a single row.
    pub fn row_span(row: usize, col_lower_bound: usize, col_upper_bound: usize) -> Result<Self, RangeError> {
        Self::new(row, row, col_lower_bound, col_upper_bound)
    }

    /// Creates a validated range.
    ///
    /// Bounds must be ordered, inside the worksheet limits and cover more than one cell.
    pub fn new(
        row_lower_bound: usize,
        row_upper_bound: usize,
        col_lower_bound: usize,
        col_upper_bound: usize,
    ) -> Result<Self, RangeError> {
        let range = MergeRange {
            row_lower_bound,
            row_upper_bound,
            col_lower_bound,
            col_upper_bound,
        };
        if row_lower_bound > row_upper_bound || col_lower_bound > col_upper_bound {
            Err(RangeError::Inverted(range.to_string()))
        } else if row_lower_bound == 0 || col_lower_bound == 0 || row_upper_bound > MAX_ROWS || col_upper_bound > MAX_COLUMNS {
            Err(RangeError::OutOfBounds(range.to_string()))
        } else if row_lower_bound == row_upper_bound && col_lower_bound == col_upper_bound {
            Err(RangeError::SingleCell(range.to_string()))
        } else {
            Ok(range)
        }
    }

    /// Checks if a cell lies inside the range.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.row_lower_bound <= row
            && row <= self.row_upper_bound
            && self.col_lower_bound <= col
            && col <= self.col_upper_bound
    }

    /// Checks if two ranges share at least one cell.
    pub fn overlaps(&self, other: &MergeRange) -> bool {
        self.row_lower_bound <= other.row_upper_bound
            && other.row_lower_bound <= self.row_upper_bound
            && self.col_lower_bound <= other.col_upper_bound
            && other.col_lower_bound <= self.col_upper_bound
    }
}

impl Display for MergeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            index_to_reference(self.row_lower_bound, self.col_lower_bound),
            index_to_reference(self.row_upper_bound, self.col_upper_bound)
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::spreadsheet::range::*;

    #[test]
    fn row_span_reference() {
        let range = MergeRange::row_span(2, 1, 3).unwrap();
        assert_eq!(range.to_string(), "A2:C2");
        assert_eq!((range.col_lower_bound, range.col_upper_bound), (1, 3));
        assert!(range.contains(2, 2));
        assert!(!range.contains(3, 2));
    }

    #[test]
    fn reject_invalid_ranges() {
        assert!(matches!(MergeRange::row_span(2, 3, 1), Err(RangeError::Inverted(_))));
        assert!(matches!(MergeRange::row_span(2, 0, 3), Err(RangeError::OutOfBounds(_))));
        assert!(matches!(MergeRange::row_span(2, 1, MAX_COLUMNS + 1), Err(RangeError::OutOfBounds(_))));
        assert!(matches!(MergeRange::row_span(2, 1, 1), Err(RangeError::SingleCell(_))));
    }

    #[test]
    fn detect_overlap() {
        let first = MergeRange::row_span(2, 1, 3).unwrap();
        let second = MergeRange::new(2, 3, 3, 4).unwrap();
        let third = MergeRange::row_span(3, 4, 5).unwrap();
        assert!(first.overlaps(&second));
        assert!(!first.overlaps(&third));
    }
}
