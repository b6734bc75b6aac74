//! Conversions between 1-based (row, column) indexes and Excel-style references

/// Largest column index an Excel worksheet accepts (XFD).
pub(crate) const MAX_COLUMNS: usize = 16_384;

/// Largest row index an Excel worksheet accepts.
pub(crate) const MAX_ROWS: usize = 1_048_576;

/// Converts a 1-based column index to its letters (1 -> "A", 27 -> "AA").
pub(crate) fn col_to_letters(col: usize) -> String {
    let mut col = col;
    let mut letters = Vec::<char>::new();
    while col > 0 {
        col -= 1;
        letters.push((b'A' + (col % 26) as u8) as char);
        col /= 26;
    }
    letters.iter().rev().collect()
}

/// Returns the Excel-style reference of a 1-based cell position (e.g., "A1", "C12").
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", col_to_letters(col), row)
}
