//! # Spreadsheet Model
//!
//! In-memory workbook produced by the converter: an ordered list of worksheets,
//! each holding styled cells, merged ranges, row heights and column widths.
//! The model is serialized to Office Open XML by [`xlsx`].

pub mod cell;
pub mod range;
pub(crate) mod reference;
pub mod sheet;
pub(crate) mod style;
pub mod xlsx;

use crate::error::RustyExcelError;
use crate::spreadsheet::range::RangeError;
use crate::spreadsheet::sheet::Worksheet;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Maximum length of a worksheet name accepted by Excel.
pub(crate) const MAX_SHEET_NAME_LENGTH: usize = 31;

/// Default height of content rows in points.
pub const DEFAULT_ROW_HEIGHT: f64 = 25.0;

/// Height of the worksheet header row in points.
pub const HEADER_ROW_HEIGHT: f64 = 30.0;

/// Worksheet name Excel reserves for change tracking.
const RESERVED_SHEET_NAME: &str = "History";

/// Characters Excel forbids in worksheet names.
static INVALID_SHEET_NAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\[\]:*?/\\]").expect("Hardcode regex pattern")
});

/// Errors raised while building a workbook.
#[derive(Error, Debug, PartialEq)]
pub enum SpreadsheetError {
    #[error("Worksheet name is empty")]
    EmptySheetName,

    #[error("Worksheet name '{0}' is reserved by Excel")]
    ReservedSheetName(String),

    #[error("Worksheet '{0}' already exists")]
    DuplicateSheetName(String),

    #[error("Worksheet #{0} not found")]
    SheetNotFound(usize),

    #[error("Row {0} of worksheet '{1}' has not been allocated")]
    RowNotAllocated(usize, String),

    #[error("Column {0} is outside the bounds of worksheet '{1}'")]
    ColumnOutOfBounds(usize, String),

    #[error("Worksheet '{0}' exceeds the maximum number of rows")]
    TooManyRows(String),

    #[error("{0}")]
    RangeError(#[from] RangeError),
}

/// Makes a worksheet name acceptable to Excel: forbidden characters become `_`
/// and the result is cut to 31 characters. Surrounding whitespace and apostrophes
/// are dropped.
pub fn sanitize_sheet_name(name: &str) -> String {
    let name = INVALID_SHEET_NAME_CHARS.replace_all(name.trim(), "_");
    let name: String = name.trim_matches('\'').chars().take(MAX_SHEET_NAME_LENGTH).collect();
    name.trim_end_matches('\'').to_owned()
}

/// An ordered collection of worksheets. The first worksheet is the primary one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Workbook::default()
    }

    /// Appends a worksheet and returns its index.
    ///
    /// # Arguments
    /// * `name` - Requested name, sanitized before use
    /// * `default_column_width` - Width of columns without a custom width
    ///
    /// # Returns
    /// Index of the new worksheet, or an error if the sanitized name is empty,
    /// reserved or already taken (names compare case-insensitively, as in Excel)
    pub fn add_worksheet(&mut self, name: &str, default_column_width: f64) -> Result<usize, SpreadsheetError> {
        let name = sanitize_sheet_name(name);
        if name.is_empty() {
            Err(SpreadsheetError::EmptySheetName)?
        }
        if name.eq_ignore_ascii_case(RESERVED_SHEET_NAME) {
            Err(SpreadsheetError::ReservedSheetName(name.clone()))?
        }
        if self.worksheets.iter().any(|sheet| sheet.name.to_lowercase() == name.to_lowercase()) {
            Err(SpreadsheetError::DuplicateSheetName(name.clone()))?
        }
        self.worksheets.push(Worksheet::new(&name, default_column_width, DEFAULT_ROW_HEIGHT));
        Ok(self.worksheets.len() - 1)
    }

    pub fn worksheet(&self, index: usize) -> Result<&Worksheet, SpreadsheetError> {
        self.worksheets.get(index).ok_or(SpreadsheetError::SheetNotFound(index))
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Result<&mut Worksheet, SpreadsheetError> {
        self.worksheets.get_mut(index).ok_or(SpreadsheetError::SheetNotFound(index))
    }

    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    pub fn len(&self) -> usize {
        self.worksheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Serializes the workbook to .xlsx bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RustyExcelError> {
        xlsx::to_bytes(self)
    }

    /// Serializes the workbook to an .xlsx file, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RustyExcelError> {
        xlsx::save(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use crate::spreadsheet::*;

    #[test]
    fn sanitize_names() {
        assert_eq!(sanitize_sheet_name("a/b:c*d?e[f]g\\h"), "a_b_c_d_e_f_g_h");
        assert_eq!(sanitize_sheet_name("  Content  "), "Content");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), MAX_SHEET_NAME_LENGTH);
        assert_eq!(sanitize_sheet_name("表格一"), "表格一");
        assert_eq!(sanitize_sheet_name("'Quoted'"), "Quoted");
        assert_eq!(sanitize_sheet_name("it's"), "it's");
        assert_eq!(sanitize_sheet_name(&format!("{}'x", "a".repeat(30))), "a".repeat(30));
    }

    #[test]
    fn add_worksheets() {
        let mut workbook = Workbook::new();
        assert!(workbook.is_empty());
        assert_eq!(workbook.add_worksheet("Content", 14.0).unwrap(), 0);
        assert_eq!(workbook.add_worksheet("Table_1", 14.0).unwrap(), 1);
        assert_eq!(workbook.len(), 2);
        assert_eq!(workbook.worksheet(1).unwrap().name(), "Table_1");
        assert_eq!(workbook.worksheet(0).unwrap().name(), "Content");
    }

    #[test]
    fn reject_invalid_worksheet_names() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet("Content", 14.0).unwrap();
        assert_eq!(
            workbook.add_worksheet("content", 14.0),
            Err(SpreadsheetError::DuplicateSheetName("content".to_owned()))
        );
        assert_eq!(workbook.add_worksheet("   ", 14.0), Err(SpreadsheetError::EmptySheetName));
        assert_eq!(workbook.add_worksheet("''", 14.0), Err(SpreadsheetError::EmptySheetName));
        assert_eq!(
            workbook.add_worksheet("history", 14.0),
            Err(SpreadsheetError::ReservedSheetName("history".to_owned()))
        );
        assert_eq!(workbook.worksheet(5).unwrap_err(), SpreadsheetError::SheetNotFound(5));
    }
}
