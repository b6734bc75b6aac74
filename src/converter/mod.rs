//! HTML to workbook conversion.
//!
//! Conversion runs in two phases over one parsed document. [`scan`] measures the
//! widest table row of the whole document, then [`write`] walks the body in document
//! order and appends rows to the primary worksheet. The scan result is fixed before
//! the first row is written, since every merged content row spans exactly that many
//! columns.

pub mod prescan;
pub(crate) mod table;
pub(crate) mod text;
pub(crate) mod walker;
pub mod writer;

pub use crate::converter::prescan::scan;
pub use crate::converter::prescan::ColumnCount;
pub use crate::converter::writer::BlockKind;

use crate::config::ExcelConfig;
use crate::converter::table::convert_table;
use crate::converter::walker::walk_children;
use crate::converter::writer::RowWriter;
use crate::error::ResultMessage;
use crate::error::RustyExcelError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellStyle;
use crate::spreadsheet::sheet::Worksheet;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Workbook;
use crate::spreadsheet::HEADER_ROW_HEIGHT;
use log::debug;
use scraper::ElementRef;
use scraper::Html;
use scraper::Selector;
use std::sync::LazyLock;
use thiserror::Error;

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("Hardcode selector")
});

#[derive(Error, Debug, PartialEq)]
pub enum ConvertError {
    #[error("Failed to create primary worksheet '{0}': {1}")]
    PrimarySheet(String, SpreadsheetError),

    #[error("Failed to create worksheet '{0}' for table {1}: {2}")]
    TableSheet(String, usize, SpreadsheetError),
}

/// Mutable state of one conversion: the workbook under construction and the
/// table counter. Created per document, never shared between conversions.
pub(crate) struct ConversionState<'a> {
    config: &'a ExcelConfig,
    writer: RowWriter<'a>,
    workbook: Workbook,
    primary: usize,
    tables: usize,
}

impl<'a> ConversionState<'a> {
    /// Creates the primary worksheet with its header row and, without merged rows,
    /// the configured Type, Level and Content column widths.
    fn new(config: &'a ExcelConfig, columns: ColumnCount) -> Result<Self, RustyExcelError> {
        let mut workbook = Workbook::new();
        let name = &config.worksheet.name;
        let primary = workbook.add_worksheet(name, config.column_widths.default)
            .map_err(|error| ConvertError::PrimarySheet(name.clone(), error))?;

        let mut state = ConversionState {
            config,
            writer: RowWriter::new(columns, &config.content_mapping),
            workbook,
            primary,
            tables: 0,
        };
        state.write_header_row(columns)?;
        Ok(state)
    }

    fn primary_sheet(&mut self) -> Result<&mut Worksheet, RustyExcelError> {
        Ok(self.workbook.worksheet_mut(self.primary)?)
    }

    /// Row 1 of the primary worksheet. Titles appear only for enabled optional columns.
    fn write_header_row(&mut self, columns: ColumnCount) -> Result<(), RustyExcelError> {
        let config = self.config;
        let mapping = &config.content_mapping;
        let widths = &config.column_widths;
        let mut titles = Vec::new();
        if mapping.include_type {
            titles.push(("Type", widths.kind));
        }
        if mapping.include_level {
            titles.push(("Level", widths.level));
        }
        if mapping.include_content {
            titles.push(("Content", widths.content));
        }
        let labelled = mapping.include_type || mapping.include_level;

        let sheet = self.primary_sheet()?;
        let row = sheet.append_row()?;
        sheet.set_row_height(row, HEADER_ROW_HEIGHT);
        for (offset, (title, width)) in titles.into_iter().enumerate() {
            let col = offset + 1;
            if labelled {
                sheet.put(Cell::new(row, col, title, CellStyle::ColumnHeader))?;
            }
            if !columns.is_merged() {
                sheet.set_column_width(col, width);
            }
        }
        Ok(())
    }

    /// Appends one content row to the primary worksheet.
    pub(crate) fn write_block(&mut self, kind: BlockKind, level: u8, text: &str) -> Result<usize, RustyExcelError> {
        let sheet = self.workbook.worksheet_mut(self.primary)?;
        self.writer.write(sheet, kind, level, text)
    }

    /// Writes a table inline, or on its own worksheet with an optional reference row.
    pub(crate) fn write_table(&mut self, table: ElementRef<'_>) -> Result<(), RustyExcelError> {
        self.tables += 1;
        let number = self.tables;
        let config = self.config;
        let handling = &config.table_handling;

        if !handling.separate_table_sheets {
            let sheet = self.primary_sheet()?;
            convert_table(table, sheet).with_prefix(&format!("failed to convert table {number}"))?;
            return Ok(());
        }

        let name = format!("{}{}", handling.table_sheet_prefix, number);
        let index = self.workbook.add_worksheet(&name, config.column_widths.default)
            .map_err(|error| ConvertError::TableSheet(name.clone(), number, error))?;
        let sheet = self.workbook.worksheet_mut(index)?;
        convert_table(table, sheet).with_prefix(&format!("failed to convert table {number}"))?;
        debug!("Table {} written to worksheet '{}'", number, sheet.name());

        if handling.preserve_original_tables {
            self.write_block(BlockKind::TableReference, 0, &format!("[Table {number}] - See separate sheet"))?;
        }
        Ok(())
    }

    fn into_workbook(self) -> Workbook {
        self.workbook
    }
}

/// Writes a parsed document into a new workbook.
///
/// # Arguments
/// * `document` - Parsed HTML; the children of `<body>` are converted in order
/// * `columns` - Result of [`scan`] over the same document
/// * `config` - Conversion settings, validated before anything is written
///
/// # Returns
/// A workbook whose first worksheet holds the content, followed by one worksheet
/// per table when tables are rendered separately
pub fn write(document: &Html, columns: ColumnCount, config: &ExcelConfig) -> Result<Workbook, RustyExcelError> {
    config.validate()?;
    let mut state = ConversionState::new(config, columns)?;
    let root = document.select(&BODY_SELECTOR).next().unwrap_or_else(|| document.root_element());
    walk_children(root, 0, &mut state)?;

    let workbook = state.into_workbook();
    debug!("Conversion finished: {} worksheets, {} columns per merged row", workbook.len(), columns.get());
    Ok(workbook)
}

/// Scans then writes a parsed document.
pub fn convert(document: &Html, config: &ExcelConfig) -> Result<Workbook, RustyExcelError> {
    let columns = scan(document);
    write(document, columns, config)
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigError;
    use crate::config::MAX_CELL_LENGTH;
    use crate::converter::*;
    use crate::spreadsheet::range::MergeRange;

    fn convert_html(html: &str, config: &ExcelConfig) -> Workbook {
        convert(&Html::parse_document(html), config).unwrap()
    }

    fn table(columns: usize) -> String {
        let cells = (1..=columns).map(|col| format!("<td>{col}</td>")).collect::<String>();
        format!("<table><tr>{cells}</tr></table>")
    }

    #[test]
    fn end_to_end_scenario() {
        let html = "<h1>Title</h1><p>Short text.</p><table><tr><th>A</th><th>B</th><th>C</th></tr><tr><td>1</td><td>2</td><td>3</td></tr></table>";
        let workbook = convert_html(html, &ExcelConfig::default());
        assert_eq!(workbook.len(), 1);
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.name(), "Content");
        assert_eq!(sheet.row_count(), 5);

        assert!(sheet.row(1).unwrap().cells.is_empty());
        assert_eq!(sheet.row_height(1), HEADER_ROW_HEIGHT);

        let title = sheet.cell(2, 1).unwrap();
        assert_eq!(title.value, "Title");
        assert!(!title.wrap);
        let text = sheet.cell(3, 1).unwrap();
        assert_eq!(text.value, "Short text.");
        assert!(text.wrap);
        assert_eq!(sheet.merges(), &[MergeRange::row_span(2, 1, 3).unwrap(), MergeRange::row_span(3, 1, 3).unwrap()]);

        for (col, value) in ["A", "B", "C"].into_iter().enumerate() {
            let cell = sheet.cell(4, col + 1).unwrap();
            assert_eq!(cell.value, value);
            assert_eq!(cell.style, CellStyle::TableHeader);
        }
        for (col, value) in ["1", "2", "3"].into_iter().enumerate() {
            let cell = sheet.cell(5, col + 1).unwrap();
            assert_eq!(cell.value, value);
            assert_eq!(cell.style, CellStyle::TableCell);
        }
        assert!(sheet.merge_at(4, 1).is_none());
        assert!(sheet.merge_at(5, 2).is_none());
    }

    #[test]
    fn paragraphs_span_the_widest_table() {
        let html = format!("{}<p>near narrow table</p>{}{}<p>at the end</p>", table(3), table(5), table(2));
        let document = Html::parse_document(&html);
        let columns = scan(&document);
        assert_eq!(columns.get(), 5);

        let workbook = write(&document, columns, &ExcelConfig::default()).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        let spans: Vec<String> = sheet.merges().iter().map(ToString::to_string).collect();
        assert_eq!(spans, vec!["A3:E3", "A6:E6"]);
    }

    #[test]
    fn fallback_without_tables() {
        let mut config = ExcelConfig::default();
        config.content_mapping.include_type = true;
        config.content_mapping.include_level = true;
        let workbook = convert_html("<h2>Heading</h2><ul><li>item</li></ul><p>body</p>", &config);
        let sheet = workbook.worksheet(0).unwrap();

        let header: Vec<&str> = sheet.row(1).unwrap().cells.iter().map(|cell| cell.value.as_str()).collect();
        assert_eq!(header, vec!["Type", "Level", "Content"]);
        assert!(sheet.row(1).unwrap().cells.iter().all(|cell| cell.style == CellStyle::ColumnHeader));

        let rows: Vec<Vec<&str>> = (2..=4)
            .map(|row| sheet.row(row).unwrap().cells.iter().map(|cell| cell.value.as_str()).collect())
            .collect();
        assert_eq!(rows, vec![
            vec!["heading", "2", "Heading"],
            vec!["list-item", "1", "• item"],
            vec!["paragraph", "", "body"],
        ]);
        assert!(sheet.merges().is_empty());
        assert_eq!(sheet.column_width(1), 25.0);
        assert_eq!(sheet.column_width(2), 10.0);
        assert_eq!(sheet.column_width(3), 50.0);
    }

    #[test]
    fn merged_mode_keeps_default_widths_for_content() {
        let html = format!("<p>{}</p>{}", "long ".repeat(40), table(2));
        let workbook = convert_html(&html, &ExcelConfig::default());
        let sheet = workbook.worksheet(0).unwrap();
        assert!((sheet.column_width(1) - 16.4).abs() < 1e-9);
        assert!((sheet.column_width(2) - 16.4).abs() < 1e-9);
        assert_eq!(sheet.column_width(3), 14.0);
    }

    #[test]
    fn separate_table_sheets() {
        let mut config = ExcelConfig::default();
        config.table_handling.separate_table_sheets = true;
        let html = "<p>Intro</p><table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table><table><tr><td>x</td></tr></table>";
        let workbook = convert_html(html, &config);

        let names: Vec<&str> = workbook.worksheets().iter().map(Worksheet::name).collect();
        assert_eq!(names, vec!["Content", "Table_1", "Table_2"]);

        let first = workbook.worksheet(1).unwrap();
        assert_eq!(first.row_count(), 2);
        assert_eq!(first.cell(1, 1).unwrap().value, "A");
        assert_eq!(first.cell(2, 2).unwrap().value, "2");

        let primary = workbook.worksheet(0).unwrap();
        assert_eq!(primary.row_count(), 4);
        assert_eq!(primary.cell(2, 1).unwrap().value, "Intro");
        assert_eq!(primary.cell(3, 1).unwrap().value, "[Table 1] - See separate sheet");
        assert_eq!(primary.cell(4, 1).unwrap().value, "[Table 2] - See separate sheet");
        assert_eq!(primary.merges().len(), 3);
    }

    #[test]
    fn separate_tables_without_reference_rows() {
        let mut config = ExcelConfig::default();
        config.table_handling.separate_table_sheets = true;
        config.table_handling.preserve_original_tables = false;
        config.table_handling.table_sheet_prefix = "Data ".to_owned();
        let workbook = convert_html("<p>Intro</p>", &config);
        assert_eq!(workbook.len(), 1);

        let workbook = convert_html(&format!("<p>Intro</p>{}", table(2)), &config);
        assert_eq!(workbook.worksheet(1).unwrap().name(), "Data 1");
        assert_eq!(workbook.worksheet(0).unwrap().row_count(), 2);
    }

    #[test]
    fn table_sheet_name_collision() {
        let mut config = ExcelConfig::default();
        config.worksheet.name = "table_1".to_owned();
        config.table_handling.separate_table_sheets = true;
        let error = convert(&Html::parse_document(&table(2)), &config).unwrap_err();
        assert!(matches!(
            error,
            RustyExcelError::ConvertError(ConvertError::TableSheet(_, 1, SpreadsheetError::DuplicateSheetName(_)))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ExcelConfig::default();
        config.content_mapping.max_cell_length = 2;
        let error = convert(&Html::parse_document("<p>x</p>"), &config).unwrap_err();
        assert!(matches!(error, RustyExcelError::ConfigError(ConfigError::CellLengthTooSmall(2))));
    }

    #[test]
    fn cell_length_above_excel_limit_is_rejected() {
        let mut config = ExcelConfig::default();
        config.content_mapping.max_cell_length = 100_000;
        let html = format!("<p>{}</p>", "x".repeat(40_000));
        let error = convert(&Html::parse_document(&html), &config).unwrap_err();
        assert!(matches!(error, RustyExcelError::ConfigError(ConfigError::CellLengthTooLarge(100_000))));

        config.content_mapping.max_cell_length = MAX_CELL_LENGTH;
        let workbook = convert_html(&html, &config);
        let value = &workbook.worksheet(0).unwrap().cell(2, 1).unwrap().value;
        assert_eq!(value.chars().count(), MAX_CELL_LENGTH);
    }

    #[test]
    fn empty_document_keeps_header_row() {
        let workbook = convert_html("", &ExcelConfig::default());
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.row_count(), 1);
        assert_eq!(sheet.next_row(), 2);
    }

    #[test]
    fn fragment_without_body() {
        let document = Html::parse_fragment("<h1>Title</h1><p>text</p>");
        let workbook = convert(&document, &ExcelConfig::default()).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.cell(2, 1).unwrap().value, "Title");
        assert_eq!(sheet.cell(3, 1).unwrap().value, "text");
    }
}
