use crate::config::MAX_CELL_LENGTH;
use crate::converter::prescan::row_cells;
use crate::converter::prescan::table_rows;
use crate::converter::text::extract_text;
use crate::error::RustyExcelError;
use crate::helpers::string::char_count;
use crate::helpers::string::estimate_lines;
use crate::helpers::string::estimate_width;
use crate::helpers::string::truncate;
use crate::helpers::string::WIDTH_FACTOR;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellStyle;
use crate::spreadsheet::cell::VerticalAlign;
use crate::spreadsheet::sheet::Worksheet;
use log::debug;
use scraper::ElementRef;

/// Cells longer than this many characters wrap.
pub(crate) const WRAP_THRESHOLD: usize = 30;

/// Height of one wrapped line in points.
const LINE_HEIGHT: f64 = 25.0;

/// Table row heights are kept within these bounds.
const MIN_ROW_HEIGHT: f64 = 25.0;
const MAX_ROW_HEIGHT: f64 = 150.0;

/// Width every table column starts from.
pub(crate) const DEFAULT_COLUMN_WIDTH: f64 = 14.0;

/// Content-driven widths never exceed this before padding.
const MAX_COLUMN_WIDTH: f64 = 60.0;

/// Two characters of breathing room added to every table column.
const COLUMN_PADDING: f64 = 2.0 * WIDTH_FACTOR;

/// Whether a table cell wraps: it holds a line break or exceeds the length threshold.
pub(crate) fn needs_wrap(text: &str) -> bool {
    text.contains('\n') || char_count(text) > WRAP_THRESHOLD
}

/// Row height a wrapped cell requires, 25 points per estimated line within 25..=150.
pub(crate) fn wrapped_row_height(text: &str) -> f64 {
    let lines = estimate_lines(text, WRAP_THRESHOLD) as f64;
    (lines * LINE_HEIGHT).clamp(MIN_ROW_HEIGHT, MAX_ROW_HEIGHT)
}

/// Style of a table cell: `<th>` and first-row cells are headers, even rows are shaded.
pub(crate) fn table_cell_style(is_header_cell: bool, row_index: usize) -> CellStyle {
    if is_header_cell || row_index == 0 {
        CellStyle::TableHeader
    } else if row_index % 2 == 0 {
        CellStyle::TableCellShaded
    } else {
        CellStyle::TableCell
    }
}

/// Computes the width of one table column.
///
/// # Arguments
/// * `header` - Text of the column's cell in the table's first row, if any
/// * `cells` - Texts of the column's cells in this table only, header row included
///
/// # Returns
/// The padded width: the default width when no text needs more room, otherwise
/// the larger of the header and widest cell estimates capped at 60
pub(crate) fn column_width<'a>(header: Option<&str>, cells: impl Iterator<Item = &'a str>) -> f64 {
    let mut width = DEFAULT_COLUMN_WIDTH;
    let mut needs_more_room = false;
    if let Some(header) = header {
        let estimate = estimate_width(header);
        if estimate > DEFAULT_COLUMN_WIDTH {
            needs_more_room = true;
            width = estimate.clamp(DEFAULT_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        }
    }

    let mut widest_content = DEFAULT_COLUMN_WIDTH;
    for text in cells {
        let estimate = estimate_width(text);
        if estimate > DEFAULT_COLUMN_WIDTH {
            needs_more_room = true;
            widest_content = widest_content.max(estimate);
        }
    }

    if needs_more_room {
        width.max(widest_content.min(MAX_COLUMN_WIDTH)) + COLUMN_PADDING
    } else {
        DEFAULT_COLUMN_WIDTH + COLUMN_PADDING
    }
}

/// Writes one HTML table into a worksheet, one row per `<tr>`, starting at the sheet's next row.
///
/// Rows of nested tables are not emitted; their text stays in the enclosing cell.
/// Column widths are sized from this table's rows only and never shrink existing columns.
///
/// # Returns
/// The index of the row right after the last emitted row
pub(crate) fn convert_table(table: ElementRef<'_>, sheet: &mut Worksheet) -> Result<usize, RustyExcelError> {
    let first_row = sheet.next_row();
    let mut grid: Vec<Vec<String>> = Vec::new();

    for (row_index, row) in table_rows(table).into_iter().enumerate() {
        let row_number = sheet.append_row()?;
        let mut height = MIN_ROW_HEIGHT;
        let mut texts = Vec::new();
        for (offset, cell) in row_cells(row).enumerate() {
            let text = truncate(&extract_text(cell), MAX_CELL_LENGTH);
            let style = table_cell_style(cell.value().name() == "th", row_index);
            let mut output = Cell::new(row_number, offset + 1, text.as_str(), style);
            if needs_wrap(&text) {
                output.wrap = true;
                output.vertical = VerticalAlign::Top;
                height = height.max(wrapped_row_height(&text));
            }
            sheet.put(output)?;
            texts.push(text);
        }
        sheet.set_row_height(row_number, height);
        grid.push(texts);
    }

    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    for offset in 0..columns {
        let header = grid.first().and_then(|row| row.get(offset)).map(String::as_str);
        let cells = grid.iter().filter_map(|row| row.get(offset)).map(String::as_str);
        let width = column_width(header, cells);
        sheet.widen_column(offset + 1, width);
        debug!("Table column {} on '{}': width {:.1}", offset + 1, sheet.name(), width);
    }
    debug!("Table written to '{}' rows {}..{}", sheet.name(), first_row, sheet.next_row());

    Ok(sheet.next_row())
}

#[cfg(test)]
mod tests {
    use crate::converter::table::*;
    use rstest::rstest;
    use scraper::Html;
    use scraper::Selector;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    fn convert(html: &str, sheet: &mut Worksheet) -> usize {
        let document = Html::parse_document(html);
        let table = document.select(&Selector::parse("table").unwrap()).next().unwrap();
        convert_table(table, sheet).unwrap()
    }

    #[rstest]
    #[case("a\nb\nc", true, 75.0)]
    #[case(&"x".repeat(45), true, 50.0)]
    #[case(&"x".repeat(30), false, 25.0)]
    #[case(&"x".repeat(31), true, 50.0)]
    #[case(&"x".repeat(200), true, 150.0)]
    #[case("line one\nline two", true, 50.0)]
    #[case("0123456789", false, 25.0)]
    fn wrap_and_height(#[case] text: &str, #[case] wraps: bool, #[case] height: f64) {
        assert_eq!(needs_wrap(text), wraps);
        if wraps {
            assert_close(wrapped_row_height(text), height);
        }
    }

    #[rstest]
    #[case(false, 0, CellStyle::TableHeader)]
    #[case(true, 3, CellStyle::TableHeader)]
    #[case(false, 1, CellStyle::TableCell)]
    #[case(false, 2, CellStyle::TableCellShaded)]
    #[case(false, 3, CellStyle::TableCell)]
    fn cell_styles(#[case] is_th: bool, #[case] row_index: usize, #[case] expected: CellStyle) {
        assert_eq!(table_cell_style(is_th, row_index), expected);
    }

    #[test]
    fn default_width_gets_padding() {
        assert_close(column_width(Some("A"), ["A", "1"].into_iter()), 16.4);
        assert_close(column_width(None, std::iter::empty()), 16.4);
    }

    #[test]
    fn header_driven_width() {
        let header = "x".repeat(20); // 24 units
        assert_close(column_width(Some(&header), [header.as_str(), "1"].into_iter()), 26.4);
        let cjk = "标题标题标题"; // 6 * 2 * 1.2 = 14.4 units
        assert_close(column_width(Some(cjk), [cjk].into_iter()), 16.8);
    }

    #[test]
    fn content_driven_width_is_capped() {
        let long = "x".repeat(100);
        assert_close(column_width(Some("A"), ["A", long.as_str()].into_iter()), 62.4);
        let header = "y".repeat(80);
        assert_close(column_width(Some(&header), [header.as_str()].into_iter()), 62.4);
    }

    #[test]
    fn convert_rows_and_styles() {
        let mut sheet = Worksheet::new("Content", 14.0, 25.0);
        sheet.append_row().unwrap();
        let html = "<table>\
            <tr><th>A</th><th>B</th></tr>\
            <tr><td>1</td><td>first<br>second<br>third</td></tr>\
            <tr><td>2</td><td>short</td></tr>\
            <tr><td>3</td><td>four</td></tr>\
            </table>";
        assert_eq!(convert(html, &mut sheet), 6);

        assert_eq!(sheet.cell(2, 1).unwrap().style, CellStyle::TableHeader);
        assert_eq!(sheet.cell(3, 1).unwrap().style, CellStyle::TableCell);
        assert_eq!(sheet.cell(4, 1).unwrap().style, CellStyle::TableCellShaded);
        assert_eq!(sheet.cell(5, 2).unwrap().style, CellStyle::TableCell);

        let wrapped = sheet.cell(3, 2).unwrap();
        assert_eq!(wrapped.value, "first\nsecond\nthird");
        assert!(wrapped.wrap);
        assert_eq!(wrapped.vertical, VerticalAlign::Top);
        assert!(!sheet.cell(3, 1).unwrap().wrap);
        assert_close(sheet.row_height(3), 75.0);
        assert_close(sheet.row_height(4), 25.0);
        assert!(sheet.merges().is_empty());

        assert_close(sheet.column_width(1), 16.4);
        assert_close(sheet.column_width(2), 24.0); // 18 characters, line breaks included
    }

    #[test]
    fn first_row_td_is_header() {
        let mut sheet = Worksheet::new("Content", 14.0, 25.0);
        convert("<table><tr><td>h</td></tr><tr><td>v</td></tr></table>", &mut sheet);
        assert_eq!(sheet.cell(1, 1).unwrap().style, CellStyle::TableHeader);
        assert_eq!(sheet.cell(2, 1).unwrap().style, CellStyle::TableCell);
    }

    #[test]
    fn widths_scan_only_this_table() {
        let mut sheet = Worksheet::new("Content", 14.0, 25.0);
        let wide = format!("<table><tr><th>A</th></tr><tr><td>{}</td></tr></table>", "w".repeat(40));
        convert(&wide, &mut sheet);
        assert_close(sheet.column_width(1), 50.4);

        let mut other = Worksheet::new("Other", 14.0, 25.0);
        convert(&wide, &mut other);
        convert("<table><tr><th>A</th><th>B</th></tr></table>", &mut other);
        assert_close(other.column_width(1), 50.4);
        assert_close(other.column_width(2), 16.4);
    }

    #[test]
    fn empty_table_emits_nothing() {
        let mut sheet = Worksheet::new("Content", 14.0, 25.0);
        assert_eq!(convert("<table></table>", &mut sheet), 1);
        assert_eq!(sheet.row_count(), 0);
    }
}
