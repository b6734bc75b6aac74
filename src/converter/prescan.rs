use crate::converter::text::child_elements;
use crate::spreadsheet::reference::MAX_COLUMNS;
use log::debug;
use scraper::ElementRef;
use scraper::Html;
use scraper::Selector;
use std::sync::LazyLock;

static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table").expect("Hardcode selector")
});

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("tr").expect("Hardcode selector")
});

const CELL_TAGS: [&str; 2] = ["th", "td"];

/// Widest table row found in a document, the span of every merged non-table row.
///
/// Always between 1 and the worksheet column limit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnCount(usize);

impl ColumnCount {
    pub fn new(count: usize) -> Self {
        ColumnCount(count.clamp(1, MAX_COLUMNS))
    }

    pub fn get(&self) -> usize {
        self.0
    }

    /// Whether non-table rows are merged across the table width.
    pub fn is_merged(&self) -> bool {
        self.0 > 1
    }
}

impl Default for ColumnCount {
    fn default() -> Self {
        ColumnCount(1)
    }
}

/// Returns the rows of a table, excluding rows of tables nested inside it.
pub(crate) fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    table.select(&ROW_SELECTOR)
        .filter(|row| nearest_table(*row).map(|owner| owner.id()) == Some(table.id()))
        .collect()
}

/// Returns the `<th>` and `<td>` cells of a row.
pub(crate) fn row_cells(row: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    child_elements(row, &CELL_TAGS)
}

fn nearest_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

/// Counts the columns of the widest row of one table.
pub(crate) fn table_width(table: ElementRef<'_>) -> usize {
    table_rows(table)
        .into_iter()
        .map(|row| row_cells(row).count())
        .max()
        .unwrap_or(0)
}

/// Scans every table of the document, nested ones included, for the widest row.
///
/// Must run to completion before any row is written.
pub fn scan(document: &Html) -> ColumnCount {
    let mut widest = 0;
    for (index, table) in document.select(&TABLE_SELECTOR).enumerate() {
        let width = table_width(table);
        widest = widest.max(width);
        debug!("Table {}: {} columns, widest so far {}", index + 1, width, widest);
    }
    ColumnCount::new(widest)
}
