use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::range::MergeRange;
use crate::spreadsheet::range::RangeError;
use crate::spreadsheet::reference::MAX_COLUMNS;
use crate::spreadsheet::reference::MAX_ROWS;
use crate::spreadsheet::SpreadsheetError;
use std::collections::BTreeMap;

/// One output row: a 1-based index, an optional custom height and its cells ordered by column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    /// Row index (1-based)
    pub index: usize,
    /// Custom height in points, `None` keeps the sheet default
    pub height: Option<f64>,
    /// Cells sorted by column
    pub cells: Vec<Cell>,
}

impl Row {
    fn new(index: usize) -> Self {
        Row {
            index,
            height: None,
            cells: Vec::new(),
        }
    }

    /// Returns the cell at a column, if any.
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.col == col)
    }

    /// Stores a cell, replacing the previous one of the same column.
    fn put(&mut self, cell: Cell) {
        match self.cells.binary_search_by_key(&cell.col, |existing| existing.col) {
            Ok(position) => self.cells[position] = cell,
            Err(position) => self.cells.insert(position, cell),
        }
    }
}

/// An output worksheet growing downwards from row 1.
///
/// Rows are allocated by [`Worksheet::append_row`] only, so the row cursor never moves back
/// and rows stay contiguous. Column widths only ever grow through [`Worksheet::widen_column`].
#[derive(Clone, Debug, PartialEq)]
pub struct Worksheet {
    /// Worksheet name (already sanitized)
    pub(crate) name: String,
    /// Allocated rows, `rows[i]` holds row `i + 1`
    rows: Vec<Row>,
    /// Merged ranges in insertion order
    merges: Vec<MergeRange>,
    /// Custom column widths keyed by 1-based column
    column_widths: BTreeMap<usize, f64>,
    /// Width of columns without a custom width
    default_column_width: f64,
    /// Height of rows without a custom height
    default_row_height: f64,
}

impl Worksheet {
    /// Creates an empty worksheet.
    pub(crate) fn new(name: &str, default_column_width: f64, default_row_height: f64) -> Self {
        Worksheet {
            name: name.to_owned(),
            rows: Vec::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
            default_column_width,
            default_row_height,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the row the next [`Worksheet::append_row`] call allocates.
    pub fn next_row(&self) -> usize {
        self.rows.len() + 1
    }

    /// Number of allocated rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Allocates the next row and returns its index.
    pub fn append_row(&mut self) -> Result<usize, SpreadsheetError> {
        let index = self.next_row();
        if index > MAX_ROWS {
            Err(SpreadsheetError::TooManyRows(self.name.clone()))?
        }
        self.rows.push(Row::new(index));
        Ok(index)
    }

    /// Writes a cell into an already allocated row.
    pub fn put(&mut self, cell: Cell) -> Result<(), SpreadsheetError> {
        if cell.col == 0 || cell.col > MAX_COLUMNS {
            Err(SpreadsheetError::ColumnOutOfBounds(cell.col, self.name.clone()))?
        }
        let name = self.name.clone();
        let row = self.row_mut(cell.row).ok_or(SpreadsheetError::RowNotAllocated(cell.row, name))?;
        row.put(cell);
        Ok(())
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        index.checked_sub(1).and_then(|position| self.rows.get(position))
    }

    fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        index.checked_sub(1).and_then(|position| self.rows.get_mut(position))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.row(row).and_then(|row| row.cell(col))
    }

    /// Sets a row height, ignoring rows that were never allocated.
    pub fn set_row_height(&mut self, index: usize, height: f64) {
        if let Some(row) = self.row_mut(index) {
            row.height = Some(height);
        }
    }

    /// Height of a row as rendered: its custom height or the sheet default.
    pub fn row_height(&self, index: usize) -> f64 {
        self.row(index)
            .and_then(|row| row.height)
            .unwrap_or(self.default_row_height)
    }

    pub fn default_row_height(&self) -> f64 {
        self.default_row_height
    }

    /// Registers a merged range.
    ///
    /// The range must lie in allocated rows and must not share a cell with an existing merge.
    pub fn merge(&mut self, range: MergeRange) -> Result<(), SpreadsheetError> {
        if range.row_upper_bound > self.row_count() {
            Err(SpreadsheetError::RowNotAllocated(range.row_upper_bound, self.name.clone()))?
        }
        if let Some(existing) = self.merges.iter().find(|existing| existing.overlaps(&range)) {
            Err(RangeError::Overlap(range.to_string(), existing.to_string()))?
        }
        self.merges.push(range);
        Ok(())
    }

    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    /// Returns the merged range a cell belongs to, if any.
    pub fn merge_at(&self, row: usize, col: usize) -> Option<&MergeRange> {
        self.merges.iter().find(|range| range.contains(row, col))
    }

    /// Sets a column width unconditionally.
    pub fn set_column_width(&mut self, col: usize, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// Enlarges a column to `width` if it is currently narrower.
    pub fn widen_column(&mut self, col: usize, width: f64) {
        let current = self.column_width(col);
        if width > current || !self.column_widths.contains_key(&col) {
            self.column_widths.insert(col, width.max(current));
        }
    }

    /// Width of a column: its custom width or the sheet default.
    pub fn column_width(&self, col: usize) -> f64 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(self.default_column_width)
    }

    /// Columns carrying a custom width, in ascending order.
    pub fn column_widths(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.column_widths.iter().map(|(col, width)| (*col, *width))
    }

    pub fn default_column_width(&self) -> f64 {
        self.default_column_width
    }

    /// Largest column index holding a cell or covered by a merge (0 for an empty sheet).
    pub fn max_col(&self) -> usize {
        let cells = self.rows.iter()
            .filter_map(|row| row.cells.last())
            .map(|cell| cell.col);
        let merges = self.merges.iter().map(|range| range.col_upper_bound);
        cells.chain(merges).max().unwrap_or(0)
    }
}
