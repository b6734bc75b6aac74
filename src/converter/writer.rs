use crate::config::ContentMappingConfig;
use crate::config::MAX_CELL_LENGTH;
use crate::converter::prescan::ColumnCount;
use crate::error::RustyExcelError;
use crate::error::ResultMessage;
use crate::helpers::string::truncate;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellStyle;
use crate::spreadsheet::range::MergeRange;
use crate::spreadsheet::sheet::Worksheet;
use log::debug;
use log::warn;
use std::fmt::Display;

/// Kind of a non-table content block, written to the Type column in fallback mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Paragraph,
    ListItem,
    CodeBlock,
    Blockquote,
    Text,
    TableReference,
}

impl BlockKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::ListItem => "list-item",
            BlockKind::CodeBlock => "code-block",
            BlockKind::Blockquote => "blockquote",
            BlockKind::Text => "text",
            BlockKind::TableReference => "table-reference",
        }
    }

    /// Cell style of the block's content cell.
    pub(crate) fn style(&self, level: u8) -> CellStyle {
        match self {
            BlockKind::Heading => CellStyle::Heading(level),
            BlockKind::ListItem => CellStyle::ListItem,
            BlockKind::CodeBlock => CellStyle::Code,
            BlockKind::Blockquote => CellStyle::Blockquote,
            BlockKind::Paragraph | BlockKind::Text | BlockKind::TableReference => CellStyle::Paragraph,
        }
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appends one worksheet row per non-table content block.
pub(crate) struct RowWriter<'a> {
    columns: ColumnCount,
    mapping: &'a ContentMappingConfig,
}

impl<'a> RowWriter<'a> {
    pub(crate) fn new(columns: ColumnCount, mapping: &'a ContentMappingConfig) -> Self {
        RowWriter { columns, mapping }
    }

    /// Appends exactly one row holding a content block and returns its index.
    ///
    /// With a table wider than one column in the document, the row is merged across
    /// that width and the text sits in column 1; headings never wrap, other blocks
    /// always do. Otherwise the enabled Type, Level and Content columns are filled
    /// individually without wrapping. A failed merge falls back to an unmerged cell
    /// in column 1.
    ///
    /// # Arguments
    /// * `sheet` - Worksheet receiving the row
    /// * `kind` - Block kind, decides style and wrapping
    /// * `level` - Heading or list level, 0 when not applicable
    /// * `text` - Block text, truncated to the configured maximum cell length, never
    ///   beyond Excel's own limit
    pub(crate) fn write(&self, sheet: &mut Worksheet, kind: BlockKind, level: u8, text: &str) -> Result<usize, RustyExcelError> {
        let content = truncate(text, self.mapping.max_cell_length.min(MAX_CELL_LENGTH));
        let row = sheet.append_row()?;
        let written = if self.columns.is_merged() {
            self.write_merged(sheet, row, kind, level, content)
        } else {
            self.write_columns(sheet, row, kind, level, content)
        };
        written.with_prefix(&format!("failed to write {kind} row {row}"))?;
        Ok(row)
    }

    fn write_merged(&self, sheet: &mut Worksheet, row: usize, kind: BlockKind, level: u8, content: String) -> Result<(), RustyExcelError> {
        let mut cell = Cell::new(row, 1, content, kind.style(level));
        cell.wrap = kind != BlockKind::Heading;
        sheet.put(cell)?;

        let merged = MergeRange::row_span(row, 1, self.columns.get())
            .map_err(RustyExcelError::from)
            .and_then(|range| Ok(sheet.merge(range)?));
        match merged {
            Ok(()) => debug!("Merged row {} across {} columns", row, self.columns.get()),
            Err(error) => {
                warn!("Failed to merge columns for {kind} row {row}: {error}");
                let mut cell = sheet.cell(row, 1).cloned().unwrap_or_else(|| Cell::new(row, 1, "", kind.style(level)));
                cell.wrap = false;
                sheet.put(cell)?;
            }
        }
        Ok(())
    }

    fn write_columns(&self, sheet: &mut Worksheet, row: usize, kind: BlockKind, level: u8, content: String) -> Result<(), RustyExcelError> {
        let mut col = 1;
        if self.mapping.include_type {
            sheet.put(Cell::new(row, col, kind.as_str(), CellStyle::Paragraph))?;
            col += 1;
        }
        if self.mapping.include_level {
            let value = if level > 0 { level.to_string() } else { String::new() };
            sheet.put(Cell::new(row, col, value, CellStyle::Paragraph))?;
            col += 1;
        }
        if self.mapping.include_content {
            sheet.put(Cell::new(row, col, content, kind.style(level)))?;
        }
        Ok(())
    }
}
