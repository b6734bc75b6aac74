use crate::spreadsheet::reference::index_to_reference;
use std::fmt::Display;

/// Visual role of a cell, resolved to fonts, fills and borders by the encoder.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellStyle {
    #[default]
    Plain,
    /// Worksheet header row (Type / Level / Content titles)
    ColumnHeader,
    /// Heading block, level 1 to 6
    Heading(u8),
    /// Paragraph and generic text blocks
    Paragraph,
    /// List item blocks
    ListItem,
    /// Code block
    Code,
    /// Blockquote block
    Blockquote,
    /// `<th>` cells and cells of a table's first row
    TableHeader,
    /// Table body cell
    TableCell,
    /// Table body cell on a shaded (even) row
    TableCellShaded,
}

/// Vertical alignment of a cell's content.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
}

impl VerticalAlign {
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            VerticalAlign::Top => "top",
            VerticalAlign::Middle => "middle",
        }
    }
}

/// Represents a single cell of the output worksheet with position, value and formatting.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Row index (1-based)
    pub row: usize,
    /// Column index (1-based)
    pub col: usize,
    /// Cell text
    pub value: String,
    /// Visual role
    pub style: CellStyle,
    /// Whether the text may flow onto several visual lines
    pub wrap: bool,
    /// Vertical alignment
    pub vertical: VerticalAlign,
}

impl Cell {
    /// Creates a non-wrapping, middle-aligned cell.
    pub fn new(row: usize, col: usize, value: impl Into<String>, style: CellStyle) -> Self {
        Cell {
            row,
            col,
            value: value.into(),
            style,
            wrap: false,
            vertical: VerticalAlign::Middle,
        }
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Returns true if the cell holds no text.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use crate::spreadsheet::cell::*;

    #[test]
    fn new_cell_defaults() {
        let cell = Cell::new(4, 2, "value", CellStyle::TableCell);
        assert_eq!(cell.reference(), "B4");
        assert!(!cell.wrap);
        assert_eq!(cell.vertical, VerticalAlign::Middle);
        assert_eq!(cell.to_string(), "value");
        assert!(!cell.is_empty());
    }
}
