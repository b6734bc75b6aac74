//! Cell appearance palette and the `xl/styles.xml` registry
//! Every distinct (style, wrap, vertical alignment) triple becomes one `cellXfs` entry;
//! fonts, fills and borders are shared between entries.

use crate::error::RustyExcelError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlWriter;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellStyle;
use crate::spreadsheet::cell::VerticalAlign;
use quick_xml::events::BytesStart;
use std::collections::HashMap;

const SPREADSHEET_NAMESPACE: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const UI_FONT: &str = "Segoe UI";
const CODE_FONT: &str = "Consolas";
const BODY_COLOR: &str = "FF2D3748";
const TABLE_HEADER_FILL: &str = "FF2B6CB0";

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Font {
    pub(crate) name: &'static str,
    pub(crate) size: f64,
    pub(crate) color: &'static str,
    pub(crate) bold: bool,
    pub(crate) italic: bool,
}

impl Font {
    const fn regular(name: &'static str, size: f64, color: &'static str) -> Self {
        Font { name, size, color, bold: false, italic: false }
    }

    const fn bold(name: &'static str, size: f64, color: &'static str) -> Self {
        Font { name, size, color, bold: true, italic: false }
    }
}

/// Excel's workbook default font, referenced by `cellXfs` entry 0.
const DEFAULT_FONT: Font = Font::regular("Calibri", 11.0, "FF000000");

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Fill {
    None,
    Gray125,
    Solid(&'static str),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Edge {
    pub(crate) style: &'static str,
    pub(crate) color: &'static str,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Border {
    pub(crate) left: Edge,
    pub(crate) right: Edge,
    pub(crate) top: Edge,
    pub(crate) bottom: Edge,
}

impl Border {
    const fn uniform(style: &'static str, color: &'static str) -> Self {
        let edge = Edge { style, color };
        Border { left: edge, right: edge, top: edge, bottom: edge }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Horizontal {
    Left,
    Center,
}

impl Horizontal {
    const fn as_str(&self) -> &'static str {
        match self {
            Horizontal::Left => "left",
            Horizontal::Center => "center",
        }
    }
}

/// Resolved look of a [`CellStyle`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Appearance {
    pub(crate) font: Font,
    pub(crate) fill: Option<&'static str>,
    pub(crate) border: Option<Border>,
    pub(crate) horizontal: Horizontal,
    pub(crate) indent: u8,
}

impl Appearance {
    fn new(font: Font, fill: Option<&'static str>, border: Option<Border>) -> Self {
        Appearance { font, fill, border, horizontal: Horizontal::Left, indent: 0 }
    }

    fn indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    fn centered(mut self) -> Self {
        self.horizontal = Horizontal::Center;
        self
    }
}

/// Maps a cell role to its fonts, fill, border and alignment.
pub(crate) fn appearance(style: CellStyle) -> Appearance {
    let heading_border = Border::uniform("medium", "FF1A365D");
    let sub_heading_border = Border::uniform("thin", TABLE_HEADER_FILL);
    let content_border = Border::uniform("thin", "FFE2E8F0");
    let table_border = Border::uniform("thin", "FF718096");
    match style {
        CellStyle::Plain => Appearance::new(DEFAULT_FONT, None, None),
        CellStyle::ColumnHeader | CellStyle::TableHeader => Appearance::new(
            Font::bold(UI_FONT, 12.0, "FFFFFFFF"),
            Some(TABLE_HEADER_FILL),
            Some(table_border),
        ).centered(),
        CellStyle::Heading(level) => match level {
            0 | 1 => Appearance::new(Font::bold(UI_FONT, 20.0, "FF1F4E79"), Some("FFE7F3FF"), Some(heading_border)),
            2 => Appearance::new(Font::bold(UI_FONT, 18.0, "FF2F5F8F"), Some("FFEEF7FF"), Some(heading_border)),
            3 => Appearance::new(Font::bold(UI_FONT, 16.0, "FF3F6F9F"), Some("FFF5FAFF"), Some(heading_border)),
            4 => Appearance::new(Font::bold(UI_FONT, 14.0, "FF4F7FAF"), Some("FFFCFDFF"), Some(sub_heading_border)),
            5 => Appearance::new(Font::bold(UI_FONT, 13.0, "FF5F8FBF"), None, Some(sub_heading_border)),
            _ => Appearance::new(Font::bold(UI_FONT, 12.0, "FF6F9FCF"), None, Some(sub_heading_border)),
        },
        CellStyle::Paragraph | CellStyle::ListItem => {
            Appearance::new(Font::regular(UI_FONT, 12.0, BODY_COLOR), None, Some(content_border)).indent(1)
        }
        CellStyle::Code => Appearance::new(
            Font::regular(CODE_FONT, 11.0, "FF1A202C"),
            Some("FFF7FAFC"),
            Some(Border::uniform("thin", "FFCBD5E0")),
        ).indent(1),
        CellStyle::Blockquote => {
            let mut border = content_border;
            border.left = Edge { style: "thick", color: "FF4299E1" };
            let font = Font { italic: true, ..Font::regular(UI_FONT, 12.0, "FF4A5568") };
            Appearance::new(font, Some("FFFEFEFE"), Some(border)).indent(2)
        }
        CellStyle::TableCell => Appearance::new(Font::regular(UI_FONT, 11.0, BODY_COLOR), None, Some(table_border)),
        CellStyle::TableCellShaded => {
            Appearance::new(Font::regular(UI_FONT, 11.0, BODY_COLOR), Some("FFF8FAFC"), Some(table_border))
        }
    }
}

/// One `cellXfs` entry.
#[derive(Clone, Debug, PartialEq)]
struct CellFormat {
    font: usize,
    fill: usize,
    border: usize,
    horizontal: Horizontal,
    vertical: VerticalAlign,
    wrap: bool,
    indent: u8,
}

/// Collects the formats used by a workbook and renders `xl/styles.xml`.
pub(crate) struct StyleRegistry {
    fonts: Vec<Font>,
    fills: Vec<Fill>,
    borders: Vec<Option<Border>>,
    formats: Vec<Option<CellFormat>>,
    lookup: HashMap<(CellStyle, bool, VerticalAlign), usize>,
}

impl StyleRegistry {
    pub(crate) fn new() -> Self {
        StyleRegistry {
            fonts: vec![DEFAULT_FONT],
            fills: vec![Fill::None, Fill::Gray125], // both reserved by Excel
            borders: vec![None],
            formats: vec![None],
            lookup: HashMap::new(),
        }
    }

    /// Returns the `s` attribute for a cell, registering its format on first use.
    pub(crate) fn format_index(&mut self, cell: &Cell) -> usize {
        let key = (cell.style, cell.wrap, cell.vertical);
        if let Some(index) = self.lookup.get(&key) {
            return *index;
        }
        let appearance = appearance(cell.style);
        let fill = appearance.fill.map(Fill::Solid).unwrap_or(Fill::None);
        let format = CellFormat {
            font: intern(&mut self.fonts, appearance.font),
            fill: intern(&mut self.fills, fill),
            border: intern(&mut self.borders, appearance.border),
            horizontal: appearance.horizontal,
            vertical: cell.vertical,
            wrap: cell.wrap,
            indent: appearance.indent,
        };
        let index = intern(&mut self.formats, Some(format));
        self.lookup.insert(key, index);
        index
    }

    /// Renders the registry as the `xl/styles.xml` part.
    pub(crate) fn to_xml(&self) -> Result<XmlWriter, RustyExcelError> {
        let mut writer = XmlWriter::new()?;
        writer.start(BytesStart::new("styleSheet").with_attributes([("xmlns", SPREADSHEET_NAMESPACE)]))?;

        writer.start(BytesStart::new("fonts").with_value("count", self.fonts.len()))?;
        for font in &self.fonts {
            write_font(&mut writer, font)?;
        }
        writer.end("fonts")?;

        writer.start(BytesStart::new("fills").with_value("count", self.fills.len()))?;
        for fill in &self.fills {
            write_fill(&mut writer, fill)?;
        }
        writer.end("fills")?;

        writer.start(BytesStart::new("borders").with_value("count", self.borders.len()))?;
        for border in &self.borders {
            write_border(&mut writer, border.as_ref())?;
        }
        writer.end("borders")?;

        writer.start(BytesStart::new("cellStyleXfs").with_value("count", 1))?;
        writer.empty(default_xf())?;
        writer.end("cellStyleXfs")?;

        writer.start(BytesStart::new("cellXfs").with_value("count", self.formats.len()))?;
        for format in &self.formats {
            match format {
                None => writer.empty(default_xf().with_value("xfId", 0))?,
                Some(format) => write_format(&mut writer, format)?,
            }
        }
        writer.end("cellXfs")?;

        writer.start(BytesStart::new("cellStyles").with_value("count", 1))?;
        writer.empty(BytesStart::new("cellStyle").with_attributes([("name", "Normal"), ("xfId", "0"), ("builtinId", "0")]))?;
        writer.end("cellStyles")?;

        writer.end("styleSheet")?;
        Ok(writer)
    }
}

/// Returns the position of `item` in `items`, appending it when missing.
fn intern<T: PartialEq>(items: &mut Vec<T>, item: T) -> usize {
    match items.iter().position(|existing| *existing == item) {
        Some(index) => index,
        None => {
            items.push(item);
            items.len() - 1
        }
    }
}

fn default_xf() -> BytesStart<'static> {
    BytesStart::new("xf")
        .with_value("numFmtId", 0)
        .with_value("fontId", 0)
        .with_value("fillId", 0)
        .with_value("borderId", 0)
}

fn write_font(writer: &mut XmlWriter, font: &Font) -> Result<(), RustyExcelError> {
    writer.start(BytesStart::new("font"))?;
    if font.bold {
        writer.empty(BytesStart::new("b"))?;
    }
    if font.italic {
        writer.empty(BytesStart::new("i"))?;
    }
    writer.empty(BytesStart::new("sz").with_value("val", font.size))?;
    writer.empty(BytesStart::new("color").with_value("rgb", font.color))?;
    writer.empty(BytesStart::new("name").with_value("val", font.name))?;
    writer.end("font")
}

fn write_fill(writer: &mut XmlWriter, fill: &Fill) -> Result<(), RustyExcelError> {
    writer.start(BytesStart::new("fill"))?;
    match fill {
        Fill::None => writer.empty(BytesStart::new("patternFill").with_value("patternType", "none"))?,
        Fill::Gray125 => writer.empty(BytesStart::new("patternFill").with_value("patternType", "gray125"))?,
        Fill::Solid(color) => {
            writer.start(BytesStart::new("patternFill").with_value("patternType", "solid"))?;
            writer.empty(BytesStart::new("fgColor").with_value("rgb", color))?;
            writer.empty(BytesStart::new("bgColor").with_value("indexed", 64))?;
            writer.end("patternFill")?;
        }
    }
    writer.end("fill")
}

fn write_border(writer: &mut XmlWriter, border: Option<&Border>) -> Result<(), RustyExcelError> {
    writer.start(BytesStart::new("border"))?;
    let edges = border.map(|border| [border.left, border.right, border.top, border.bottom]);
    for (index, name) in ["left", "right", "top", "bottom"].into_iter().enumerate() {
        match edges {
            Some(edges) => {
                let edge = edges[index];
                writer.start(BytesStart::new(name).with_value("style", edge.style))?;
                writer.empty(BytesStart::new("color").with_value("rgb", edge.color))?;
                writer.end(name)?;
            }
            None => writer.empty(BytesStart::new(name))?,
        }
    }
    writer.empty(BytesStart::new("diagonal"))?;
    writer.end("border")
}

fn write_format(writer: &mut XmlWriter, format: &CellFormat) -> Result<(), RustyExcelError> {
    let xf = BytesStart::new("xf")
        .with_value("numFmtId", 0)
        .with_value("fontId", format.font)
        .with_value("fillId", format.fill)
        .with_value("borderId", format.border)
        .with_value("xfId", 0)
        .with_value("applyFont", 1)
        .with_optional_value("applyFill", (format.fill != 0).then_some(1))
        .with_optional_value("applyBorder", (format.border != 0).then_some(1))
        .with_value("applyAlignment", 1);
    writer.start(xf)?;
    let alignment = BytesStart::new("alignment")
        .with_value("horizontal", format.horizontal.as_str())
        .with_value("vertical", format.vertical.as_str())
        .with_optional_value("wrapText", format.wrap.then_some(1))
        .with_optional_value("indent", (format.indent > 0).then_some(format.indent));
    writer.empty(alignment)?;
    writer.end("xf")
}

#[cfg(test)]
mod tests {
    use crate::spreadsheet::style::*;

    #[test]
    fn share_formats_between_cells() {
        let mut registry = StyleRegistry::new();
        let first = registry.format_index(&Cell::new(2, 1, "a", CellStyle::Paragraph));
        let second = registry.format_index(&Cell::new(3, 1, "b", CellStyle::Paragraph));
        assert_eq!(first, 1);
        assert_eq!(first, second);

        let mut wrapped = Cell::new(4, 1, "c", CellStyle::Paragraph);
        wrapped.wrap = true;
        assert_eq!(registry.format_index(&wrapped), 2);
        assert_eq!(registry.formats.len(), 3);
    }

    #[test]
    fn paragraph_and_list_share_font() {
        let mut registry = StyleRegistry::new();
        registry.format_index(&Cell::new(2, 1, "a", CellStyle::Paragraph));
        registry.format_index(&Cell::new(3, 1, "b", CellStyle::ListItem));
        assert_eq!(registry.fonts.len(), 2);
        assert_eq!(registry.borders.len(), 2);
    }

    #[test]
    fn heading_palette() {
        assert_eq!(appearance(CellStyle::Heading(1)).font.size, 20.0);
        assert_eq!(appearance(CellStyle::Heading(6)).font.size, 12.0);
        assert!(appearance(CellStyle::Heading(5)).fill.is_none());
        assert_eq!(appearance(CellStyle::TableHeader).horizontal, Horizontal::Center);
        assert_eq!(appearance(CellStyle::Blockquote).border.unwrap().left.style, "thick");
    }

    #[test]
    fn render_styles_part() {
        let mut registry = StyleRegistry::new();
        let mut cell = Cell::new(2, 1, "x", CellStyle::TableCellShaded);
        cell.wrap = true;
        cell.vertical = VerticalAlign::Top;
        registry.format_index(&cell);
        let xml = String::from_utf8(registry.to_xml().unwrap().into_bytes()).unwrap();

        assert!(xml.contains("<fills count=\"3\">"));
        assert!(xml.contains("<patternFill patternType=\"gray125\"/>"));
        assert!(xml.contains("<fgColor rgb=\"FFF8FAFC\"/>"));
        assert!(xml.contains("<cellXfs count=\"2\">"));
        assert!(xml.contains("<alignment horizontal=\"left\" vertical=\"top\" wrapText=\"1\"/>"));
    }
}
