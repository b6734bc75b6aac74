//! Office Open XML (.xlsx) encoder for [`Workbook`]
//!
//! Produces the minimal package Excel accepts: content types, package and workbook
//! relationships, core properties, the workbook, one part per worksheet and the
//! shared stylesheet. Cells are written as inline strings.

use crate::error::RustyExcelError;
use crate::helpers::xml::needs_space_preserve;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlWriter;
use crate::helpers::zip::ZipHelper;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::sheet::Worksheet;
use crate::spreadsheet::style::StyleRegistry;
use crate::spreadsheet::Workbook;
use chrono::DateTime;
use chrono::Utc;
use quick_xml::events::BytesStart;
use std::io::Cursor;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use zip::ZipWriter;

// Namespaces and relationship types used by the package parts
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const NS_CORE_PROPERTIES: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
const REL_OFFICE_DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPERTIES: &str = "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_WORKSHEET: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const TYPE_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const TYPE_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const TYPE_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
const TYPE_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const TYPE_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Name written to the `dc:creator` core property.
const CREATOR: &str = "md2excel";

#[derive(Error, Debug)]
pub enum XlsxError {
    #[error("Workbook has no worksheet to write")]
    EmptyWorkbook,
}

/// Serializes a workbook to .xlsx bytes.
pub fn to_bytes(workbook: &Workbook) -> Result<Vec<u8>, RustyExcelError> {
    let cursor = write(workbook, Cursor::new(Vec::new()), Utc::now())?;
    Ok(cursor.into_inner())
}

/// Serializes a workbook to an .xlsx file, replacing any existing file.
pub fn save(workbook: &Workbook, path: &Path) -> Result<(), RustyExcelError> {
    let bytes = to_bytes(workbook)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Writes every package part into `output` and returns the finished sink.
///
/// # Arguments
/// * `workbook` - Workbook to serialize, must hold at least one worksheet
/// * `output` - Seekable sink receiving the ZIP container
/// * `created` - Timestamp recorded in the core properties
pub(crate) fn write<W: Write + Seek>(workbook: &Workbook, output: W, created: DateTime<Utc>) -> Result<W, RustyExcelError> {
    if workbook.is_empty() {
        Err(XlsxError::EmptyWorkbook)?
    }

    let mut zip = ZipWriter::new(output);
    let mut styles = StyleRegistry::new();

    zip.add_xml_part("[Content_Types].xml", content_types(workbook.len())?)?;
    zip.add_xml_part("_rels/.rels", package_relationships()?)?;
    zip.add_xml_part("docProps/core.xml", core_properties(created)?)?;
    zip.add_xml_part("xl/workbook.xml", workbook_part(workbook)?)?;
    zip.add_xml_part("xl/_rels/workbook.xml.rels", workbook_relationships(workbook.len())?)?;
    for (index, sheet) in workbook.worksheets().iter().enumerate() {
        let part = worksheet_part(sheet, index == 0, &mut styles)?;
        zip.add_xml_part(&format!("xl/worksheets/sheet{}.xml", index + 1), part)?;
    }
    zip.add_xml_part("xl/styles.xml", styles.to_xml()?)?;

    Ok(zip.finish()?)
}

fn content_types(sheet_count: usize) -> Result<XmlWriter, RustyExcelError> {
    let mut writer = XmlWriter::new()?;
    writer.start(BytesStart::new("Types").with_value("xmlns", NS_CONTENT_TYPES))?;
    writer.empty(BytesStart::new("Default").with_value("Extension", "rels").with_value("ContentType", TYPE_RELATIONSHIPS))?;
    writer.empty(BytesStart::new("Default").with_value("Extension", "xml").with_value("ContentType", "application/xml"))?;
    writer.empty(BytesStart::new("Override").with_value("PartName", "/xl/workbook.xml").with_value("ContentType", TYPE_WORKBOOK))?;
    for index in 1..=sheet_count {
        let part_name = format!("/xl/worksheets/sheet{index}.xml");
        writer.empty(BytesStart::new("Override").with_value("PartName", part_name).with_value("ContentType", TYPE_WORKSHEET))?;
    }
    writer.empty(BytesStart::new("Override").with_value("PartName", "/xl/styles.xml").with_value("ContentType", TYPE_STYLES))?;
    writer.empty(BytesStart::new("Override").with_value("PartName", "/docProps/core.xml").with_value("ContentType", TYPE_CORE_PROPERTIES))?;
    writer.end("Types")?;
    Ok(writer)
}

fn relationship(id: &str, kind: &str, target: &str) -> BytesStart<'static> {
    BytesStart::new("Relationship")
        .with_value("Id", id)
        .with_value("Type", kind)
        .with_value("Target", target)
}

fn package_relationships() -> Result<XmlWriter, RustyExcelError> {
    let mut writer = XmlWriter::new()?;
    writer.start(BytesStart::new("Relationships").with_value("xmlns", NS_PACKAGE_RELATIONSHIPS))?;
    writer.empty(relationship("rId1", REL_OFFICE_DOCUMENT, "xl/workbook.xml"))?;
    writer.empty(relationship("rId2", REL_CORE_PROPERTIES, "docProps/core.xml"))?;
    writer.end("Relationships")?;
    Ok(writer)
}

fn core_properties(created: DateTime<Utc>) -> Result<XmlWriter, RustyExcelError> {
    let timestamp = created.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let mut writer = XmlWriter::new()?;
    writer.start(BytesStart::new("cp:coreProperties").with_attributes([
        ("xmlns:cp", NS_CORE_PROPERTIES),
        ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
        ("xmlns:dcterms", "http://purl.org/dc/terms/"),
        ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ]))?;
    writer.text_element(BytesStart::new("dc:creator"), CREATOR)?;
    writer.text_element(BytesStart::new("dcterms:created").with_value("xsi:type", "dcterms:W3CDTF"), &timestamp)?;
    writer.text_element(BytesStart::new("dcterms:modified").with_value("xsi:type", "dcterms:W3CDTF"), &timestamp)?;
    writer.end("cp:coreProperties")?;
    Ok(writer)
}

fn workbook_part(workbook: &Workbook) -> Result<XmlWriter, RustyExcelError> {
    let mut writer = XmlWriter::new()?;
    writer.start(BytesStart::new("workbook").with_attributes([("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)]))?;
    writer.start(BytesStart::new("bookViews"))?;
    writer.empty(BytesStart::new("workbookView").with_value("activeTab", 0))?;
    writer.end("bookViews")?;
    writer.start(BytesStart::new("sheets"))?;
    for (index, sheet) in workbook.worksheets().iter().enumerate() {
        let element = BytesStart::new("sheet")
            .with_value("name", sheet.name())
            .with_value("sheetId", index + 1)
            .with_value("r:id", format!("rId{}", index + 1));
        writer.empty(element)?;
    }
    writer.end("sheets")?;
    writer.end("workbook")?;
    Ok(writer)
}

fn workbook_relationships(sheet_count: usize) -> Result<XmlWriter, RustyExcelError> {
    let mut writer = XmlWriter::new()?;
    writer.start(BytesStart::new("Relationships").with_value("xmlns", NS_PACKAGE_RELATIONSHIPS))?;
    for index in 1..=sheet_count {
        let target = format!("worksheets/sheet{index}.xml");
        writer.empty(relationship(&format!("rId{index}"), REL_WORKSHEET, &target))?;
    }
    writer.empty(relationship(&format!("rId{}", sheet_count + 1), REL_STYLES, "styles.xml"))?;
    writer.end("Relationships")?;
    Ok(writer)
}

/// Renders one worksheet, registering the formats of its cells in `styles`.
fn worksheet_part(sheet: &Worksheet, selected: bool, styles: &mut StyleRegistry) -> Result<XmlWriter, RustyExcelError> {
    let mut writer = XmlWriter::new()?;
    writer.start(BytesStart::new("worksheet").with_attributes([("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)]))?;

    let dimension = match (sheet.row_count(), sheet.max_col()) {
        (0, _) | (_, 0) => "A1".to_owned(),
        (rows, cols) => format!("A1:{}", index_to_reference(rows, cols)),
    };
    writer.empty(BytesStart::new("dimension").with_value("ref", dimension))?;

    writer.start(BytesStart::new("sheetViews"))?;
    writer.empty(BytesStart::new("sheetView")
        .with_optional_value("tabSelected", selected.then_some(1))
        .with_value("workbookViewId", 0))?;
    writer.end("sheetViews")?;

    writer.empty(BytesStart::new("sheetFormatPr")
        .with_value("defaultColWidth", sheet.default_column_width())
        .with_value("defaultRowHeight", sheet.default_row_height())
        .with_value("customHeight", 1))?;

    let widths: Vec<(usize, f64)> = sheet.column_widths().collect();
    if !widths.is_empty() {
        writer.start(BytesStart::new("cols"))?;
        for (col, width) in widths {
            writer.empty(BytesStart::new("col")
                .with_value("min", col)
                .with_value("max", col)
                .with_value("width", width)
                .with_value("customWidth", 1))?;
        }
        writer.end("cols")?;
    }

    writer.start(BytesStart::new("sheetData"))?;
    for row in sheet.rows() {
        let element = BytesStart::new("row")
            .with_value("r", row.index)
            .with_optional_value("ht", row.height)
            .with_optional_value("customHeight", row.height.map(|_| 1));
        if row.cells.is_empty() {
            writer.empty(element)?;
            continue;
        }
        writer.start(element)?;
        for cell in &row.cells {
            let element = BytesStart::new("c")
                .with_value("r", cell.reference())
                .with_value("s", styles.format_index(cell));
            if cell.is_empty() {
                writer.empty(element)?;
                continue;
            }
            writer.start(element.with_value("t", "inlineStr"))?;
            writer.start(BytesStart::new("is"))?;
            let text = BytesStart::new("t");
            let text = match needs_space_preserve(&cell.value) {
                true => text.with_value("xml:space", "preserve"),
                false => text,
            };
            writer.text_element(text, &cell.value)?;
            writer.end("is")?;
            writer.end("c")?;
        }
        writer.end("row")?;
    }
    writer.end("sheetData")?;

    if !sheet.merges().is_empty() {
        writer.start(BytesStart::new("mergeCells").with_value("count", sheet.merges().len()))?;
        for range in sheet.merges() {
            writer.empty(BytesStart::new("mergeCell").with_value("ref", range))?;
        }
        writer.end("mergeCells")?;
    }

    writer.empty(BytesStart::new("pageMargins")
        .with_value("left", 0.7)
        .with_value("right", 0.7)
        .with_value("top", 0.75)
        .with_value("bottom", 0.75)
        .with_value("header", 0.3)
        .with_value("footer", 0.3))?;

    writer.end("worksheet")?;
    Ok(writer)
}
