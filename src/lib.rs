//! # Markdown to Excel Converter
//!
//! Converts Markdown and HTML documents into structured `.xlsx` workbooks.
//!
//! ## Features
//!
//! - **Block mapping**: every heading, paragraph, list item, code block and blockquote
//!   becomes one worksheet row; every table row becomes one worksheet row
//! - **Table-aware layout**: content rows are merged across the widest table of the
//!   document, so text and tables line up
//! - **Size heuristics**: column widths and row heights follow the content, with CJK
//!   characters counted double
//! - **Fallback columns**: documents without tables can list block type and level
//!   next to the content
//! - **Separate table sheets**: tables can be moved to their own worksheets
//! - **Pure Rust output**: workbooks are written as OOXML without external tools
//!
//! ## Example
//!
//! ```no_run
//! use rusty_md2excel::convert_markdown;
//! use rusty_md2excel::config::ExcelConfig;
//!
//! let workbook = convert_markdown("# Title\n\n| A | B |\n|---|---|\n| 1 | 2 |\n", &ExcelConfig::default())?;
//! workbook.save("title.xlsx")?;
//! # Ok::<(), rusty_md2excel::error::RustyExcelError>(())
//! ```

pub mod batch;
pub mod config;
pub mod converter;
pub mod error;
mod helpers;
pub mod markdown;
pub mod spreadsheet;

pub use crate::batch::convert_batch;
pub use crate::batch::convert_file;
pub use crate::spreadsheet::Workbook;

use crate::config::ExcelConfig;
use crate::error::RustyExcelError;
use scraper::Html;

/// Converts an HTML document or fragment into a workbook.
pub fn convert_html(html: &str, config: &ExcelConfig) -> Result<Workbook, RustyExcelError> {
    let document = Html::parse_document(html);
    converter::convert(&document, config)
}

/// Renders Markdown to HTML and converts the result into a workbook.
pub fn convert_markdown(markdown: &str, config: &ExcelConfig) -> Result<Workbook, RustyExcelError> {
    convert_html(&markdown::to_html(markdown), config)
}
