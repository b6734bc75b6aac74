//! ZIP archive helper utilities for the Excel (.xlsx) container
//! Provides convenient methods for adding parts to a ZIP archive

use crate::error::RustyExcelError;
use crate::helpers::xml::XmlWriter;
use std::io::Seek;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

/// Helper trait for ZIP archive operations with OOXML part writers
pub(crate) trait ZipHelper {
    /// Adds a file with raw content to the archive (path separator normalized to `/`)
    fn add_part(&mut self, name: &str, content: &[u8]) -> Result<(), RustyExcelError>;

    /// Adds a serialized XML part to the archive
    fn add_xml_part(&mut self, name: &str, writer: XmlWriter) -> Result<(), RustyExcelError>;
}

impl<W: Write + Seek> ZipHelper for ZipWriter<W> {
    /// Adds a file with raw content to the archive, deflate-compressed
    fn add_part(&mut self, name: &str, content: &[u8]) -> Result<(), RustyExcelError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.start_file(name.replace('\\', "/"), options)?;
        self.write_all(content)?;
        Ok(())
    }

    /// Adds a serialized XML part to the archive
    fn add_xml_part(&mut self, name: &str, writer: XmlWriter) -> Result<(), RustyExcelError> {
        self.add_part(name, &writer.into_bytes())
    }
}
