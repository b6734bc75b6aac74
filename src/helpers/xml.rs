//! XML writing utilities for Office Open XML (OOXML) parts
//! Provides an XML writer wrapper and helper traits for attribute and text emission

use crate::error::RustyExcelError;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Writer;
use std::borrow::Cow;
use std::fmt::Display;

/// XML writer wrapper producing one in-memory OOXML part
pub(crate) struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Creates a new XML writer and emits the standalone UTF-8 declaration
    pub(crate) fn new() -> Result<XmlWriter, RustyExcelError> {
        let mut writer = Writer::new(Vec::with_capacity(4096));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(XmlWriter { writer })
    }

    /// Opens an element
    pub(crate) fn start(&mut self, element: BytesStart<'_>) -> Result<(), RustyExcelError> {
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    /// Closes an element
    pub(crate) fn end(&mut self, name: &str) -> Result<(), RustyExcelError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Writes a self-closing element
    pub(crate) fn empty(&mut self, element: BytesStart<'_>) -> Result<(), RustyExcelError> {
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    /// Writes escaped text content
    pub(crate) fn text(&mut self, text: &str) -> Result<(), RustyExcelError> {
        let text = strip_invalid_xml_chars(text);
        self.writer.write_event(Event::Text(BytesText::new(&text)))?;
        Ok(())
    }

    /// Writes `<name attributes...>text</name>`
    pub(crate) fn text_element(&mut self, element: BytesStart<'_>, text: &str) -> Result<(), RustyExcelError> {
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        self.start(element)?;
        self.text(text)?;
        self.end(&name)
    }

    /// Consumes the writer and returns the serialized part
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// Helper trait for building XML start tags with non-string attribute values
pub(crate) trait XmlNodeHelper {
    /// Appends an attribute whose value is rendered with `Display`
    fn with_value<T: Display>(self, key: &str, value: T) -> Self;

    /// Appends an attribute only when the value is present
    fn with_optional_value<T: Display>(self, key: &str, value: Option<T>) -> Self;
}

impl XmlNodeHelper for BytesStart<'_> {
    /// Appends an attribute whose value is rendered with `Display`
    fn with_value<T: Display>(mut self, key: &str, value: T) -> Self {
        self.push_attribute((key, value.to_string().as_str()));
        self
    }

    /// Appends an attribute only when the value is present
    fn with_optional_value<T: Display>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with_value(key, value),
            None => self,
        }
    }
}

/// Removes characters that XML 1.0 forbids (C0 controls other than tab, LF and CR).
pub(crate) fn strip_invalid_xml_chars(text: &str) -> Cow<'_, str> {
    let is_invalid = |character: char| character < ' ' && !matches!(character, '\t' | '\n' | '\r');
    if text.chars().any(is_invalid) {
        Cow::Owned(text.chars().filter(|character| !is_invalid(*character)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Checks whether a text needs `xml:space="preserve"` to survive a round trip.
pub(crate) fn needs_space_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) || text.contains('\n')
}
