use crate::error::RustyExcelError;
use encoding_rs::Encoding;
use encoding_rs::UTF_8;
use log::warn;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

/// Reads a whole text document, honouring a UTF-8 or UTF-16 byte order mark.
///
/// # Arguments
/// * `path` - Path to the Markdown or HTML source
///
/// # Returns
/// * `Result<String, RustyExcelError>` - Decoded text; malformed sequences become U+FFFD
pub(crate) fn read_text(path: &Path) -> Result<String, RustyExcelError> {
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
    let (text, encoding, had_errors) = decode(&bytes);
    if had_errors {
        warn!("'{}' is not valid {}, malformed bytes were replaced", path.display(), encoding.name());
    }
    Ok(text)
}

/// Decodes bytes sniffed by BOM, defaulting to UTF-8 without one.
///
/// # Returns
/// The decoded text, the encoding used and whether replacement characters were inserted
pub(crate) fn decode(bytes: &[u8]) -> (String, &'static Encoding, bool) {
    let (encoding, bom_length) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
    (text.into_owned(), encoding, had_errors)
}

#[cfg(test)]
mod tests {
    use crate::helpers::reader::*;
    use encoding_rs::UTF_16LE;
    use std::io::Write;

    #[test]
    fn decode_plain_utf8() {
        let (text, encoding, had_errors) = decode("# 标题".as_bytes());
        assert_eq!(text, "# 标题");
        assert_eq!(encoding, UTF_8);
        assert!(!had_errors);
    }

    #[test]
    fn decode_with_bom() {
        let (text, encoding, _) = decode(b"\xEF\xBB\xBF<p>x</p>");
        assert_eq!(text, "<p>x</p>");
        assert_eq!(encoding, UTF_8);

        let (text, encoding, _) = decode(b"\xFF\xFEh\x00i\x00");
        assert_eq!(text, "hi");
        assert_eq!(encoding, UTF_16LE);
    }

    #[test]
    fn replace_malformed_bytes() {
        let (text, _, had_errors) = decode(b"a\xFFb");
        assert_eq!(text, "a\u{FFFD}b");
        assert!(had_errors);
    }

    #[test]
    fn read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\xEF\xBB\xBF# Title\n").unwrap();
        assert_eq!(read_text(file.path()).unwrap(), "# Title\n");
    }
}
