use thiserror::Error;

/// Main error type for the Markdown to Excel converter.
/// Aggregates errors from various sources including standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum RustyExcelError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Third-party library errors
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    YamlError(#[from] serde_yaml::Error),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    RangeError(#[from] crate::spreadsheet::range::RangeError),

    #[error("{0}")]
    XlsxError(#[from] crate::spreadsheet::xlsx::XlsxError),

    // Converter, configuration and batch errors
    #[error("{0}")]
    ConvertError(#[from] crate::converter::ConvertError),

    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),

    #[error("{0}")]
    BatchError(#[from] crate::batch::BatchError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyExcelError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyExcelError::WithContextError(format!("{}: {}", message, e)))
    }
}
