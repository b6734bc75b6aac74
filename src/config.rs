//! Conversion settings.
//!
//! Keys are camelCase so configuration files shared with other Markdown-to-Excel
//! tooling load unchanged. Every field has a default, so partial files are fine.

use crate::error::RustyExcelError;
use serde::Deserialize;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Smallest truncation limit that still leaves room for one character and the ellipsis.
pub const MIN_CELL_LENGTH: usize = 4;

/// Largest number of characters an Excel cell accepts.
pub const MAX_CELL_LENGTH: usize = 32_767;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Unsupported config file format: '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("maxCellLength must be at least 4, got {0}")]
    CellLengthTooSmall(usize),

    #[error("maxCellLength must be at most 32767, got {0}")]
    CellLengthTooLarge(usize),

    #[error("Worksheet name must not be empty")]
    EmptyWorksheetName,

    #[error("Table sheet prefix must not be empty")]
    EmptyTableSheetPrefix,
}

/// Top-level configuration of a conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExcelConfig {
    /// Output directory used when no explicit output path is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Output file stem used when no explicit output path is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub worksheet: WorksheetConfig,
    pub content_mapping: ContentMappingConfig,
    pub column_widths: ColumnWidthsConfig,
    pub table_handling: TableHandlingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorksheetConfig {
    /// Name of the primary worksheet
    pub name: String,
}

impl Default for WorksheetConfig {
    fn default() -> Self {
        WorksheetConfig { name: "Content".to_owned() }
    }
}

/// Which columns non-table rows fill when no table widens the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentMappingConfig {
    pub include_type: bool,
    pub include_level: bool,
    pub include_content: bool,
    /// Longer content is cut to this many characters, ellipsis included
    pub max_cell_length: usize,
}

impl Default for ContentMappingConfig {
    fn default() -> Self {
        ContentMappingConfig {
            include_type: false,
            include_level: false,
            include_content: true,
            max_cell_length: MAX_CELL_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnWidthsConfig {
    pub default: f64,
    #[serde(rename = "type")]
    pub kind: f64,
    pub level: f64,
    pub content: f64,
}

impl Default for ColumnWidthsConfig {
    fn default() -> Self {
        ColumnWidthsConfig {
            default: 14.0,
            kind: 25.0,
            level: 10.0,
            content: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableHandlingConfig {
    /// Render every table on its own worksheet
    pub separate_table_sheets: bool,
    /// Name prefix of table worksheets, followed by the table number
    pub table_sheet_prefix: String,
    /// Leave a reference row in the primary worksheet for each separated table
    pub preserve_original_tables: bool,
}

impl Default for TableHandlingConfig {
    fn default() -> Self {
        TableHandlingConfig {
            separate_table_sheets: false,
            table_sheet_prefix: "Table_".to_owned(),
            preserve_original_tables: true,
        }
    }
}

/// Serialization format picked from a file extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<ConfigFormat, ConfigError> {
        let extension = path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl ExcelConfig {
    /// Loads and validates a YAML or JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ExcelConfig, RustyExcelError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        let config: ExcelConfig = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
            ConfigFormat::Json => serde_json::from_str(&content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as YAML or JSON, creating missing parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RustyExcelError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = match format {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Checks the settings the converter relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_mapping.max_cell_length < MIN_CELL_LENGTH {
            Err(ConfigError::CellLengthTooSmall(self.content_mapping.max_cell_length))?
        }
        if self.content_mapping.max_cell_length > MAX_CELL_LENGTH {
            Err(ConfigError::CellLengthTooLarge(self.content_mapping.max_cell_length))?
        }
        if self.worksheet.name.trim().is_empty() {
            Err(ConfigError::EmptyWorksheetName)?
        }
        if self.table_handling.table_sheet_prefix.trim().is_empty() {
            Err(ConfigError::EmptyTableSheetPrefix)?
        }
        Ok(())
    }
}
