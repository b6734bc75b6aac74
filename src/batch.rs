//! Conversion of Markdown and HTML files on disk, one at a time or by glob pattern.

use crate::config::ExcelConfig;
use crate::convert_html;
use crate::convert_markdown;
use crate::error::ResultMessage;
use crate::error::RustyExcelError;
use crate::helpers::reader::read_text;
use glob::glob;
use log::info;
use log::warn;
use std::ffi::OsStr;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Output directory of batch conversions when neither caller nor config names one.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

#[derive(Error, Debug, PartialEq)]
pub enum BatchError {
    #[error("Input file not found: '{0}'")]
    InputNotFound(String),

    #[error("Input is not a file: '{0}'")]
    NotAFile(String),

    #[error("Unsupported input file: '{0}' (expected .md, .markdown, .html or .htm)")]
    UnsupportedInput(String),

    #[error("No files found matching pattern: '{0}'")]
    NoFilesMatched(String),
}

/// Source format picked from a file extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SourceFormat {
    Markdown,
    Html,
}

impl SourceFormat {
    fn from_path(path: &Path) -> Result<SourceFormat, BatchError> {
        if !path.exists() {
            Err(BatchError::InputNotFound(path.display().to_string()))?
        }
        if !path.is_file() {
            Err(BatchError::NotAFile(path.display().to_string()))?
        }
        let extension = path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "md" | "markdown" => Ok(SourceFormat::Markdown),
            "html" | "htm" => Ok(SourceFormat::Html),
            _ => Err(BatchError::UnsupportedInput(path.display().to_string())),
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "converted".to_owned())
}

/// Decides where a converted file goes.
///
/// An explicit output path wins. Otherwise the file is named after `config.filename`
/// or the input's stem, and placed in `config.output_path` or next to the input.
pub(crate) fn resolve_output_path(input: &Path, output: Option<&Path>, config: &ExcelConfig) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }
    let stem = config.filename.clone().unwrap_or_else(|| file_stem(input));
    let directory = config.output_path
        .clone()
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    directory.join(format!("{stem}.xlsx"))
}

/// Converts one Markdown or HTML file to an .xlsx workbook.
///
/// # Arguments
/// * `input` - Source file, `.md`/`.markdown` or `.html`/`.htm`
/// * `output` - Target path; see [`resolve_output_path`] when absent
/// * `config` - Conversion settings
///
/// # Returns
/// The path of the written workbook
pub fn convert_file(input: &Path, output: Option<&Path>, config: &ExcelConfig) -> Result<PathBuf, RustyExcelError> {
    let format = SourceFormat::from_path(input)?;
    let text = read_text(input).with_prefix(&format!("failed to read '{}'", input.display()))?;
    let workbook = match format {
        SourceFormat::Markdown => convert_markdown(&text, config),
        SourceFormat::Html => convert_html(&text, config),
    }.with_prefix(&format!("failed to convert '{}'", input.display()))?;

    let output = resolve_output_path(input, output, config);
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    workbook.save(&output).with_prefix(&format!("failed to write '{}'", output.display()))?;
    info!("Converted '{}' to '{}'", input.display(), output.display());
    Ok(output)
}

/// Result of converting one file in a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Converted { input: PathBuf, output: PathBuf },
    Failed { input: PathBuf, error: String },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Converted { input, .. } | FileOutcome::Failed { input, .. } => input,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, FileOutcome::Converted { .. })
    }
}

impl Display for FileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOutcome::Converted { input, output } => write!(f, "{} -> {}", input.display(), output.display()),
            FileOutcome::Failed { input, error } => write!(f, "{} - {}", input.display(), error),
        }
    }
}

/// Per-file results of a batch conversion, in match order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_converted()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.converted()
    }
}

/// Converts every file matching a glob pattern into `<output_dir>/<stem>.xlsx`.
///
/// A failing file is recorded in the report and does not stop the batch.
///
/// # Arguments
/// * `pattern` - Glob pattern; directories among the matches are skipped
/// * `output_dir` - Target directory, falling back to `config.output_path`, then `./output`
/// * `config` - Conversion settings shared by every file
pub fn convert_batch(pattern: &str, output_dir: Option<&Path>, config: &ExcelConfig) -> Result<BatchReport, RustyExcelError> {
    let mut files = Vec::new();
    for entry in glob(pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(error) => warn!("Skipping unreadable path: {}", error),
        }
    }
    if files.is_empty() {
        Err(BatchError::NoFilesMatched(pattern.to_owned()))?
    }

    let output_dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| config.output_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    fs::create_dir_all(&output_dir)?;
    let total = files.len();
    info!("Found {} files to convert", total);

    let mut report = BatchReport::default();
    for (index, input) in files.into_iter().enumerate() {
        info!("Converting file {}/{}: {}", index + 1, total, input.display());
        let output = output_dir.join(format!("{}.xlsx", file_stem(&input)));
        match convert_file(&input, Some(&output), config) {
            Ok(output) => report.outcomes.push(FileOutcome::Converted { input, output }),
            Err(error) => {
                warn!("Failed to convert '{}': {}", input.display(), error);
                report.outcomes.push(FileOutcome::Failed { input, error: error.to_string() });
            }
        }
    }
    info!("Batch conversion completed: {}/{} files converted successfully", report.converted(), report.total());
    Ok(report)
}
