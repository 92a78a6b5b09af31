use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failures that stop a run or a single file.
///
/// Conditions the analysis is expected to meet in the wild (unparseable
/// phones, unknown contact layouts, unmapped occurrence codes) are not errors;
/// they travel as diagnostics next to the results.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the run summary cannot be serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Raised when a delimited contact file cannot be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a file discovery pattern is malformed.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Raised when a directory holds no file matching the expected patterns.
    #[error("no file matching {patterns:?} found in {dir}")]
    NoMatchingFiles { dir: PathBuf, patterns: Vec<String> },

    /// Raised when a workbook does not have the expected shape.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a shared input table lacks a column the analysis needs.
    #[error("{table} has none of the columns {candidates:?}")]
    MissingColumn {
        table: String,
        candidates: Vec<String>,
    },

    /// Raised when the user provides a path that does not exist.
    #[error("input path not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    pub(crate) fn missing_column(table: &str, candidates: &[&str]) -> Self {
        ToolError::MissingColumn {
            table: table.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        }
    }
}
