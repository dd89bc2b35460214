use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the loan dashboard.
///
/// Only structural problems live here. A malformed cell is never an error:
/// it degrades to a missing value on that one record.
#[derive(Error, Debug)]
pub enum LoanError {
    /// The source file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source file does not exist.
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),

    /// The file extension does not map to a supported tabular format.
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(PathBuf),

    /// A CSV document could not be parsed.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A workbook could not be opened or decoded.
    #[error("Failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// The requested worksheet is not present in the workbook.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// The source has no header row.
    #[error("Source has no header row: {0}")]
    EmptySource(PathBuf),

    /// A required column is absent from the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the loan crates.
pub type Result<T> = std::result::Result<T, LoanError>;
