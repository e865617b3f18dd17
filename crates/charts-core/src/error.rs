use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the tutor-charts crates.
///
/// The normalization and aggregation primitives themselves never fail:
/// unparsable cell values become `None` and empty scopes become empty chart
/// data. These variants cover the boundaries around the core — file I/O,
/// malformed workbook documents, configuration, and scope selection.
#[derive(Error, Debug)]
pub enum ChartsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A workbook or config JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The requested sheet name does not exist in the workbook.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// The sheet (or workbook) does not resolve the required tutoring
    /// columns and must be skipped by the caller.
    #[error("Not a tutoring data sheet: {0}")]
    NotDomainData(String),

    /// No workbook documents were found under the given directory.
    #[error("No workbook files found in {0}")]
    NoWorkbooks(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the tutor-charts crates.
pub type Result<T> = std::result::Result<T, ChartsError>;
