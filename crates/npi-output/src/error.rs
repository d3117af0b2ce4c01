//! Error types for writing the shaped table.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting a table.
#[derive(Debug, Error)]
pub enum OutputError {
    // === File System Errors ===
    /// Extension is not one of xlsx, csv, parquet.
    #[error("unsupported output format {path} (expected .xlsx, .csv or .parquet)")]
    UnsupportedFormat { path: PathBuf },

    /// Failed to create the output directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the output file.
    #[error("failed to create {path}: {source}")]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// Workbook could not be built or saved.
    #[error("failed to write workbook {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// Failed DataFrame operation, including csv and parquet serialization.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for OutputError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
