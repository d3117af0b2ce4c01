//! Error types for order extract ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during data ingestion operations.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source folder missing or not a directory.
    #[error("folder not found: {path}")]
    FolderNotFound { path: PathBuf },

    /// Source file missing.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension is not one of xlsx, csv, parquet.
    #[error("unsupported file format {path} (expected .xlsx, .csv or .parquet)")]
    UnsupportedFormat { path: PathBuf },

    /// No file in the folder matched the prefix and extension filter.
    #[error("no input files starting with '{prefix}' in {path}")]
    NoInputFiles { path: PathBuf, prefix: String },

    // === Parsing Errors ===
    /// Failed to parse a CSV file.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to parse a parquet file.
    #[error("failed to parse parquet {path}: {message}")]
    ParquetParse { path: PathBuf, message: String },

    /// Failed to open or read a workbook.
    #[error("failed to read workbook {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// Requested worksheet does not exist.
    #[error("worksheet '{sheet}' not found in {path}")]
    MissingSheet { path: PathBuf, sheet: String },

    /// File has no header row.
    #[error("file is empty: {path}")]
    EmptyFile { path: PathBuf },

    // === Schema Errors ===
    /// Renamed columns differ from the canonical order schema.
    #[error(
        "columns of {path} do not match the order schema (missing: [{}], unexpected: [{}])",
        missing.join(", "),
        unexpected.join(", ")
    )]
    SchemaMismatch {
        path: PathBuf,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// A column could not be converted to its canonical type.
    #[error("column '{column}' in {path} has invalid values: {message}")]
    ColumnType {
        path: PathBuf,
        column: String,
        message: String,
    },

    // === Lookup Errors ===
    /// The lookup table lists the same area twice.
    #[error("area '{area}' appears more than once in {path}")]
    DuplicateLookupKey { path: PathBuf, area: String },

    /// The lookup table does not have the expected two columns.
    #[error("unexpected lookup format in {path}: {reason}")]
    LookupFormat { path: PathBuf, reason: String },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_display() {
        let err = IngestError::SchemaMismatch {
            path: PathBuf::from("orders.csv"),
            missing: vec!["qty".to_string()],
            unexpected: vec!["Quantity".to_string(), "Extra".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "columns of orders.csv do not match the order schema \
             (missing: [qty], unexpected: [Quantity, Extra])"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
