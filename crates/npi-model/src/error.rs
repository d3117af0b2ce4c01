use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown outlier method '{tag}' (expected one of: iqr, mad, iso, svm)")]
    UnknownOutlierMethod { tag: String },

    #[error("invalid year-week value {value}")]
    InvalidYearWeek { value: i64 },

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
