//! Error types for cleaning and shaping.

use npi_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Joining the area lookup changed the number of rows.
    #[error("area lookup join changed the row count from {before} to {after}")]
    MergeCardinality { before: usize, after: usize },

    /// A stage input column is absent.
    #[error("stage '{stage}' requires column '{column}'")]
    MissingColumn { stage: &'static str, column: String },

    /// The release does not start with a four-digit year.
    #[error("release {release:?} does not start with a four-digit year")]
    InvalidRelease { release: Option<String> },

    /// A year-week value is null or out of range.
    #[error("invalid year-week {value:?} in column '{column}'")]
    InvalidYearWeek { column: String, value: Option<i64> },

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
