//! Shared model types for the NPI release comparability pipeline.
//!
//! - **schema**: canonical column names and the source header map
//! - **format**: tabular file formats selected by extension
//! - **calendar**: `YYYYWW` year-week conversions
//! - **options**: cleaning, shaping and outlier detection options
//! - **config**: file-based pipeline configuration

pub mod calendar;
pub mod config;
pub mod error;
pub mod format;
pub mod options;
pub mod schema;

pub use calendar::{release_year, sunday_of_yearweek, yearweek_of_date};
pub use config::{AreaLookupConfig, InputConfig, OutputConfig, PipelineConfig};
pub use error::{ModelError, Result};
pub use format::TableFormat;
pub use options::{CleaningOptions, OutlierMethod, OutlierOptions, ShapingOptions};
