//! Persistence of the shaped order table.
//!
//! The output format follows the file extension:
//!
//! - **xlsx**: one worksheet, header row, typed cells (read by the dashboard)
//! - **csv**: comma separated with a header
//! - **parquet**: polars columnar writer

mod error;
mod writer;
mod xlsx;

pub use error::{OutputError, Result};
pub use writer::write_table;
