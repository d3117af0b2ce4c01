//! Order extract ingestion.
//!
//! This crate reads sales-order extracts into Polars DataFrames with the
//! canonical order schema.
//!
//! # Features
//!
//! - **Single file import**: xlsx, csv or parquet, renamed and validated
//! - **Batch import**: every file in a folder matching a name prefix
//! - **Area lookup**: `dedalo_area → launch_type` table used during cleaning
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use npi_ingest::{import_orders, read_area_lookup};
//!
//! let orders = import_orders(Path::new("data/input"), "Comp_Analysis", true)?
//!     .into_single(Path::new("data/input"), "Comp_Analysis")?;
//! let areas = read_area_lookup(Path::new("data/Aree.xlsx"), "AREA_EXPORT_DEDALO")?;
//! ```

mod discovery;
mod error;
mod lookup;
mod reader;
mod xlsx;

// === Error Types ===
pub use error::{IngestError, Result};

// === Reading ===
pub use reader::{import_order_file, read_table};

// === Folder Discovery ===
pub use discovery::{ImportedOrders, import_orders, list_order_files};

// === Lookup ===
pub use lookup::read_area_lookup;
