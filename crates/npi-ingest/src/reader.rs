//! Reading one order extract into the canonical order table.
//!
//! Every source is first read with all columns as strings, so customer and
//! area codes keep their leading zeros. Headers are then renamed through the
//! source header map, checked against the canonical schema and cast.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

use npi_model::TableFormat;
use npi_model::schema::{CANONICAL_COLUMNS, canonical_name, is_integer_column};
use polars::prelude::*;
use tracing::{debug, info, info_span};

use crate::error::{IngestError, Result};
use crate::xlsx::read_xlsx_table;

/// Read a tabular file as-is, dispatching on its extension.
///
/// CSV and xlsx columns are all strings; parquet keeps its stored types.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let format = TableFormat::from_path(path).ok_or_else(|| IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    match format {
        TableFormat::Spreadsheet => read_xlsx_table(path),
        TableFormat::Delimited => read_csv_as_strings(path),
        TableFormat::Columnar => read_parquet(path),
    }
}

/// Import one order extract: read, rename, validate and cast.
///
/// The result has exactly the canonical columns, in canonical order.
pub fn import_order_file(path: &Path) -> Result<DataFrame> {
    let span = info_span!("import_order_file", path = %path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let mut raw = read_table(path)?;
    debug!(rows = raw.height(), columns = raw.width(), "read raw table");

    let names = canonical_headers(&raw);
    validate_schema(&names, path)?;
    raw.set_column_names(names)?;
    let table = normalize_types(raw, path)?;

    info!(
        rows = table.height(),
        duration_ms = start.elapsed().as_millis(),
        "order file imported"
    );
    Ok(table)
}

fn read_csv_as_strings(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn read_parquet(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| IngestError::ParquetParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    ParquetReader::new(file)
        .finish()
        .map_err(|e| IngestError::ParquetParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Trim headers and map known source headers to canonical names.
/// Unknown headers are kept so validation can report them.
fn canonical_headers(df: &DataFrame) -> Vec<String> {
    df.get_column_names_str()
        .into_iter()
        .map(|name| {
            let trimmed = name.trim();
            canonical_name(trimmed)
                .map(str::to_string)
                .unwrap_or_else(|| trimmed.to_string())
        })
        .collect()
}

/// Column set must equal the canonical set exactly.
///
/// A header that maps onto a name already seen counts as unexpected.
fn validate_schema(names: &[String], path: &Path) -> Result<()> {
    let expected: BTreeSet<&str> = CANONICAL_COLUMNS.iter().copied().collect();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut unexpected: Vec<String> = Vec::new();
    for name in names {
        if !seen.insert(name.as_str()) || !expected.contains(name.as_str()) {
            unexpected.push(name.clone());
        }
    }
    let missing: Vec<String> = CANONICAL_COLUMNS
        .iter()
        .filter(|name| !seen.contains(*name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }
    Err(IngestError::SchemaMismatch {
        path: path.to_path_buf(),
        missing,
        unexpected,
    })
}

/// Cast integer columns to `Int64`, everything else to `String`, and select
/// canonical order.
fn normalize_types(df: DataFrame, path: &Path) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(CANONICAL_COLUMNS.len());
    for name in CANONICAL_COLUMNS {
        let column = df.column(name)?;
        let converted = if is_integer_column(name) {
            to_integer(column)
        } else {
            to_text(column)
        };
        columns.push(converted.map_err(|e| IngestError::ColumnType {
            path: path.to_path_buf(),
            column: name.to_string(),
            message: e.to_string(),
        })?);
    }
    Ok(DataFrame::new(columns)?)
}

fn to_integer(column: &Column) -> PolarsResult<Column> {
    match column.dtype() {
        DataType::Int64 => Ok(column.clone()),
        DataType::String => {
            // Spreadsheet exports may render integers as "12.0".
            let cleaned: StringChunked = column
                .str()?
                .into_iter()
                .map(|value| value.map(str::trim).filter(|text| !text.is_empty()))
                .collect();
            let numbers = cleaned
                .with_name(column.name().clone())
                .into_series()
                .strict_cast(&DataType::Float64)?;
            reject_fractions(numbers.f64()?)?;
            numbers.strict_cast(&DataType::Int64).map(Series::into_column)
        }
        DataType::Float32 | DataType::Float64 => {
            let numbers = column.cast(&DataType::Float64)?;
            reject_fractions(numbers.f64()?)?;
            numbers.strict_cast(&DataType::Int64)
        }
        _ => column.strict_cast(&DataType::Int64),
    }
}

fn reject_fractions(values: &Float64Chunked) -> PolarsResult<()> {
    match values.into_iter().flatten().find(|value| value.fract() != 0.0) {
        Some(value) => Err(PolarsError::ComputeError(
            format!("value {value} is not a whole number").into(),
        )),
        None => Ok(()),
    }
}

fn to_text(column: &Column) -> PolarsResult<Column> {
    match column.dtype() {
        DataType::String => Ok(column.clone()),
        _ => column.cast(&DataType::String),
    }
}
