//! Area code → launch type lookup table.

use std::collections::HashSet;
use std::path::Path;

use npi_model::TableFormat;
use npi_model::schema::{columns, lookup};
use polars::prelude::*;
use tracing::info;

use crate::error::{IngestError, Result};
use crate::xlsx::read_sheet_rows;

/// Read the two-column lookup `dedalo_area → launch_type`.
///
/// Workbooks are read from `sheet`, columns B:C; CSV files from their first
/// two columns. Rows without an area code are skipped.
pub fn read_area_lookup(path: &Path, sheet: &str) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let pairs = match TableFormat::from_path(path) {
        Some(TableFormat::Spreadsheet) => spreadsheet_pairs(path, sheet)?,
        Some(TableFormat::Delimited) => csv_pairs(path)?,
        _ => {
            return Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    let mut seen = HashSet::with_capacity(pairs.len());
    let mut areas = Vec::with_capacity(pairs.len());
    let mut launch_types = Vec::with_capacity(pairs.len());
    for (area, launch_type) in pairs {
        if !seen.insert(area.clone()) {
            return Err(IngestError::DuplicateLookupKey {
                path: path.to_path_buf(),
                area,
            });
        }
        areas.push(area);
        launch_types.push(launch_type);
    }

    info!(path = %path.display(), entries = areas.len(), "area lookup loaded");
    Ok(DataFrame::new(vec![
        Series::new(columns::DEDALO_AREA.into(), areas).into_column(),
        Series::new(lookup::LAUNCH_TYPE.into(), launch_types).into_column(),
    ])?)
}

fn spreadsheet_pairs(path: &Path, sheet: &str) -> Result<Vec<(String, Option<String>)>> {
    // Columns B and C.
    const AREA_COLUMN: usize = 1;
    const LAUNCH_COLUMN: usize = 2;

    let rows = read_sheet_rows(path, Some(sheet))?;
    if rows.first_column > AREA_COLUMN {
        return Err(IngestError::LookupFormat {
            path: path.to_path_buf(),
            reason: "expected area and launch type in columns B and C".to_string(),
        });
    }
    Ok((1..rows.rows.len())
        .filter_map(|row| {
            let area = rows.cell(row, AREA_COLUMN)?.to_string();
            let launch_type = rows.cell(row, LAUNCH_COLUMN).map(str::to_string);
            Some((area, launch_type))
        })
        .collect())
}

fn csv_pairs(path: &Path) -> Result<Vec<(String, Option<String>)>> {
    let csv_error = |e: csv::Error| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    if reader.headers().map_err(csv_error)?.len() < 2 {
        return Err(IngestError::LookupFormat {
            path: path.to_path_buf(),
            reason: "expected at least two columns".to_string(),
        });
    }

    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let Some(area) = non_blank(record.get(0)) else {
            continue;
        };
        pairs.push((area, non_blank(record.get(1))));
    }
    Ok(pairs)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
