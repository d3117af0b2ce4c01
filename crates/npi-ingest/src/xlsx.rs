//! Workbook reading through calamine.
//!
//! Cells come back as optional strings: empty cells are `None`, integral
//! floats lose their `.0` so codes such as `202001` survive as text.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, XlsxError, open_workbook};
use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Used cells of one worksheet, header row included.
#[derive(Debug)]
pub(crate) struct SheetRows {
    /// Zero-based worksheet column of the first cell in each row.
    pub first_column: usize,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SheetRows {
    /// Cell text at a zero-based worksheet column (`0` is column A).
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        let offset = column.checked_sub(self.first_column)?;
        self.rows.get(row)?.get(offset)?.as_deref()
    }
}

/// Read every used row of a worksheet. `None` selects the first sheet.
pub(crate) fn read_sheet_rows(path: &Path, sheet: Option<&str>) -> Result<SheetRows> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|error: XlsxError| spreadsheet_error(path, &error))?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|sheet| sheet == name) {
                return Err(IngestError::MissingSheet {
                    path: path.to_path_buf(),
                    sheet: name.to_string(),
                });
            }
            workbook
                .worksheet_range(name)
                .map_err(|error| spreadsheet_error(path, &error))?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| IngestError::EmptyFile {
                path: path.to_path_buf(),
            })?
            .map_err(|error| spreadsheet_error(path, &error))?,
    };

    let first_column = range.start().map_or(0, |(_, column)| column as usize);
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok(SheetRows { first_column, rows })
}

/// Read the first worksheet of a workbook into a string-typed frame.
pub(crate) fn read_xlsx_table(path: &Path) -> Result<DataFrame> {
    let sheet = read_sheet_rows(path, None)?;
    let mut rows = sheet.rows.into_iter();
    let header = rows.next().ok_or_else(|| IngestError::EmptyFile {
        path: path.to_path_buf(),
    })?;
    let names: Vec<String> = header
        .into_iter()
        .enumerate()
        .map(|(idx, name)| name.unwrap_or_else(|| format!("Unnamed: {idx}")))
        .collect();

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for row in rows {
        if row.iter().all(Option::is_none) {
            continue;
        }
        let mut cells = row.into_iter();
        for column in values.iter_mut() {
            column.push(cells.next().flatten());
        }
    }

    let columns: Vec<Column> = names
        .iter()
        .zip(values)
        .map(|(name, column)| Series::new(name.as_str().into(), column).into_column())
        .collect();
    DataFrame::new(columns).map_err(|error| IngestError::Spreadsheet {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Float(value) => Some(format_number(*value)),
        Data::Int(value) => Some(value.to_string()),
        Data::Bool(value) => Some(value.to_string()),
        Data::DateTime(value) => Some(value.as_datetime().map_or_else(
            || format_number(value.as_f64()),
            |datetime| datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        )),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Some(text.clone()),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn spreadsheet_error(path: &Path, error: &dyn std::fmt::Display) -> IngestError {
    IngestError::Spreadsheet {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
