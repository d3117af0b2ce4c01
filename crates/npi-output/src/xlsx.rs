//! Workbook output.
//!
//! Numeric columns become number cells, boolean columns boolean cells and
//! everything else text. Nulls leave the cell empty.

use std::path::Path;

use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::error::{OutputError, Result};

const SHEET_NAME: &str = "Sheet1";

pub(crate) fn write_xlsx(df: &DataFrame, path: &Path) -> Result<()> {
    let spreadsheet_error = |e: XlsxError| OutputError::Spreadsheet {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(spreadsheet_error)?;

    let header = Format::new().set_bold();
    for (col, column) in df.get_columns().iter().enumerate() {
        let col = column_index(col, path)?;
        sheet
            .write_string_with_format(0, col, column.name().as_str(), &header)
            .map_err(spreadsheet_error)?;
        write_column(sheet, col, column).map_err(|e| match e {
            CellError::Xlsx(e) => spreadsheet_error(e),
            CellError::Polars(e) => OutputError::from(e),
        })?;
    }
    debug!(rows = df.height(), "worksheet filled");

    workbook.save(path).map_err(spreadsheet_error)?;
    Ok(())
}

enum CellError {
    Xlsx(XlsxError),
    Polars(PolarsError),
}

impl From<XlsxError> for CellError {
    fn from(err: XlsxError) -> Self {
        Self::Xlsx(err)
    }
}

impl From<PolarsError> for CellError {
    fn from(err: PolarsError) -> Self {
        Self::Polars(err)
    }
}

fn column_index(col: usize, path: &Path) -> Result<u16> {
    u16::try_from(col).map_err(|_| OutputError::Spreadsheet {
        path: path.to_path_buf(),
        message: format!("too many columns ({})", col + 1),
    })
}

/// Data rows start below the header.
fn write_column(
    sheet: &mut Worksheet,
    col: u16,
    column: &Column,
) -> std::result::Result<(), CellError> {
    let dtype = column.dtype();
    let rows = (1u32..).zip(0..column.len());

    if dtype == &DataType::Boolean {
        let values = column.bool()?;
        for (row, idx) in rows {
            if let Some(value) = values.get(idx) {
                sheet.write_boolean(row, col, value)?;
            }
        }
    } else if dtype.is_primitive_numeric() {
        let cast = column.cast(&DataType::Float64)?;
        let values = cast.f64()?;
        for (row, idx) in rows {
            if let Some(value) = values.get(idx) {
                sheet.write_number(row, col, value)?;
            }
        }
    } else {
        let cast = column.cast(&DataType::String)?;
        let values = cast.str()?;
        for (row, idx) in rows {
            if let Some(value) = values.get(idx) {
                sheet.write_string(row, col, value)?;
            }
        }
    }
    Ok(())
}
