//! Format dispatch for the final table.

use std::fs::{self, File};
use std::path::Path;
use std::time::Instant;

use npi_model::TableFormat;
use polars::prelude::*;
use tracing::{info, info_span};

use crate::error::{OutputError, Result};
use crate::xlsx::write_xlsx;

/// Write `df` to `path`, choosing the format from the extension.
///
/// Missing parent directories are created. An existing file is replaced.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    let format = TableFormat::from_path(path).ok_or_else(|| OutputError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let span = info_span!("write", path = %path.display(), %format);
    let _guard = span.enter();
    let start = Instant::now();

    ensure_parent_dir(path)?;
    match format {
        TableFormat::Spreadsheet => write_xlsx(df, path)?,
        TableFormat::Delimited => write_csv(df, path)?,
        TableFormat::Columnar => write_parquet(df, path)?,
    }

    info!(
        rows = df.height(),
        columns = df.width(),
        duration_ms = start.elapsed().as_millis(),
        "table written"
    );
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| OutputError::FileCreate {
        path: path.to_path_buf(),
        source,
    })
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = create_file(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)?;
    Ok(())
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = create_file(path)?;
    ParquetWriter::new(file).finish(df)?;
    Ok(())
}
