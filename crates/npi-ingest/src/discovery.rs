//! Order extract discovery and batch import.

use std::path::{Path, PathBuf};
use std::time::Instant;

use npi_model::TableFormat;
use polars::prelude::*;
use tracing::{info, info_span};

use crate::error::{IngestError, Result};
use crate::reader::import_order_file;

/// Tables produced by a batch import.
#[derive(Debug, Clone)]
pub enum ImportedOrders {
    /// Every matching file concatenated into one table.
    Combined(DataFrame),
    /// One table per file, in filename order.
    Separate(Vec<DataFrame>),
}

impl ImportedOrders {
    pub fn table_count(&self) -> usize {
        match self {
            Self::Combined(_) => 1,
            Self::Separate(tables) => tables.len(),
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Combined(table) => table.height(),
            Self::Separate(tables) => tables.iter().map(DataFrame::height).sum(),
        }
    }

    /// Collapse into one table. An empty batch is [`IngestError::NoInputFiles`].
    pub fn into_single(self, folder: &Path, prefix: &str) -> Result<DataFrame> {
        match self {
            Self::Combined(table) => Ok(table),
            Self::Separate(tables) if tables.is_empty() => Err(IngestError::NoInputFiles {
                path: folder.to_path_buf(),
                prefix: prefix.to_string(),
            }),
            Self::Separate(tables) => concat_tables(tables),
        }
    }
}

/// Lists supported files in `folder` whose name starts with `prefix`.
///
/// Returns files sorted by filename.
pub fn list_order_files(folder: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(IngestError::FolderNotFound {
            path: folder.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(folder).map_err(|e| IngestError::DirectoryRead {
        path: folder.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: folder.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let matches_prefix = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(prefix));

        if matches_prefix && TableFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Import every order extract in `folder` matching `prefix`.
///
/// The first file that fails aborts the batch.
pub fn import_orders(folder: &Path, prefix: &str, aggregate: bool) -> Result<ImportedOrders> {
    let span = info_span!("import_orders", folder = %folder.display(), prefix);
    let _guard = span.enter();
    let start = Instant::now();

    let files = list_order_files(folder, prefix)?;
    let tables = files
        .iter()
        .map(|path| import_order_file(path))
        .collect::<Result<Vec<_>>>()?;

    let imported = if aggregate && tables.len() > 1 {
        ImportedOrders::Combined(concat_tables(tables)?)
    } else {
        ImportedOrders::Separate(tables)
    };

    info!(
        files = files.len(),
        rows = imported.row_count(),
        duration_ms = start.elapsed().as_millis(),
        "batch import complete"
    );
    Ok(imported)
}

fn concat_tables(tables: Vec<DataFrame>) -> Result<DataFrame> {
    let mut tables = tables.into_iter();
    let Some(mut combined) = tables.next() else {
        return Ok(DataFrame::empty());
    };
    for table in tables {
        combined.vstack_mut(&table)?;
    }
    combined.as_single_chunk_par();
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in [
            "Comp_Analysis_B.csv",
            "Comp_Analysis_A.xlsx",
            "Comp_Analysis_notes.txt",
            "Other_Orders.csv",
        ] {
            std::fs::write(dir.path().join(name), "header\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("Comp_Analysis_dir.csv")).unwrap();
        dir
    }

    #[test]
    fn test_list_order_files_filters_and_sorts() {
        let dir = create_test_dir();
        let files = list_order_files(dir.path(), "Comp_Analysis").unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Comp_Analysis_A.xlsx", "Comp_Analysis_B.csv"]);
    }

    #[test]
    fn test_missing_folder() {
        let err = list_order_files(Path::new("/nonexistent/folder"), "Comp").unwrap_err();
        assert!(matches!(err, IngestError::FolderNotFound { .. }));
    }

    #[test]
    fn test_empty_batch_into_single() {
        let dir = TempDir::new().unwrap();
        let imported = import_orders(dir.path(), "Comp_Analysis", true).unwrap();
        assert_eq!(imported.table_count(), 0);

        let err = imported
            .into_single(dir.path(), "Comp_Analysis")
            .unwrap_err();
        assert!(matches!(err, IngestError::NoInputFiles { .. }));
    }
}
