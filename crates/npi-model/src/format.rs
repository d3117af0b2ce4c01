//! Tabular file formats handled by the importer and the writer.

use std::fmt;
use std::path::Path;

/// File format selected from a path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// `.xlsx` workbook.
    Spreadsheet,
    /// `.csv` delimited text.
    Delimited,
    /// `.parquet` columnar binary.
    Columnar,
}

impl TableFormat {
    pub const fn all() -> &'static [TableFormat] {
        &[Self::Spreadsheet, Self::Delimited, Self::Columnar]
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "xlsx",
            Self::Delimited => "csv",
            Self::Columnar => "parquet",
        }
    }

    /// Match an extension (without the dot), case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|format| ext.eq_ignore_ascii_case(format.extension()))
    }

    /// Detect the format of a file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
