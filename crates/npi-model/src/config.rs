//! Pipeline configuration loaded from a TOML file.
//!
//! Every relative path is resolved against the directory that holds the
//! configuration file, so a project folder can be moved as a whole.
//!
//! ```toml
//! [input]
//! dir = "data/input"
//! prefix = "Comp_Analysis"
//!
//! [output]
//! dir = "data/output"
//! file_name = "df_comp.xlsx"
//!
//! [area_lookup]
//! path = "data/Aree.xlsx"
//!
//! [shaping]
//! week_inside_first = 2
//!
//! [shaping.outlier]
//! method = "iqr"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::options::{CleaningOptions, ShapingOptions};
use crate::schema::lookup;

/// Where the raw order extracts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub dir: PathBuf,
    /// Only files whose name starts with this prefix are imported.
    pub prefix: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/input"),
            prefix: "Comp_Analysis".to_string(),
        }
    }
}

/// Where the shaped table is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// File name; its extension selects the output format.
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/output"),
            file_name: "df_comp.xlsx".to_string(),
        }
    }
}

/// Area code → launch type lookup joined during cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaLookupConfig {
    pub path: PathBuf,
    #[serde(default = "default_lookup_sheet")]
    pub sheet: String,
}

impl AreaLookupConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: default_lookup_sheet(),
        }
    }
}

fn default_lookup_sheet() -> String {
    lookup::DEFAULT_SHEET.to_string()
}

/// Complete configuration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub area_lookup: Option<AreaLookupConfig>,
    pub cleaning: CleaningOptions,
    pub shaping: ShapingOptions,
}

impl PipelineConfig {
    /// Load a configuration file and resolve its relative paths.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&content, base_dir).map_err(|message| ModelError::ConfigParse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse a configuration string, resolving relative paths against `base_dir`.
    pub fn from_toml_str(content: &str, base_dir: &Path) -> std::result::Result<Self, String> {
        let mut config: PipelineConfig =
            toml::from_str(content).map_err(|error| error.to_string())?;
        config.resolve_paths(base_dir);
        Ok(config)
    }

    /// Full path of the output file.
    pub fn output_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.file_name)
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        self.input.dir = resolve(base_dir, &self.input.dir);
        self.output.dir = resolve(base_dir, &self.output.dir);
        if let Some(lookup) = self.area_lookup.as_mut() {
            lookup.path = resolve(base_dir, &lookup.path);
        }
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
