//! Run pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: discover and import the order extracts
//! 2. **Clean**: customer type fill, aggregation, optional area lookup join
//! 3. **Shape**: first orders, common year-weeks, comparability and outliers
//! 4. **Output**: write the table by extension
//!
//! Each stage takes the output of the previous one.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use npi_ingest::{import_order_file, import_orders, list_order_files, read_area_lookup};
use npi_model::schema::lookup;
use npi_model::{AreaLookupConfig, CleaningOptions, OutlierMethod, PipelineConfig, ShapingOptions};
use npi_output::write_table;
use npi_transform::{cleaning, shape};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

// ============================================================================
// Configuration
// ============================================================================

/// Command line values that replace configuration file values.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub input_dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub area_lookup: Option<PathBuf>,
    pub lookup_sheet: Option<String>,
    pub method: Option<OutlierMethod>,
    pub week_inside_first: Option<u32>,
    pub today: Option<NaiveDate>,
}

/// Load the configuration file, or the defaults relative to the working
/// directory when none is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            PipelineConfig::load(path).with_context(|| format!("load config {}", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Where the orders come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Every supported file in `dir` whose name starts with `prefix`,
    /// concatenated into one table.
    Folder { dir: PathBuf, prefix: String },
    /// One extract.
    File(PathBuf),
}

/// Everything one run needs, after overrides.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub input: InputSource,
    pub output_path: PathBuf,
    pub area_lookup: Option<AreaLookupConfig>,
    pub cleaning: CleaningOptions,
    pub shaping: ShapingOptions,
}

impl RunPlan {
    pub fn new(config: PipelineConfig, overrides: &RunOverrides) -> Self {
        let output_path = overrides
            .output
            .clone()
            .unwrap_or_else(|| config.output_path());

        let input = match &overrides.file {
            Some(file) => InputSource::File(file.clone()),
            None => InputSource::Folder {
                dir: overrides
                    .input_dir
                    .clone()
                    .unwrap_or(config.input.dir),
                prefix: overrides
                    .prefix
                    .clone()
                    .unwrap_or(config.input.prefix),
            },
        };

        let mut area_lookup = match &overrides.area_lookup {
            Some(path) => Some(AreaLookupConfig {
                path: path.clone(),
                sheet: config
                    .area_lookup
                    .map(|lookup| lookup.sheet)
                    .unwrap_or_else(|| lookup::DEFAULT_SHEET.to_string()),
            }),
            None => config.area_lookup,
        };
        if let (Some(lookup), Some(sheet)) = (area_lookup.as_mut(), &overrides.lookup_sheet) {
            lookup.sheet = sheet.clone();
        }

        let mut shaping = config.shaping;
        if let Some(method) = overrides.method {
            shaping = shaping.with_outlier_method(method);
        }
        if let Some(weeks) = overrides.week_inside_first {
            shaping = shaping.with_week_inside_first(weeks);
        }
        if let Some(today) = overrides.today {
            shaping = shaping.with_today(today);
        }

        Self {
            input,
            output_path,
            area_lookup,
            cleaning: config.cleaning,
            shaping,
        }
    }
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Result of the ingest stage.
#[derive(Debug)]
pub struct IngestResult {
    /// Imported files in processing order.
    pub files: Vec<PathBuf>,
    /// All orders in one table.
    pub orders: DataFrame,
}

/// Files the ingest stage would import.
pub fn planned_files(input: &InputSource) -> Result<Vec<PathBuf>> {
    match input {
        InputSource::Folder { dir, prefix, .. } => list_order_files(dir, prefix)
            .with_context(|| format!("list order files in {}", dir.display())),
        InputSource::File(path) => Ok(vec![path.clone()]),
    }
}

pub fn ingest(input: &InputSource) -> Result<IngestResult> {
    let files = planned_files(input)?;
    let orders = match input {
        InputSource::Folder { dir, prefix } => {
            let imported = import_orders(dir, prefix, true)
                .with_context(|| format!("import orders from {}", dir.display()))?;
            debug!(
                tables = imported.table_count(),
                rows = imported.row_count(),
                "orders imported"
            );
            imported
                .into_single(dir, prefix)
                .with_context(|| format!("combine orders from {}", dir.display()))?
        }
        InputSource::File(path) => {
            import_order_file(path).with_context(|| format!("import {}", path.display()))?
        }
    };
    Ok(IngestResult { files, orders })
}

// ============================================================================
// Stage 2: Clean
// ============================================================================

pub fn clean(orders: DataFrame, plan: &RunPlan) -> Result<DataFrame> {
    let lookup = plan
        .area_lookup
        .as_ref()
        .map(|lookup| {
            read_area_lookup(&lookup.path, &lookup.sheet)
                .with_context(|| format!("read area lookup {}", lookup.path.display()))
        })
        .transpose()?;
    cleaning(orders, &plan.cleaning, lookup.as_ref()).context("clean orders")
}

// ============================================================================
// Stage 3: Shape
// ============================================================================

pub fn shape_orders(cleaned: DataFrame, options: &ShapingOptions) -> Result<DataFrame> {
    shape(cleaned, options).context("shape orders")
}

// ============================================================================
// Stage 4: Output
// ============================================================================

pub fn output(table: &mut DataFrame, path: &Path) -> Result<()> {
    write_table(table, path).with_context(|| format!("write {}", path.display()))
}

// ============================================================================
// Full run
// ============================================================================

/// Outcome of a complete run.
#[derive(Debug)]
pub struct RunResult {
    pub files: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub reference_date: NaiveDate,
    pub method: OutlierMethod,
    pub table: DataFrame,
}

pub fn run(plan: &RunPlan) -> Result<RunResult> {
    let span = info_span!("run", output = %plan.output_path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let IngestResult { files, orders } = ingest(&plan.input)?;
    info!(files = files.len(), rows = orders.height(), "ingest complete");

    let cleaned = clean(orders, plan)?;
    let mut table = shape_orders(cleaned, &plan.shaping)?;
    output(&mut table, &plan.output_path)?;

    info!(
        rows = table.height(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(RunResult {
        files,
        output_path: plan.output_path.clone(),
        reference_date: plan.shaping.reference_date(),
        method: plan.shaping.outlier.method,
        table,
    })
}
