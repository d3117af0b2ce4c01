//! Per-group outlier detection on `qty`.
//!
//! Rows are grouped by (brand, dedalo_area, new_acquisition_mode) and each
//! group is scored on its own, in parallel. Rows with a null group key or a
//! null quantity are never flagged. Row order is preserved.

mod iqr;
mod isolation_forest;
mod mad;
mod svm;

use std::collections::HashMap;
use std::time::Instant;

use npi_model::schema::{OUTLIER_KEYS, columns, derived};
use npi_model::{OutlierMethod, OutlierOptions};
use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::error::Result;

pub use iqr::iqr_outliers;
pub use isolation_forest::isolation_forest_outliers;
pub use mad::mad_outliers;
pub use svm::one_class_svm_outliers;

/// Flag each value of one peer group with the configured detector.
pub fn detect(values: &[f64], options: &OutlierOptions) -> Vec<bool> {
    match options.method {
        OutlierMethod::Iqr => iqr_outliers(values, options.iqr_multiplier, options.iqr_lower_floor),
        OutlierMethod::Mad => mad_outliers(values, options.mad_threshold),
        OutlierMethod::IsolationForest => isolation_forest_outliers(
            values,
            options.forest_trees,
            options.forest_max_samples,
            options.forest_seed,
        ),
        OutlierMethod::OneClassSvm => one_class_svm_outliers(
            values,
            options.svm_nu,
            options.svm_gamma.unwrap_or(1.0),
            options.svm_tolerance,
        ),
    }
}

/// Add the boolean `outlier` column.
pub fn flag_outliers(mut df: DataFrame, options: &OutlierOptions) -> Result<DataFrame> {
    let span = info_span!("outliers", method = %options.method);
    let _guard = span.enter();
    let start = Instant::now();

    let groups = peer_groups(&df)?;
    let qty = df.column(columns::QTY)?.cast(&DataType::Float64)?;
    let qty = qty.f64()?;
    debug!(groups = groups.len(), "scoring peer groups");

    let scored: Vec<(Vec<usize>, Vec<bool>)> = groups
        .into_par_iter()
        .map(|rows| {
            let (rows, values): (Vec<usize>, Vec<f64>) = rows
                .into_iter()
                .filter_map(|row| qty.get(row).map(|value| (row, value)))
                .unzip();
            let flags = detect(&values, options);
            (rows, flags)
        })
        .collect();

    let mut flags = vec![false; df.height()];
    for (rows, group_flags) in scored {
        for (row, flag) in rows.into_iter().zip(group_flags) {
            flags[row] = flag;
        }
    }
    let flagged = flags.iter().filter(|flag| **flag).count();

    df.with_column(Series::new(derived::OUTLIER.into(), flags))?;
    info!(
        flagged,
        duration_ms = start.elapsed().as_millis(),
        "outlier detection complete"
    );
    Ok(df)
}

/// Row indices of each peer group, in order of first appearance.
fn peer_groups(df: &DataFrame) -> Result<Vec<Vec<usize>>> {
    let keys = OUTLIER_KEYS
        .iter()
        .map(|name| Ok(df.column(name)?.str()?.clone()))
        .collect::<Result<Vec<StringChunked>>>()?;

    let mut index: HashMap<Vec<&str>, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for row in 0..df.height() {
        let Some(key) = keys
            .iter()
            .map(|column| column.get(row))
            .collect::<Option<Vec<&str>>>()
        else {
            continue;
        };
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(row);
    }
    Ok(groups)
}

// ============================================================================
// Shared statistics
// ============================================================================

/// Linear-interpolated quantile of sorted values.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

pub(crate) fn median(values: &[f64]) -> f64 {
    quantile_sorted(&sorted(values), 0.5)
}
