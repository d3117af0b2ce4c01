//! Run summary: per-release counts printed as a table or saved as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use npi_model::OutlierMethod;
use npi_model::schema::{columns, derived, flag};
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::RunResult;

/// Label for rows without a release.
const MISSING_RELEASE: &str = "(missing)";

/// Counts for one release of the shaped table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseSummary {
    pub release: String,
    pub rows: usize,
    pub qty: i64,
    /// Rows with `comp = Y`.
    pub comparable: usize,
    /// Rows with `comp_today = Y`.
    pub comparable_today: usize,
    pub outliers: usize,
}

/// Summarize the shaped table by release, in release order.
pub fn summarize(table: &DataFrame) -> Result<Vec<ReleaseSummary>> {
    let release = table.column(columns::RELEASE)?.str()?.clone();
    let qty = table.column(columns::QTY)?.cast(&DataType::Int64)?;
    let qty = qty.i64()?;
    let comp = table.column(derived::COMP)?.str()?.clone();
    let comp_today = table.column(derived::COMP_TODAY)?.str()?.clone();
    let outlier = table.column(derived::OUTLIER)?.bool()?.clone();

    let mut by_release: BTreeMap<String, ReleaseSummary> = BTreeMap::new();
    for row in 0..table.height() {
        let name = release.get(row).unwrap_or(MISSING_RELEASE);
        let summary = by_release
            .entry(name.to_string())
            .or_insert_with(|| ReleaseSummary {
                release: name.to_string(),
                ..ReleaseSummary::default()
            });
        summary.rows += 1;
        summary.qty += qty.get(row).unwrap_or(0);
        summary.comparable += usize::from(comp.get(row) == Some(flag::YES));
        summary.comparable_today += usize::from(comp_today.get(row) == Some(flag::YES));
        summary.outliers += usize::from(outlier.get(row).unwrap_or(false));
    }
    Ok(by_release.into_values().collect())
}

/// Save the summaries as pretty JSON.
pub fn write_summary_json(path: &Path, summaries: &[ReleaseSummary]) -> Result<()> {
    let json = serde_json::to_string_pretty(summaries).context("serialize summary")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))
}

pub fn print_summary(result: &RunResult, summaries: &[ReleaseSummary]) {
    println!("Files: {}", result.files.len());
    for file in &result.files {
        println!("  {}", file.display());
    }
    println!("Output: {}", result.output_path.display());
    println!(
        "Reference date: {}  Outlier method: {}",
        result.reference_date,
        result.method.display_name()
    );
    println!("{}", summary_table(summaries));
}

pub fn summary_table(summaries: &[ReleaseSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Release"),
        header_cell("Rows"),
        header_cell("Qty"),
        header_cell("Comp"),
        header_cell("Comp today"),
        header_cell("Outliers"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total = ReleaseSummary::default();
    for summary in summaries {
        total.rows += summary.rows;
        total.qty += summary.qty;
        total.comparable += summary.comparable;
        total.comparable_today += summary.comparable_today;
        total.outliers += summary.outliers;
        table.add_row(vec![
            Cell::new(&summary.release)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(summary.rows),
            Cell::new(summary.qty),
            Cell::new(summary.comparable),
            Cell::new(summary.comparable_today),
            count_cell(summary.outliers, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total.rows).add_attribute(Attribute::Bold),
        Cell::new(total.qty).add_attribute(Attribute::Bold),
        Cell::new(total.comparable).add_attribute(Attribute::Bold),
        Cell::new(total.comparable_today).add_attribute(Attribute::Bold),
        count_cell(total.outliers, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Table of the outlier detection methods.
pub fn methods_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Tag"),
        header_cell("Method"),
        header_cell("Flags a value when"),
    ]);
    apply_table_style(&mut table);
    for method in OutlierMethod::all() {
        table.add_row(vec![
            Cell::new(method.tag()).add_attribute(Attribute::Bold),
            Cell::new(method.display_name()),
            Cell::new(method.description()),
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}
