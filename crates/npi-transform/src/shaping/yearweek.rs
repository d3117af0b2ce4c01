//! Common year-week alignment and the till-today flag.

use chrono::{Days, NaiveDate};
use npi_model::release_year;
use npi_model::schema::{columns, derived};
use npi_model::yearweek_of_date;
use polars::prelude::*;
use tracing::debug;

use super::yes_no;
use crate::error::{Result, TransformError};

const COMMON_YEARWEEKS: [(&str, &str); 2] = [
    (columns::CREATION_YEARWEEK, derived::COMMON_CREATION_YEARWEEK),
    (
        columns::PLANNED_DELIVERY_YEARWEEK,
        derived::COMMON_PLANNED_DELIVERY_YEARWEEK,
    ),
];

/// Shift creation and planned delivery weeks of every release onto the
/// latest release year.
///
/// `common = yearweek + (max_year - release_year) * 100`. The week number is
/// kept as is, so week 53 of a long year stays week 53. A table that already
/// carries `common_creation_yearweek` is returned unchanged.
pub fn add_common_yearweeks(mut df: DataFrame) -> Result<DataFrame> {
    if df.column(derived::COMMON_CREATION_YEARWEEK).is_ok() {
        debug!("common year-weeks already present");
        return Ok(df);
    }

    let years = release_years(&df)?;
    let Some(max_year) = years.iter().copied().max() else {
        for (_, target) in COMMON_YEARWEEKS {
            df.with_column(Series::new_empty(target.into(), &DataType::Int64))?;
        }
        return Ok(df);
    };
    let offsets: Vec<i64> = years
        .iter()
        .map(|year| i64::from(max_year - year) * 100)
        .collect();

    for (source, target) in COMMON_YEARWEEKS {
        let shifted: Vec<Option<i64>> = df
            .column(source)?
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .zip(&offsets)
            .map(|(week, offset)| week.map(|week| week + offset))
            .collect();
        df.with_column(Series::new(target.into(), shifted))?;
    }
    Ok(df)
}

fn release_years(df: &DataFrame) -> Result<Vec<i32>> {
    df.column(columns::RELEASE)?
        .str()?
        .into_iter()
        .map(|release| {
            release.and_then(release_year).ok_or_else(|| TransformError::InvalidRelease {
                release: release.map(str::to_string),
            })
        })
        .collect()
}

/// Last completed year-week relative to `today`: the week of `today - 7 days`.
pub fn till_today_threshold(today: NaiveDate) -> i64 {
    let last_week = today.checked_sub_days(Days::new(7)).unwrap_or(today);
    yearweek_of_date(last_week)
}

/// `Y` when the common creation week is not later than the threshold week.
pub fn add_till_today(df: DataFrame, today: NaiveDate) -> Result<DataFrame> {
    let threshold = till_today_threshold(today);
    debug!(threshold, "till_today threshold");
    let flag = yes_no(col(derived::COMMON_CREATION_YEARWEEK).lt_eq(lit(threshold)));
    Ok(df
        .lazy()
        .with_column(flag.alias(derived::TILL_TODAY))
        .collect()?)
}
