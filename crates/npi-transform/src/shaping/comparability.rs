//! Cross-release comparability flags.
//!
//! A group is comparable when it holds exactly two distinct releases. Each
//! refined flag narrows the base key with the flags it depends on, so a
//! group that is comparable only because of rows on the other side of a
//! split does not count.

use npi_model::schema::{COMPARISON_KEYS, columns, derived, flag};
use polars::prelude::*;

use super::{any_null, partition, yes_no};
use crate::error::Result;

/// Number of distinct releases a comparable group must hold.
pub const RELEASES_PER_GROUP: u32 = 2;

/// True when the rows sharing `keys` cover exactly two releases.
/// Rows with a null key are never comparable.
pub fn comparable(keys: &[&str]) -> Expr {
    let releases = col(columns::RELEASE)
        .drop_nulls()
        .n_unique()
        .over(partition(keys));
    when(any_null(keys))
        .then(lit(false))
        .otherwise(releases.eq(lit(RELEASES_PER_GROUP)))
}

fn is_yes(column: &str) -> Expr {
    col(column).eq(lit(flag::YES))
}

fn with_keys(extra: &[&'static str]) -> Vec<&'static str> {
    COMPARISON_KEYS.iter().chain(extra).copied().collect()
}

/// `comp`: comparable on (brand, customer, dedalo_area, new_acquisition_mode).
pub fn add_comp(df: DataFrame) -> Result<DataFrame> {
    Ok(df
        .lazy()
        .with_column(yes_no(comparable(&COMPARISON_KEYS)).alias(derived::COMP))
        .collect()?)
}

/// `comp_today`: `till_today` and `comp` are `Y`, and the group refined by
/// both flags is still comparable.
pub fn add_comp_today(df: DataFrame) -> Result<DataFrame> {
    let keys = with_keys(&[derived::TILL_TODAY, derived::COMP]);
    let condition = is_yes(derived::TILL_TODAY)
        .and(is_yes(derived::COMP))
        .and(comparable(&keys));
    Ok(df
        .lazy()
        .with_column(yes_no(condition).alias(derived::COMP_TODAY))
        .collect()?)
}

/// `comp_no_out`: not an outlier and `comp` is `Y`.
pub fn add_comp_no_out(df: DataFrame) -> Result<DataFrame> {
    let condition = col(derived::OUTLIER).not().and(is_yes(derived::COMP));
    Ok(df
        .lazy()
        .with_column(yes_no(condition).alias(derived::COMP_NO_OUT))
        .collect()?)
}

/// `comp_today_no_out`: not an outlier, `comp_today` is `Y`, and the group
/// refined by both is still comparable.
pub fn add_comp_today_no_out(df: DataFrame) -> Result<DataFrame> {
    let keys = with_keys(&[derived::OUTLIER, derived::COMP_TODAY]);
    let condition = col(derived::OUTLIER)
        .not()
        .and(is_yes(derived::COMP_TODAY))
        .and(comparable(&keys));
    Ok(df
        .lazy()
        .with_column(yes_no(condition).alias(derived::COMP_TODAY_NO_OUT))
        .collect()?)
}
