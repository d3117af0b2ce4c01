//! Year-week (`YYYYWW`) calendar helpers.
//!
//! Week numbers follow the `%W` convention: weeks start on Monday and the
//! days of January before the first Monday belong to week 0. A year-week is
//! anchored on the Sunday that closes it (`%Y%W%w` with weekday 0).

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{ModelError, Result};

/// Highest week number `%W` can produce.
pub const MAX_WEEK: i64 = 53;

/// Split a `YYYYWW` value into `(year, week)`.
pub fn split_yearweek(value: i64) -> Result<(i32, u32)> {
    let year = value / 100;
    let week = value % 100;
    if !(1..=9999).contains(&year) || !(0..=MAX_WEEK).contains(&week) {
        return Err(ModelError::InvalidYearWeek { value });
    }
    Ok((year as i32, week as u32))
}

/// Calendar date of the Sunday that closes the given year-week.
pub fn sunday_of_yearweek(value: i64) -> Result<NaiveDate> {
    let (year, week) = split_yearweek(value)?;
    let jan_first =
        NaiveDate::from_ymd_opt(year, 1, 1).ok_or(ModelError::InvalidYearWeek { value })?;
    let first_weekday = u64::from(jan_first.weekday().num_days_from_monday());
    // Sunday, counted from Monday.
    let day_of_week = 6u64;
    let offset = if week == 0 {
        day_of_week - first_weekday
    } else {
        let week_zero_length = (7 - first_weekday) % 7;
        week_zero_length + 7 * (u64::from(week) - 1) + day_of_week
    };
    jan_first
        .checked_add_days(Days::new(offset))
        .ok_or(ModelError::InvalidYearWeek { value })
}

/// `YYYYWW` value of a date under the `%Y%W` convention.
pub fn yearweek_of_date(date: NaiveDate) -> i64 {
    let week = (date.ordinal0() + 7 - date.weekday().num_days_from_monday()) / 7;
    i64::from(date.year()) * 100 + i64::from(week)
}

/// Year encoded in the first four characters of a release identifier.
pub fn release_year(release: &str) -> Option<i32> {
    let prefix: String = release.chars().take(4).collect();
    if prefix.chars().count() != 4 || !prefix.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}
