//! First-order labeling and acquisition mode reclassification.

use chrono::Datelike;
use npi_model::schema::{FIRST_ORDER_KEYS, acquisition, columns, derived};
use npi_model::sunday_of_yearweek;
use polars::prelude::*;

use super::{any_null, partition};
use crate::error::{Result, TransformError};

const CREATION_DAY: &str = "__creation_day";

/// Add `first_order` and `new_acquisition_mode`.
///
/// A row is a first order when its creation week's Sunday falls less than
/// `week_inside_first` weeks after the earliest one of its
/// (release, brand, customer, dedalo_area) group. Rows with a null group key
/// are never first orders.
pub fn label_first_order(mut df: DataFrame, week_inside_first: u32) -> Result<DataFrame> {
    let days = creation_days(&df)?;
    df.with_column(Series::new(CREATION_DAY.into(), days))?;

    let group_start = col(CREATION_DAY).min().over(partition(&FIRST_ORDER_KEYS));
    let elapsed_weeks = (col(CREATION_DAY) - group_start).cast(DataType::Float64) / lit(7.0);
    let first_order = when(any_null(&FIRST_ORDER_KEYS))
        .then(lit(false))
        .otherwise(elapsed_weeks.lt(lit(f64::from(week_inside_first))));

    let group = || col(columns::ACQUISITION_MODE_GROUP);
    let is_first = || col(derived::FIRST_ORDER);
    let new_mode = when(is_first().and(group().eq(lit(acquisition::REP))))
        .then(lit(acquisition::REP_FIRST_ORDER))
        .when(group().eq(lit(acquisition::RED_CARPET)))
        .then(lit(acquisition::EVENT))
        .when(is_first().not().and(group().eq(lit(acquisition::REP))))
        .then(lit(acquisition::REP_REPLENISHMENT))
        .otherwise(lit(acquisition::REPLENISHMENT));

    let labeled = df
        .lazy()
        .with_column(first_order.alias(derived::FIRST_ORDER))
        .with_column(new_mode.alias(derived::NEW_ACQUISITION_MODE))
        .collect()?
        .drop(CREATION_DAY)?;
    Ok(labeled)
}

/// Day number of the Sunday closing each row's creation week.
fn creation_days(df: &DataFrame) -> Result<Vec<i64>> {
    df.column(columns::CREATION_YEARWEEK)?
        .cast(&DataType::Int64)?
        .i64()?
        .into_iter()
        .map(|value| {
            let invalid = || TransformError::InvalidYearWeek {
                column: columns::CREATION_YEARWEEK.to_string(),
                value,
            };
            let yearweek = value.ok_or_else(invalid)?;
            let sunday = sunday_of_yearweek(yearweek).map_err(|_| invalid())?;
            Ok(i64::from(sunday.num_days_from_ce()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(weeks: &[i64], groups: &[&str]) -> DataFrame {
        let n = weeks.len();
        df! {
            columns::RELEASE => vec!["2024A"; n],
            columns::BRAND => vec!["RB"; n],
            columns::CUSTOMER => vec!["C1"; n],
            columns::DEDALO_AREA => vec!["A01"; n],
            columns::CREATION_YEARWEEK => weeks.to_vec(),
            columns::ACQUISITION_MODE_GROUP => groups.to_vec(),
        }
        .unwrap()
    }

    fn bools(df: &DataFrame, name: &str) -> Vec<Option<bool>> {
        df.column(name).unwrap().bool().unwrap().into_iter().collect()
    }

    fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect()
    }

    #[test]
    fn first_two_weeks_are_first_orders() {
        let df = table(&[202001, 202002, 202005], &["REP", "REP", "REP"]);
        let labeled = label_first_order(df, 2).unwrap();

        assert_eq!(
            bools(&labeled, derived::FIRST_ORDER),
            vec![Some(true), Some(true), Some(false)]
        );
        assert!(labeled.column(CREATION_DAY).is_err());
    }

    #[test]
    fn reclassifies_acquisition_modes() {
        let df = table(
            &[202001, 202005, 202001, 202005, 202001],
            &["REP", "REP", "RED CARPET", "RED CARPET", "WEB"],
        );
        let labeled = label_first_order(df, 2).unwrap();

        let modes = strings(&labeled, derived::NEW_ACQUISITION_MODE);
        let expected = [
            "REP FIRST ORDER",
            "REP REPLENISHMENT",
            "EVENT",
            "EVENT",
            "REPLENISHMENT",
        ];
        assert_eq!(
            modes,
            expected.iter().map(|m| Some(m.to_string())).collect::<Vec<_>>()
        );
    }

    #[test]
    fn null_group_key_is_not_a_first_order() {
        let df = df! {
            columns::RELEASE => ["2024A", "2024A"],
            columns::BRAND => ["RB", "RB"],
            columns::CUSTOMER => [Some("C1"), None],
            columns::DEDALO_AREA => ["A01", "A01"],
            columns::CREATION_YEARWEEK => [202001i64, 202001],
            columns::ACQUISITION_MODE_GROUP => ["REP", "REP"],
        }
        .unwrap();
        let labeled = label_first_order(df, 2).unwrap();
        assert_eq!(
            bools(&labeled, derived::FIRST_ORDER),
            vec![Some(true), Some(false)]
        );
    }

    #[test]
    fn invalid_week_is_an_error() {
        let df = table(&[202001, 202060], &["REP", "REP"]);
        let err = label_first_order(df, 2).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidYearWeek { value: Some(202060), .. }
        ));
    }
}
