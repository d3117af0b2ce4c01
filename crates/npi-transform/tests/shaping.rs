//! End-to-end cleaning and shaping on a small two-release table.

use chrono::NaiveDate;
use npi_model::schema::{columns, derived};
use npi_model::{CleaningOptions, OutlierMethod, ShapingOptions};
use npi_transform::{ShapingPlan, ShapingStage, TransformError, cleaning, shape};
use polars::prelude::*;

fn raw_orders() -> DataFrame {
    // Two releases one year apart. Customer C1 orders in both releases,
    // C2 only in the older one.
    let releases = ["2023A", "2023A", "2023A", "2024A", "2024A", "2023A"];
    let customers = ["C1", "C1", "C1", "C1", "C1", "C2"];
    let weeks = [202310i64, 202310, 202315, 202410, 202430, 202310];
    let types = [Some("BPF"), None, Some("P"), Some("P"), Some("P"), Some("PF")];
    let qty = [4i64, 6, 3, 8, 2, 5];
    let n = releases.len();

    df! {
        columns::ORDER_TYPE => vec!["ZOR"; n],
        columns::RELEASE => releases,
        columns::BRAND => vec!["RB"; n],
        columns::PLANNED_DELIVERY_DATE => vec!["2024-03-01"; n],
        columns::PLANNED_DELIVERY_MONTH => vec!["2024-03"; n],
        columns::CREATION_YEARWEEK => weeks,
        columns::PLANNED_DELIVERY_YEARWEEK => weeks.map(|week| week + 2),
        columns::CUSTOMER_SOLD_TO => vec!["ACME"; n],
        columns::CUSTOMER => customers,
        columns::DIVISION => vec!["SUN"; n],
        columns::KEY_ACCOUNT_CODE => vec!["KA"; n],
        columns::DATEST_NAME => vec!["Italy"; n],
        columns::DATEST => vec!["0042"; n],
        columns::DEDALO_AREA => vec!["A01"; n],
        columns::ACQUISITION_MODE_DESC => vec!["Rep"; n],
        columns::ACQUISITION_MODE_GROUP => vec!["REP"; n],
        columns::ORDER_SPECIFICATION => vec!["STD"; n],
        columns::CUSTOMER_TYPE => types,
        columns::QTY => qty,
    }
    .unwrap()
}

fn options() -> ShapingOptions {
    ShapingOptions::default().with_today(NaiveDate::from_ymd_opt(2024, 6, 5).unwrap())
}

fn strings(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect()
}

#[test]
fn cleaning_then_shaping_produces_every_flag() {
    let cleaned = cleaning(raw_orders(), &CleaningOptions::default(), None).unwrap();
    // The first two rows share the dimension tuple.
    assert_eq!(cleaned.height(), 5);

    let shaped = shape(cleaned, &options()).unwrap();
    for column in [
        derived::FIRST_ORDER,
        derived::NEW_ACQUISITION_MODE,
        derived::COMMON_CREATION_YEARWEEK,
        derived::COMMON_PLANNED_DELIVERY_YEARWEEK,
        derived::TILL_TODAY,
        derived::COMP,
        derived::COMP_TODAY,
        derived::OUTLIER,
        derived::COMP_NO_OUT,
        derived::COMP_TODAY_NO_OUT,
    ] {
        assert!(shaped.column(column).is_ok(), "missing {column}");
    }

    // Rows: 2023A C1 w10, 2023A C1 w15, 2024A C1 w10, 2024A C1 w30, 2023A C2 w10.
    assert_eq!(
        strings(&shaped, derived::NEW_ACQUISITION_MODE),
        [
            "REP FIRST ORDER",
            "REP REPLENISHMENT",
            "REP FIRST ORDER",
            "REP REPLENISHMENT",
            "REP FIRST ORDER",
        ]
    );
    assert_eq!(strings(&shaped, derived::COMP), ["Y", "Y", "Y", "Y", "N"]);

    // Threshold is week 22 of 2024: the 2024A week 30 row is beyond today.
    assert_eq!(strings(&shaped, derived::TILL_TODAY), ["Y", "Y", "Y", "N", "Y"]);
    assert_eq!(strings(&shaped, derived::COMP_TODAY), ["Y", "N", "Y", "N", "N"]);

    let common: Vec<Option<i64>> = shaped
        .column(derived::COMMON_CREATION_YEARWEEK)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        common,
        vec![Some(202410), Some(202415), Some(202410), Some(202430), Some(202410)]
    );
}

#[test]
fn every_method_runs_through_the_plan() {
    let cleaned = cleaning(raw_orders(), &CleaningOptions::default(), None).unwrap();
    for method in OutlierMethod::all() {
        let shaped = shape(cleaned.clone(), &options().with_outlier_method(*method)).unwrap();
        assert_eq!(shaped.height(), cleaned.height(), "{method}");
        assert_eq!(
            shaped.column(derived::OUTLIER).unwrap().dtype(),
            &DataType::Boolean
        );
    }
}

#[test]
fn partial_plan_only_adds_requested_columns() {
    let cleaned = cleaning(raw_orders(), &CleaningOptions::default(), None).unwrap();
    let plan = ShapingPlan::resolve(&[ShapingStage::Comp]);
    let shaped = plan.execute(cleaned, &options()).unwrap();

    assert!(shaped.column(derived::COMP).is_ok());
    assert!(shaped.column(derived::TILL_TODAY).is_err());
    assert!(shaped.column(derived::OUTLIER).is_err());
}

#[test]
fn shaping_raw_columns_without_grouping_keys_fails() {
    let df = df! { columns::RELEASE => ["2024A"] }.unwrap();
    let err = shape(df, &options()).unwrap_err();
    assert!(matches!(err, TransformError::MissingColumn { stage: "first_order", .. }));
}

#[test]
fn empty_cleaned_table_shapes_to_empty_table() {
    let cleaned = cleaning(
        raw_orders().head(Some(0)),
        &CleaningOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(cleaned.height(), 0);

    let shaped = shape(cleaned, &options()).unwrap();
    assert_eq!(shaped.height(), 0);
    for stage in ShapingStage::all() {
        for column in stage.produces() {
            assert!(shaped.column(column).is_ok(), "missing {column}");
        }
    }
    assert_eq!(
        shaped
            .column(derived::COMMON_CREATION_YEARWEEK)
            .unwrap()
            .dtype(),
        &DataType::Int64
    );
}
