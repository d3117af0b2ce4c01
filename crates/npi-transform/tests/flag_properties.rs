//! Property tests for the comparability flags.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use npi_model::ShapingOptions;
use npi_model::schema::{columns, derived};
use npi_transform::{add_common_yearweeks, shape};
use polars::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Row {
    release: &'static str,
    customer: &'static str,
    area: &'static str,
    group: &'static str,
    week: i64,
    qty: i64,
}

fn row() -> impl Strategy<Value = Row> {
    (
        prop::sample::select(vec!["2023A", "2024A", "2025A"]),
        prop::sample::select(vec!["C1", "C2", "C3"]),
        prop::sample::select(vec!["A01", "A02"]),
        prop::sample::select(vec!["REP", "RED CARPET", "WEB"]),
        1i64..=40,
        1i64..=60,
    )
        .prop_map(|(release, customer, area, group, week, qty)| {
            let year: i64 = release[..4].parse().unwrap_or(2024);
            Row {
                release,
                customer,
                area,
                group,
                week: year * 100 + week,
                qty,
            }
        })
}

fn table(rows: &[Row]) -> DataFrame {
    df! {
        columns::RELEASE => rows.iter().map(|r| r.release).collect::<Vec<_>>(),
        columns::BRAND => vec!["RB"; rows.len()],
        columns::CUSTOMER => rows.iter().map(|r| r.customer).collect::<Vec<_>>(),
        columns::DEDALO_AREA => rows.iter().map(|r| r.area).collect::<Vec<_>>(),
        columns::ACQUISITION_MODE_GROUP => rows.iter().map(|r| r.group).collect::<Vec<_>>(),
        columns::CREATION_YEARWEEK => rows.iter().map(|r| r.week).collect::<Vec<_>>(),
        columns::PLANNED_DELIVERY_YEARWEEK => rows.iter().map(|r| r.week + 1).collect::<Vec<_>>(),
        columns::QTY => rows.iter().map(|r| r.qty).collect::<Vec<_>>(),
    }
    .unwrap()
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

fn options() -> ShapingOptions {
    ShapingOptions::default().with_today(NaiveDate::from_ymd_opt(2025, 4, 16).unwrap())
}

proptest! {
    #[test]
    fn flags_are_yes_no_and_nested(rows in prop::collection::vec(row(), 1..40)) {
        let shaped = shape(table(&rows), &options()).unwrap();

        let comp = strings(&shaped, derived::COMP);
        let till = strings(&shaped, derived::TILL_TODAY);
        let comp_today = strings(&shaped, derived::COMP_TODAY);
        let comp_no_out = strings(&shaped, derived::COMP_NO_OUT);
        let comp_today_no_out = strings(&shaped, derived::COMP_TODAY_NO_OUT);
        let outlier: Vec<bool> = shaped
            .column(derived::OUTLIER)
            .unwrap()
            .bool()
            .unwrap()
            .into_iter()
            .map(|flag| flag.unwrap_or(false))
            .collect();

        for flags in [&comp, &till, &comp_today, &comp_no_out, &comp_today_no_out] {
            prop_assert!(flags.iter().all(|flag| flag == "Y" || flag == "N"));
        }
        for i in 0..shaped.height() {
            if comp_today[i] == "Y" {
                prop_assert_eq!(&comp[i], "Y");
                prop_assert_eq!(&till[i], "Y");
            }
            if comp_today_no_out[i] == "Y" {
                prop_assert!(!outlier[i]);
                prop_assert_eq!(&comp_today[i], "Y");
            }
            if comp_no_out[i] == "Y" {
                prop_assert!(!outlier[i]);
                prop_assert_eq!(&comp[i], "Y");
            }
        }
    }

    #[test]
    fn comp_matches_distinct_release_count(rows in prop::collection::vec(row(), 1..40)) {
        let shaped = shape(table(&rows), &options()).unwrap();
        let releases = strings(&shaped, columns::RELEASE);
        let customers = strings(&shaped, columns::CUSTOMER);
        let areas = strings(&shaped, columns::DEDALO_AREA);
        let modes = strings(&shaped, derived::NEW_ACQUISITION_MODE);
        let comp = strings(&shaped, derived::COMP);

        let mut distinct: HashMap<(&str, &str, &str), HashSet<&str>> = HashMap::new();
        for i in 0..shaped.height() {
            distinct
                .entry((customers[i].as_str(), areas[i].as_str(), modes[i].as_str()))
                .or_default()
                .insert(releases[i].as_str());
        }
        for i in 0..shaped.height() {
            let count = distinct[&(customers[i].as_str(), areas[i].as_str(), modes[i].as_str())].len();
            let expected = if count == 2 { "Y" } else { "N" };
            prop_assert_eq!(comp[i].as_str(), expected);
        }
    }

    #[test]
    fn common_yearweeks_are_idempotent(rows in prop::collection::vec(row(), 1..40)) {
        let once = add_common_yearweeks(table(&rows)).unwrap();
        let twice = add_common_yearweeks(once.clone()).unwrap();
        prop_assert!(once.equals_missing(&twice));
    }
}
