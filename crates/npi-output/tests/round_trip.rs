//! Written tables read back through the importer.

use std::collections::BTreeMap;
use std::path::Path;

use npi_ingest::read_table;
use npi_output::{OutputError, write_table};
use polars::prelude::*;

fn shaped() -> DataFrame {
    df! {
        "release" => ["2023A", "2023A", "2024A", "2024A"],
        "dedalo_area" => ["0012", "0012", "0345", "0012"],
        "qty" => [3i64, 5, 40, 7],
        "comp" => [Some("Y"), Some("N"), None, Some("Y")],
        "outlier" => [false, false, true, false],
    }
    .unwrap()
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

fn qty_by_release(df: &DataFrame) -> BTreeMap<String, i64> {
    let releases = strings(df, "release");
    let qty = strings(df, "qty");
    let mut sums = BTreeMap::new();
    for (release, qty) in releases.into_iter().zip(qty) {
        let qty: i64 = qty.unwrap().parse().unwrap();
        *sums.entry(release.unwrap()).or_insert(0) += qty;
    }
    sums
}

fn assert_text_round_trip(path: &Path) {
    write_table(&mut shaped(), path).unwrap();
    let back = read_table(path).unwrap();

    assert_eq!(back.height(), 4);
    assert_eq!(
        back.get_column_names_str(),
        vec!["release", "dedalo_area", "qty", "comp", "outlier"]
    );
    assert_eq!(
        qty_by_release(&back),
        BTreeMap::from([("2023A".to_string(), 8), ("2024A".to_string(), 47)])
    );
    assert_eq!(
        strings(&back, "dedalo_area"),
        ["0012", "0012", "0345", "0012"].map(|s| Some(s.to_string())).to_vec()
    );
    assert_eq!(strings(&back, "comp")[2], None);
    assert_eq!(strings(&back, "outlier")[2].as_deref(), Some("true"));
}

#[test]
fn csv_round_trip_keeps_rows_and_totals() {
    let dir = tempfile::tempdir().unwrap();
    assert_text_round_trip(&dir.path().join("df_comp.csv"));
}

#[test]
fn xlsx_round_trip_keeps_rows_and_totals() {
    let dir = tempfile::tempdir().unwrap();
    assert_text_round_trip(&dir.path().join("df_comp.xlsx"));
}

#[test]
fn parquet_round_trip_keeps_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("df_comp.parquet");
    let original = shaped();
    write_table(&mut original.clone(), &path).unwrap();

    let back = read_table(&path).unwrap();
    assert!(back.equals_missing(&original));
    assert_eq!(back.column("outlier").unwrap().dtype(), &DataType::Boolean);
}

#[test]
fn rewriting_replaces_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("df_comp.xlsx");
    write_table(&mut shaped(), &path).unwrap();

    let mut smaller = shaped().head(Some(1));
    write_table(&mut smaller, &path).unwrap();
    assert_eq!(read_table(&path).unwrap().height(), 1);
}

#[test]
fn unsupported_output_extension_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = write_table(&mut shaped(), &dir.path().join("df_comp.xls")).unwrap_err();
    assert!(matches!(err, OutputError::UnsupportedFormat { .. }));
}
