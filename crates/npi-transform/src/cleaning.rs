//! Cleaning: customer type normalization, aggregation and the area join.

use std::collections::BTreeMap;
use std::time::Instant;

use npi_model::CleaningOptions;
use npi_model::schema::{GROUPING_KEYS, columns};
use polars::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::error::{Result, TransformError};

const ROW_INDEX: &str = "__row_index";

/// Normalize `customer_type` through the replacement table, then fill nulls
/// with the most frequent value.
///
/// Ties resolve to the lexicographically smallest value. An all-null column
/// stays null.
pub fn replacing_values(mut df: DataFrame, options: &CleaningOptions) -> Result<DataFrame> {
    let replacements = &options.customer_type_replacements;
    let replaced: Vec<Option<String>> = df
        .column(columns::CUSTOMER_TYPE)?
        .str()?
        .into_iter()
        .map(|value| {
            value.map(|raw| {
                replacements
                    .get(raw)
                    .cloned()
                    .unwrap_or_else(|| raw.to_string())
            })
        })
        .collect();

    let mode = most_frequent(&replaced);
    match &mode {
        Some(value) => debug!(mode = %value, "filling missing customer types"),
        None => warn!("customer_type has no values, missing entries stay null"),
    }

    let filled: Vec<Option<String>> = replaced
        .into_iter()
        .map(|value| value.or_else(|| mode.clone()))
        .collect();
    df.with_column(Series::new(columns::CUSTOMER_TYPE.into(), filled))?;
    Ok(df)
}

fn most_frequent(values: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

/// Aggregate `qty` over the dimension tuple.
///
/// Groups keep their order of first appearance; columns outside the tuple
/// are dropped.
pub fn grouping(df: DataFrame) -> Result<DataFrame> {
    let keys: Vec<Expr> = GROUPING_KEYS.iter().map(|key| col(*key)).collect();
    Ok(df
        .lazy()
        .group_by_stable(keys)
        .agg([col(columns::QTY).sum()])
        .collect()?)
}

/// Left join of the `dedalo_area → launch_type` lookup.
///
/// The row count must not change; otherwise the lookup holds duplicate keys.
pub fn join_area_lookup(df: DataFrame, lookup: &DataFrame) -> Result<DataFrame> {
    let before = df.height();
    let joined = df
        .lazy()
        .with_row_index(ROW_INDEX, None)
        .join(
            lookup.clone().lazy(),
            [col(columns::DEDALO_AREA)],
            [col(columns::DEDALO_AREA)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([ROW_INDEX], SortMultipleOptions::default())
        .collect()?
        .drop(ROW_INDEX)?;

    let after = joined.height();
    if after != before {
        return Err(TransformError::MergeCardinality { before, after });
    }
    Ok(joined)
}

/// Full cleaning step: replace values, aggregate, optionally join the lookup.
pub fn cleaning(
    df: DataFrame,
    options: &CleaningOptions,
    lookup: Option<&DataFrame>,
) -> Result<DataFrame> {
    let span = info_span!("clean", rows_in = df.height());
    let _guard = span.enter();
    let start = Instant::now();

    let df = replacing_values(df, options)?;
    let mut df = grouping(df)?;
    if let Some(lookup) = lookup {
        df = join_area_lookup(df, lookup)?;
    }

    info!(
        rows = df.height(),
        duration_ms = start.elapsed().as_millis(),
        "cleaning complete"
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use npi_model::schema::lookup as lookup_columns;

    fn orders() -> DataFrame {
        let n = 4;
        let text = |value: &str| vec![Some(value.to_string()); n];
        df! {
            columns::RELEASE => text("2024A"),
            columns::BRAND => text("RB"),
            columns::PLANNED_DELIVERY_YEARWEEK => vec![202405i64; n],
            columns::CREATION_YEARWEEK => vec![202403i64, 202403, 202404, 202403],
            columns::CUSTOMER => vec![Some("C1"), Some("C1"), Some("C1"), Some("C2")],
            columns::CUSTOMER_SOLD_TO => text("ACME"),
            columns::DIVISION => text("SUN"),
            columns::DEDALO_AREA => vec![Some("A01"), Some("A01"), Some("A01"), Some("A02")],
            columns::ACQUISITION_MODE_GROUP => text("REP"),
            columns::CUSTOMER_TYPE => vec![Some("BPF"), None, Some("P"), Some("PF")],
            columns::QTY => vec![2i64, 3, 4, 5],
        }
        .unwrap()
    }

    #[test]
    fn replacing_maps_and_fills_with_mode() {
        let df = replacing_values(orders(), &CleaningOptions::default()).unwrap();
        let values: Vec<Option<&str>> = df
            .column(columns::CUSTOMER_TYPE)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        // BP once, P twice after mapping PF -> P.
        assert_eq!(values, vec![Some("BP"), Some("P"), Some("P"), Some("P")]);
    }

    #[test]
    fn mode_ties_pick_smallest_value() {
        let values = vec![
            Some("Z".to_string()),
            Some("A".to_string()),
            None,
            Some("Z".to_string()),
            Some("A".to_string()),
        ];
        assert_eq!(most_frequent(&values), Some("A".to_string()));
        assert_eq!(most_frequent(&[None, None]), None);
    }

    #[test]
    fn grouping_sums_qty_and_drops_extra_columns() {
        let df = grouping(orders()).unwrap();
        assert_eq!(df.height(), 3);
        assert!(df.column(columns::CUSTOMER_TYPE).is_err());

        let qty: Vec<Option<i64>> = df
            .column(columns::QTY)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(qty, vec![Some(5), Some(4), Some(5)]);
    }

    #[test]
    fn lookup_join_keeps_rows_and_order() {
        let grouped = grouping(orders()).unwrap();
        let lookup = df! {
            columns::DEDALO_AREA => ["A02", "A01"],
            lookup_columns::LAUNCH_TYPE => ["LATE", "EARLY"],
        }
        .unwrap();

        let joined = join_area_lookup(grouped, &lookup).unwrap();
        assert_eq!(joined.height(), 3);
        let launch: Vec<Option<&str>> = joined
            .column(lookup_columns::LAUNCH_TYPE)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(launch, vec![Some("EARLY"), Some("EARLY"), Some("LATE")]);
    }

    #[test]
    fn duplicate_lookup_keys_break_cardinality() {
        let grouped = grouping(orders()).unwrap();
        let lookup = df! {
            columns::DEDALO_AREA => ["A01", "A01"],
            lookup_columns::LAUNCH_TYPE => ["EARLY", "LATE"],
        }
        .unwrap();

        let err = join_area_lookup(grouped, &lookup).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MergeCardinality { before: 3, after: 5 }
        ));
    }
}
