//! Tukey fences on the interquartile range.

use super::{quantile_sorted, sorted};

/// Values outside `[max(floor, Q1 - k*IQR), Q3 + k*IQR]` are outliers.
/// Both bounds are inclusive.
pub fn iqr_outliers(values: &[f64], multiplier: f64, lower_floor: f64) -> Vec<bool> {
    if values.is_empty() {
        return Vec::new();
    }
    let sorted = sorted(values);
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = lower_floor.max(q1 - multiplier * iqr);
    let upper = q3 + multiplier * iqr;

    values
        .iter()
        .map(|value| !(lower..=upper).contains(value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_the_extreme_quantity() {
        let flags = iqr_outliers(&[10.0, 12.0, 11.0, 13.0, 9.0, 100.0], 1.5, 2.0);
        assert_eq!(flags, vec![false, false, false, false, false, true]);
    }

    #[test]
    fn lower_bound_never_drops_below_floor() {
        // Q1 = Q3 = 1, so the fence would be [1, 1]; the floor lifts it to 2.
        let flags = iqr_outliers(&[1.0, 1.0, 1.0, 1.0], 1.5, 2.0);
        assert_eq!(flags, vec![true; 4]);
    }

    #[test]
    fn bounds_are_inclusive() {
        // Q1 = 3, Q3 = 5, IQR = 2, fences [2, 8].
        let flags = iqr_outliers(&[2.0, 3.0, 4.0, 5.0, 8.0], 1.5, 2.0);
        assert!(flags.iter().all(|flag| !flag));
    }
}
