//! Modified z-score on the median absolute deviation.

use super::median;

/// Scale that makes the MAD consistent with the standard deviation.
const CONSISTENCY: f64 = 0.6745;

/// `|0.6745 * (x - median) / MAD| > threshold`.
///
/// With a zero MAD every value away from the median scores infinity and is
/// flagged, values equal to the median score NaN and are not.
pub fn mad_outliers(values: &[f64], threshold: f64) -> Vec<bool> {
    if values.is_empty() {
        return Vec::new();
    }
    let center = median(values);
    let deviations: Vec<f64> = values.iter().map(|value| (value - center).abs()).collect();
    let mad = median(&deviations);

    values
        .iter()
        .map(|value| (CONSISTENCY * (value - center) / mad).abs() > threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_far_values() {
        let flags = mad_outliers(&[10.0, 12.0, 11.0, 13.0, 9.0, 100.0], 3.5);
        assert_eq!(flags, vec![false, false, false, false, false, true]);
    }

    #[test]
    fn zero_mad_flags_everything_off_the_median() {
        let flags = mad_outliers(&[5.0, 5.0, 5.0, 5.0, 6.0], 3.5);
        assert_eq!(flags, vec![false, false, false, false, true]);
    }
}
