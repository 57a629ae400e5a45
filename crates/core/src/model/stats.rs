//! Small numeric helpers shared by the aggregation types.

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median over a copy of the values, `None` for an empty slice.
#[must_use]
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population variance, `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn variance(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    Some(
        values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / values.len() as f64,
    )
}

/// Population standard deviation, `None` for an empty slice.
#[must_use]
pub(crate) fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// Percent change of the second-half mean against the first-half mean of a
/// chronological series. Zero below two data points or when the first half
/// averages zero.
#[must_use]
pub(crate) fn halves_improvement(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mid = values.len() / 2;
    let (first, second) = values.split_at(mid);
    let (Some(first_mean), Some(second_mean)) = (mean(first), mean(second)) else {
        return 0.0;
    };
    if first_mean == 0.0 {
        return 0.0;
    }
    (second_mean - first_mean) / first_mean * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[80.0, 60.0]), Some(70.0));
    }

    #[test]
    fn median_handles_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn variance_of_constant_series_is_zero() {
        assert_eq!(variance(&[5.0, 5.0, 5.0]), Some(0.0));
        let v = variance(&[2.0, 4.0]).unwrap();
        assert!((v - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn halves_improvement_compares_second_half_to_first() {
        // first half mean 50, second half mean 90 -> +80%
        let change = halves_improvement(&[50.0, 90.0]);
        assert!((change - 80.0).abs() < 1e-9);
        assert_eq!(halves_improvement(&[70.0]), 0.0);
        assert_eq!(halves_improvement(&[]), 0.0);
    }

    #[test]
    fn halves_improvement_uneven_split_favors_second_half() {
        // split_at(1): first [60], second [60, 90] -> mean 75 -> +25%
        let change = halves_improvement(&[60.0, 60.0, 90.0]);
        assert!((change - 25.0).abs() < 1e-9);
    }
}
