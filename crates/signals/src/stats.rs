//! Small statistics helpers shared by the VWAP and channel engines.

/// Ordinary least-squares fit of `values` against their index.
/// Returns `(slope, intercept)`. Fewer than two points fit a flat line.
#[must_use]
pub fn linear_fit(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n < 2 {
        return (0.0, values.first().copied().unwrap_or(0.0));
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n_f;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        covariance += dx * (y - y_mean);
        variance += dx * dx;
    }

    let slope = covariance / variance;
    (slope, y_mean - slope * x_mean)
}

/// OLS slope of `values` against their index; positive = rising.
#[must_use]
pub fn ols_slope(values: &[f64]) -> f64 {
    linear_fit(values).0
}

/// Sample standard deviation (ddof = 1). A single observation has no spread
/// and yields zero rather than blocking the caller.
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::assert_approx;

    #[test]
    fn linear_fit_recovers_an_exact_line() {
        // y = 3x + 2
        let values = [2.0, 5.0, 8.0, 11.0];
        let (slope, intercept) = linear_fit(&values);
        assert_approx(slope, 3.0, 1e-12);
        assert_approx(intercept, 2.0, 1e-12);
    }

    #[test]
    fn linear_fit_of_a_constant_series_is_flat() {
        let (slope, intercept) = linear_fit(&[7.0, 7.0, 7.0, 7.0, 7.0]);
        assert_approx(slope, 0.0, 1e-12);
        assert_approx(intercept, 7.0, 1e-12);
    }

    #[test]
    fn linear_fit_degenerates_gracefully() {
        assert_eq!(linear_fit(&[]), (0.0, 0.0));
        assert_eq!(linear_fit(&[4.2]), (0.0, 4.2));
    }

    #[test]
    fn sample_std_known_value() {
        // mean 5, squared diffs 8+2+2+8 = 20, /3 => sqrt(20/3)
        let sd = sample_std(&[2.0, 4.0, 6.0, 8.0]);
        assert_approx(sd, (20.0_f64 / 3.0).sqrt(), 1e-12);
    }

    #[test]
    fn sample_std_of_fewer_than_two_is_zero() {
        assert_eq!(sample_std(&[]), 0.0);
        assert_eq!(sample_std(&[9.0]), 0.0);
    }
}
