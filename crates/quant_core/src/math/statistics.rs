//! Descriptive statistics over return samples.
//!
//! First and second moments come from [`statrs::statistics::Statistics`];
//! the bias-corrected shape statistics are built on top of them.

use statrs::statistics::Statistics;

/// Trading days per year used for annualisation.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Arithmetic mean. Returns 0 for an empty slice.
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

/// Sample variance with Bessel's correction (n − 1 denominator).
///
/// Returns 0 for fewer than two observations.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().variance()
}

/// Sample standard deviation.
#[inline]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Annualised volatility of a daily return sample.
#[inline]
pub fn annualised_volatility(daily_returns: &[f64]) -> f64 {
    sample_std_dev(daily_returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Population second moment and the `power`-th central moment, or `None`
/// for a constant sample.
fn central_moments(values: &[f64], power: i32) -> Option<(f64, f64)> {
    let m2 = values.iter().population_variance();
    if !(m2 > f64::EPSILON * f64::EPSILON) {
        return None;
    }
    let m = mean(values);
    let mk = values.iter().map(|v| (v - m).powi(power)).sum::<f64>() / values.len() as f64;
    Some((m2, mk))
}

/// Sample skewness (adjusted Fisher-Pearson standardised moment).
///
/// G₁ = √(n(n−1)) / (n−2) · m₃ / m₂^{3/2}
///
/// Returns 0 for fewer than three observations or a constant sample.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }
    let Some((m2, m3)) = central_moments(values, 3) else {
        return 0.0;
    };
    let nf = n as f64;
    let g1 = m3 / m2.powf(1.5);
    (nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1
}

/// Sample excess kurtosis (bias-corrected G₂).
///
/// Returns 0 for fewer than four observations or a constant sample. A normal
/// sample has excess kurtosis near 0.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 4 {
        return 0.0;
    }
    let Some((m2, m4)) = central_moments(values, 4) else {
        return 0.0;
    };
    let nf = n as f64;
    let g2 = m4 / (m2 * m2) - 3.0;
    ((nf + 1.0) * g2 + 6.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0))
}

/// Returns an ascending sorted copy; NaNs sort last.
pub fn sorted_ascending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Coefficient of variation `stdev / |mean|`.
///
/// Returns `None` when the mean is indistinguishable from zero.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values);
    if m.abs() < 1e-12 {
        return None;
    }
    Some(sample_std_dev(values) / m.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_variance() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(mean(&xs), 3.0);
        assert_relative_eq!(sample_variance(&xs), 2.5);
        assert_relative_eq!(sample_std_dev(&xs), 2.5_f64.sqrt());
    }

    #[test]
    fn test_shape_statistics_reference_values() {
        let xs = [1.0, 2.0, 3.0, 4.0, 10.0];
        assert_relative_eq!(skewness(&xs), 1.697_056_274_847_714, epsilon = 1e-12);
        assert_relative_eq!(excess_kurtosis(&xs), 3.152, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_and_singleton() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(sample_variance(&[1.0]), 0.0);
        assert_eq!(skewness(&[1.0, 2.0]), 0.0);
        assert_eq!(excess_kurtosis(&[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_symmetric_sample_has_zero_skew() {
        let xs = [-2.0, -1.0, 0.0, 1.0, 2.0];
        assert_relative_eq!(skewness(&xs), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_right_skewed_sample() {
        let xs = [0.0, 0.0, 0.0, 0.0, 10.0];
        assert!(skewness(&xs) > 0.0);
    }

    #[test]
    fn test_constant_sample_moments() {
        let xs = [0.01; 40];
        assert_eq!(skewness(&xs), 0.0);
        assert_eq!(excess_kurtosis(&xs), 0.0);
    }

    #[test]
    fn test_heavy_tail_kurtosis_positive() {
        let mut xs = vec![0.0; 50];
        xs[0] = 5.0;
        xs[1] = -5.0;
        assert!(excess_kurtosis(&xs) > 3.0);
    }

    #[test]
    fn test_sorted_ascending() {
        let xs = [0.3, -0.1, 0.2];
        assert_eq!(sorted_ascending(&xs), vec![-0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert!(coefficient_of_variation(&[0.0, 0.0]).is_none());
        let cv = coefficient_of_variation(&[1.0, 1.0, 1.0]).unwrap();
        assert_relative_eq!(cv, 0.0);
    }
}
