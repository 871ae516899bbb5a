//! Historical-simulation risk estimators.
//!
//! ## Conventions
//!
//! - Returns are daily fractional returns, oldest first
//! - VaR and CVaR are reported as positive currency amounts
//! - The tail index is `⌊(1 − confidence)·n⌋`, clamped to `[0, n − 1]`

use quant_core::math::statistics::{mean, sorted_ascending};
use quant_core::{require_observations, QuantError, QuantResult};

/// Fraction of observations in each tail bucket of [`tail_ratio`].
pub const TAIL_FRACTION: f64 = 0.05;

/// Reject confidence levels outside the open interval (0, 1).
pub fn validate_confidence(confidence: f64) -> QuantResult<()> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(QuantError::invalid(
            "confidence",
            confidence,
            "must lie strictly between 0 and 1",
        ))
    }
}

/// Reject non-positive or non-finite portfolio values.
pub fn validate_value(value: f64) -> QuantResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(QuantError::invalid("value", value, "must be positive"))
    }
}

/// Index of the VaR quantile in an ascending sample of length `n > 0`.
#[inline]
pub fn tail_index(n: usize, confidence: f64) -> usize {
    let idx = ((1.0 - confidence) * n as f64).floor();
    (idx.max(0.0) as usize).min(n.saturating_sub(1))
}

/// VaR of an already sorted, non-empty sample.
#[inline]
pub fn var_from_sorted(sorted: &[f64], confidence: f64, value: f64) -> f64 {
    (sorted[tail_index(sorted.len(), confidence)] * value).abs()
}

/// CVaR of an already sorted, non-empty sample.
///
/// Never below the VaR at the same level: when the quantile itself is a gain
/// the absolute tail mean can fall under it, and VaR is reported instead.
#[inline]
pub fn cvar_from_sorted(sorted: &[f64], confidence: f64, value: f64) -> f64 {
    let idx = tail_index(sorted.len(), confidence);
    let tail_mean = (mean(&sorted[..=idx]) * value).abs();
    tail_mean.max(var_from_sorted(sorted, confidence, value))
}

/// Historical Value at Risk.
///
/// # Errors
/// `InvalidParameter` for a confidence outside (0, 1) or non-positive value;
/// `InsufficientData` for fewer than 30 observations.
///
/// # Examples
/// ```
/// use quant_risk::historical::historical_var;
///
/// let returns: Vec<f64> = (0..100).map(|i| (i as f64 - 50.0) / 1000.0).collect();
/// // 5th smallest return is -0.045
/// let var = historical_var(&returns, 0.95, 1_000_000.0).unwrap();
/// assert!((var - 45_000.0).abs() < 1e-6);
/// ```
pub fn historical_var(returns: &[f64], confidence: f64, value: f64) -> QuantResult<f64> {
    validate_confidence(confidence)?;
    validate_value(value)?;
    require_observations(returns.len())?;
    Ok(var_from_sorted(&sorted_ascending(returns), confidence, value))
}

/// Historical Conditional VaR (expected shortfall).
///
/// # Errors
/// As [`historical_var`].
pub fn historical_cvar(returns: &[f64], confidence: f64, value: f64) -> QuantResult<f64> {
    validate_confidence(confidence)?;
    validate_value(value)?;
    require_observations(returns.len())?;
    Ok(cvar_from_sorted(&sorted_ascending(returns), confidence, value))
}

/// Largest peak-to-trough fall of the cumulative additive return path.
///
/// The path starts at 0, so an immediate loss counts as a drawdown.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;
    for r in returns {
        cumulative += r;
        peak = peak.max(cumulative);
        worst = worst.max(peak - cumulative);
    }
    worst
}

/// Mean of the best 5% over the absolute mean of the worst 5%.
///
/// Each bucket holds `max(1, ⌊0.05·n⌋)` observations. Returns 0 for an empty
/// sample or a zero denominator.
pub fn tail_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let sorted = sorted_ascending(returns);
    let n = sorted.len();
    let bucket = ((TAIL_FRACTION * n as f64).floor() as usize).max(1);
    let bottom = mean(&sorted[..bucket]).abs();
    if bottom == 0.0 {
        return 0.0;
    }
    mean(&sorted[n - bucket..]) / bottom
}
