//! Distributional risk summary for one return series.

use chrono::{DateTime, Utc};
use quant_core::math::statistics::{excess_kurtosis, skewness, sorted_ascending};
use quant_core::{require_observations, Position, QuantError, QuantResult};
use serde::{Deserialize, Serialize};

use crate::historical::{cvar_from_sorted, max_drawdown, tail_ratio, validate_value, var_from_sorted};
use crate::stress::{portfolio_stress_test, stress_test, StressTestResult};

/// Risk profile of an exposure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Instrument, or `PORTFOLIO` for the aggregate
    pub symbol: String,
    /// 95% historical VaR
    pub var_95: f64,
    /// 99% historical VaR
    pub var_99: f64,
    /// 95% historical CVaR
    pub cvar_95: f64,
    /// 99% historical CVaR
    pub cvar_99: f64,
    /// Sample skewness
    pub skewness: f64,
    /// Sample excess kurtosis
    pub kurtosis: f64,
    /// Largest cumulative drawdown (fractional)
    pub max_drawdown: f64,
    /// Upper over lower tail mean
    pub tail_ratio: f64,
    /// Catalogue stress results
    pub stress_results: Vec<StressTestResult>,
    /// When the metrics were computed
    pub computed_at: DateTime<Utc>,
}

/// Symbol reported for portfolio aggregates.
pub const PORTFOLIO_SYMBOL: &str = "PORTFOLIO";

/// Trailing `lookback` observations.
#[inline]
pub(crate) fn tail_window(returns: &[f64], lookback: usize) -> &[f64] {
    &returns[returns.len() - lookback.min(returns.len())..]
}

fn summarise(
    symbol: &str,
    returns: &[f64],
    value: f64,
    stress_results: Vec<StressTestResult>,
) -> RiskMetrics {
    let sorted = sorted_ascending(returns);
    RiskMetrics {
        symbol: symbol.to_string(),
        var_95: var_from_sorted(&sorted, 0.95, value),
        var_99: var_from_sorted(&sorted, 0.99, value),
        cvar_95: cvar_from_sorted(&sorted, 0.95, value),
        cvar_99: cvar_from_sorted(&sorted, 0.99, value),
        skewness: skewness(returns),
        kurtosis: excess_kurtosis(returns),
        max_drawdown: max_drawdown(returns),
        tail_ratio: tail_ratio(returns),
        stress_results,
        computed_at: Utc::now(),
    }
}

/// Risk metrics for one exposure of `value` over its trailing `lookback`
/// returns.
///
/// # Errors
/// `InvalidParameter` for a non-positive value; `InsufficientData` for
/// fewer than 30 observations.
pub fn compute_risk_metrics(
    symbol: &str,
    returns: &[f64],
    lookback: usize,
    value: f64,
) -> QuantResult<RiskMetrics> {
    validate_value(value)?;
    let window = tail_window(returns, lookback);
    require_observations(window.len())?;
    Ok(summarise(symbol, window, value, stress_test(window, value)))
}

/// Value-weighted portfolio return series over the common trailing window.
///
/// # Errors
/// `InvalidParameter` if the portfolio value is not positive or the inputs
/// differ in length.
pub fn portfolio_returns(positions: &[Position], series: &[Vec<f64>]) -> QuantResult<Vec<f64>> {
    if positions.len() != series.len() {
        return Err(QuantError::invalid(
            "series",
            series.len() as f64,
            "must match the number of positions",
        ));
    }
    let total: f64 = positions.iter().map(Position::market_value).sum();
    validate_value(total)?;

    let n = series.iter().map(Vec::len).min().unwrap_or(0);
    let mut combined = vec![0.0; n];
    for (position, returns) in positions.iter().zip(series) {
        let weight = position.market_value() / total;
        for (acc, r) in combined.iter_mut().zip(tail_window(returns, n)) {
            *acc += weight * r;
        }
    }
    Ok(combined)
}

/// Risk metrics of the value-weighted portfolio.
///
/// # Errors
/// As [`portfolio_returns`], plus `InsufficientData` for fewer than 30
/// common observations.
pub fn compute_portfolio_metrics(
    positions: &[Position],
    series: &[Vec<f64>],
    lookback: usize,
) -> QuantResult<RiskMetrics> {
    let combined = portfolio_returns(positions, series)?;
    let window = tail_window(&combined, lookback);
    require_observations(window.len())?;
    let total: f64 = positions.iter().map(Position::market_value).sum();
    Ok(summarise(
        PORTFOLIO_SYMBOL,
        window,
        total,
        portfolio_stress_test(positions, window),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wave(n: usize, scale: f64) -> Vec<f64> {
        (0..n).map(|i| scale * (0.9 * i as f64).sin()).collect()
    }

    #[test]
    fn test_metrics_fields_are_consistent() {
        let returns = wave(252, 0.02);
        let metrics = compute_risk_metrics("SIN", &returns, 252, 50_000.0).unwrap();
        assert!(metrics.cvar_95 >= metrics.var_95);
        assert!(metrics.cvar_99 >= metrics.var_99);
        assert!(metrics.max_drawdown >= 0.0);
        assert_eq!(metrics.stress_results.len(), 5);
        assert_relative_eq!(metrics.stress_results[0].portfolio_impact, -15_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lookback_limits_window() {
        let mut returns = vec![-0.5; 100];
        returns.extend(wave(60, 0.01));
        let metrics = compute_risk_metrics("X", &returns, 60, 1.0).unwrap();
        assert!(metrics.var_99 <= 0.01 + 1e-12);
    }

    #[test]
    fn test_insufficient_history() {
        let err = compute_risk_metrics("X", &wave(20, 0.01), 252, 1.0).unwrap_err();
        assert_eq!(err, QuantError::InsufficientData { got: 20, need: 30 });
    }

    #[test]
    fn test_portfolio_returns_weighting() {
        let positions = vec![Position::new("A", 1.0, 75.0), Position::new("B", 1.0, 25.0)];
        let series = vec![vec![0.9, 0.04, 0.02], vec![0.0, 0.08]];
        let combined = portfolio_returns(&positions, &series).unwrap();
        assert_eq!(combined.len(), 2);
        assert_relative_eq!(combined[0], 0.75 * 0.04, epsilon = 1e-15);
        assert_relative_eq!(combined[1], 0.75 * 0.02 + 0.25 * 0.08, epsilon = 1e-15);
    }

    #[test]
    fn test_portfolio_requires_positive_value() {
        let positions = vec![Position::new("A", 0.0, 75.0)];
        assert!(portfolio_returns(&positions, &[vec![0.01]]).is_err());
    }
}
