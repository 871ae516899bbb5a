//! Monte Carlo simulation of cumulative horizon returns.
//!
//! Each outcome is the sum of `horizon_days` i.i.d. `Normal(mean, vol)`
//! daily draws. Outcomes are generated in fixed-size chunks; chunk `c` draws
//! from a `StdRng` seeded by `(seed, c)`, so the sample is a pure function of
//! `(mean, vol, simulations, horizon_days, seed)` regardless of how many
//! threads rayon uses.

use chrono::{DateTime, Utc};
use quant_core::math::statistics::{mean, sample_std_dev, sorted_ascending};
use quant_core::{require_observations, CancellationFlag, MonteCarloSettings, QuantError, QuantResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::historical::{cvar_from_sorted, validate_value, var_from_sorted};
use crate::metrics::tail_window;

/// Maximum number of simulated outcomes.
pub const MAX_SIMULATIONS: usize = 10_000_000;

/// Outcomes generated per RNG stream.
pub const CHUNK_SIZE: usize = 1_024;

/// Validated simulation parameters.
///
/// Use [`MonteCarloConfig::builder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use quant_risk::MonteCarloConfig;
///
/// let config = MonteCarloConfig::builder()
///     .simulations(10_000)
///     .horizon_days(22)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.simulations(), 10_000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonteCarloConfig {
    simulations: usize,
    horizon_days: usize,
    seed: u64,
}

impl MonteCarloConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Configuration from the shared defaults.
    pub fn from_settings(settings: &MonteCarloSettings) -> QuantResult<Self> {
        Self::builder()
            .simulations(settings.simulations)
            .horizon_days(settings.horizon_days)
            .seed(settings.seed)
            .build()
    }

    /// Returns the number of simulated outcomes.
    #[inline]
    pub fn simulations(&self) -> usize {
        self.simulations
    }

    /// Returns the horizon in trading days.
    #[inline]
    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    /// Returns the base seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `simulations` is 0 or above 10,000,000, or
    /// `horizon_days` is 0.
    pub fn validate(&self) -> QuantResult<()> {
        if self.simulations == 0 || self.simulations > MAX_SIMULATIONS {
            return Err(QuantError::invalid(
                "simulations",
                self.simulations as f64,
                "must be in [1, 10000000]",
            ));
        }
        if self.horizon_days == 0 {
            return Err(QuantError::invalid(
                "horizon_days",
                0.0,
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Builder for [`MonteCarloConfig`].
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    simulations: Option<usize>,
    horizon_days: Option<usize>,
    seed: u64,
}

impl MonteCarloConfigBuilder {
    /// Sets the number of simulated outcomes.
    #[inline]
    pub fn simulations(mut self, simulations: usize) -> Self {
        self.simulations = Some(simulations);
        self
    }

    /// Sets the horizon in trading days.
    #[inline]
    pub fn horizon_days(mut self, horizon_days: usize) -> Self {
        self.horizon_days = Some(horizon_days);
        self
    }

    /// Sets the base seed (default 0).
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if a count is missing or out of range.
    pub fn build(self) -> QuantResult<MonteCarloConfig> {
        let config = MonteCarloConfig {
            simulations: self.simulations.unwrap_or(0),
            horizon_days: self.horizon_days.unwrap_or(0),
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Summary of a simulated horizon distribution, scaled to the exposure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Simulated instrument
    pub symbol: String,
    /// Number of outcomes
    pub simulations: usize,
    /// Horizon in trading days
    pub horizon_days: usize,
    /// 95% VaR
    pub var_95: f64,
    /// 99% VaR
    pub var_99: f64,
    /// 95% CVaR
    pub cvar_95: f64,
    /// 99% CVaR
    pub cvar_99: f64,
    /// Mean outcome × value
    pub expected_return: f64,
    /// Standard deviation of outcomes × value
    pub volatility: f64,
    /// Best outcome × value
    pub best_case: f64,
    /// Worst outcome × value
    pub worst_case: f64,
    /// When the simulation ran
    pub simulated_at: DateTime<Utc>,
}

/// Seed for chunk `chunk` derived from the base seed.
#[inline]
pub fn chunk_seed(seed: u64, chunk: usize) -> u64 {
    seed ^ (chunk as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Simulate cumulative horizon returns.
///
/// The cancellation flag is polled before each chunk.
///
/// # Errors
/// `InvalidParameter` for a negative or non-finite volatility; `Cancelled`
/// if the flag is set.
pub fn simulate_outcomes(
    daily_mean: f64,
    daily_volatility: f64,
    config: &MonteCarloConfig,
    cancel: &CancellationFlag,
) -> QuantResult<Vec<f64>> {
    let normal = Normal::new(daily_mean, daily_volatility).map_err(|_| {
        QuantError::invalid("volatility", daily_volatility, "must be finite and non-negative")
    })?;
    let n = config.simulations;
    let horizon = config.horizon_days;
    let chunks = n.div_ceil(CHUNK_SIZE);

    let outcomes: Vec<Vec<f64>> = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            cancel.check()?;
            let mut rng = StdRng::seed_from_u64(chunk_seed(config.seed, chunk));
            let len = CHUNK_SIZE.min(n - chunk * CHUNK_SIZE);
            let chunk_outcomes: Vec<f64> = (0..len)
                .map(|_| (0..horizon).map(|_| normal.sample(&mut rng)).sum())
                .collect();
            Ok(chunk_outcomes)
        })
        .collect::<QuantResult<Vec<Vec<f64>>>>()?;

    Ok(outcomes.concat())
}

/// Simulate `symbol` from its last `lookback` returns and summarise.
///
/// # Errors
/// `InvalidParameter` for a non-positive value, `InsufficientData` for
/// fewer than 30 observations, `Cancelled` on cancellation.
pub fn run_simulation(
    symbol: &str,
    returns: &[f64],
    lookback: usize,
    config: &MonteCarloConfig,
    value: f64,
    cancel: &CancellationFlag,
) -> QuantResult<MonteCarloResult> {
    validate_value(value)?;
    let history = tail_window(returns, lookback);
    require_observations(history.len())?;

    let daily_mean = mean(history);
    let daily_volatility = sample_std_dev(history);
    let outcomes = simulate_outcomes(daily_mean, daily_volatility, config, cancel)?;
    let sorted = sorted_ascending(&outcomes);

    let result = MonteCarloResult {
        symbol: symbol.to_string(),
        simulations: config.simulations,
        horizon_days: config.horizon_days,
        var_95: var_from_sorted(&sorted, 0.95, value),
        var_99: var_from_sorted(&sorted, 0.99, value),
        cvar_95: cvar_from_sorted(&sorted, 0.95, value),
        cvar_99: cvar_from_sorted(&sorted, 0.99, value),
        expected_return: mean(&outcomes) * value,
        volatility: sample_std_dev(&outcomes) * value,
        best_case: sorted[sorted.len() - 1] * value,
        worst_case: sorted[0] * value,
        simulated_at: Utc::now(),
    };
    info!(
        symbol,
        simulations = config.simulations,
        horizon_days = config.horizon_days,
        var_95 = result.var_95,
        "monte carlo complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(simulations: usize, horizon_days: usize, seed: u64) -> MonteCarloConfig {
        MonteCarloConfig::builder()
            .simulations(simulations)
            .horizon_days(horizon_days)
            .seed(seed)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_rejects_zero_counts() {
        assert!(MonteCarloConfig::builder().horizon_days(5).build().is_err());
        assert!(matches!(
            MonteCarloConfig::builder().simulations(10).horizon_days(0).build(),
            Err(QuantError::InvalidParameter { name: "horizon_days", .. })
        ));
        assert!(MonteCarloConfig::builder()
            .simulations(MAX_SIMULATIONS + 1)
            .horizon_days(1)
            .build()
            .is_err());
    }

    #[test]
    fn test_outcome_count_spans_partial_chunk() {
        let outcomes =
            simulate_outcomes(0.0, 0.01, &config(2_500, 3, 1), &CancellationFlag::new()).unwrap();
        assert_eq!(outcomes.len(), 2_500);
    }

    #[test]
    fn test_independent_of_thread_count() {
        let cfg = config(5_000, 10, 99);
        let run = |threads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap()
                .install(|| simulate_outcomes(0.0005, 0.02, &cfg, &CancellationFlag::new()))
                .unwrap()
        };
        assert_eq!(run(1), run(4));
    }

    #[test]
    fn test_seed_changes_sample() {
        let a = simulate_outcomes(0.0, 0.02, &config(100, 5, 1), &CancellationFlag::new()).unwrap();
        let b = simulate_outcomes(0.0, 0.02, &config(100, 5, 2), &CancellationFlag::new()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_volatility_is_deterministic_drift() {
        let outcomes =
            simulate_outcomes(0.001, 0.0, &config(10, 20, 3), &CancellationFlag::new()).unwrap();
        for o in outcomes {
            assert_relative_eq!(o, 0.02, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancellationFlag::new();
        cancel.cancel();
        assert_eq!(
            simulate_outcomes(0.0, 0.02, &config(10_000, 22, 42), &cancel),
            Err(QuantError::Cancelled)
        );
    }

    #[test]
    fn test_summary_ordering() {
        let returns: Vec<f64> = (0..252).map(|i| 0.02 * ((i * 7919 % 101) as f64 / 50.0 - 1.0)).collect();
        let result = run_simulation(
            "X",
            &returns,
            252,
            &config(10_000, 22, 42),
            100_000.0,
            &CancellationFlag::new(),
        )
        .unwrap();
        assert!(result.cvar_95 >= result.var_95);
        assert!(result.cvar_99 >= result.var_99);
        assert!(result.var_99 >= result.var_95);
        assert!(result.worst_case <= result.expected_return);
        assert!(result.best_case >= result.expected_return);
    }
}
