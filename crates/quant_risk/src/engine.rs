//! Risk engine: provider-backed risk metrics, simulation and attribution.

use futures::future::{join_all, try_join_all};
use quant_core::{
    AnalyticsConfig, CancellationFlag, Fingerprint, MonteCarloSettings, Position, PositionStore,
    QuantError, QuantResult, ResultCache, ReturnProvider,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::component::{self, ComponentVarReport};
use crate::metrics::{self, RiskMetrics};
use crate::monte_carlo::{run_simulation, MonteCarloConfig, MonteCarloResult};
use crate::stress::{self, StressTestResult};

/// One entry of a batch Monte Carlo request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloRequest {
    /// Instrument to simulate
    pub symbol: String,
    /// Number of outcomes
    pub simulations: usize,
    /// Horizon in trading days
    pub horizon_days: usize,
    /// Exposure value
    pub value: f64,
}

/// Risk engine over a return provider and a position store.
pub struct RiskEngine<P, S> {
    provider: P,
    positions: S,
    monte_carlo: MonteCarloSettings,
    metrics_cache: ResultCache<RiskMetrics>,
    simulation_cache: ResultCache<MonteCarloResult>,
}

impl<P: ReturnProvider, S: PositionStore> RiskEngine<P, S> {
    /// Create an engine with the configured risk cache and simulation
    /// defaults.
    pub fn new(provider: P, positions: S, config: &AnalyticsConfig) -> Self {
        let settings = config.risk_cache;
        Self {
            provider,
            positions,
            monte_carlo: config.monte_carlo,
            metrics_cache: ResultCache::new("risk", settings.ttl(), settings.capacity),
            simulation_cache: ResultCache::new("monte_carlo", settings.ttl(), settings.capacity),
        }
    }

    /// Cache of single-symbol risk metrics.
    pub fn metrics_cache(&self) -> &ResultCache<RiskMetrics> {
        &self.metrics_cache
    }

    /// Cache of Monte Carlo results.
    pub fn simulation_cache(&self) -> &ResultCache<MonteCarloResult> {
        &self.simulation_cache
    }

    /// Simulation defaults (seed, lookback, counts).
    pub fn monte_carlo_settings(&self) -> &MonteCarloSettings {
        &self.monte_carlo
    }

    /// Historical risk metrics for `value` held in `symbol`.
    #[instrument(skip(self), level = "debug")]
    pub async fn risk_metrics(
        &self,
        symbol: &str,
        lookback: usize,
        value: f64,
    ) -> QuantResult<RiskMetrics> {
        let key = Fingerprint::new("risk")
            .field("symbol", symbol)
            .float("value", value)
            .int("lookback", lookback as u64)
            .finish();

        self.metrics_cache
            .get_or_try_insert_with(&key, || async {
                let returns = self.provider.returns(symbol, lookback).await?;
                let result = metrics::compute_risk_metrics(symbol, &returns, lookback, value)?;
                info!(symbol, var_95 = result.var_95, cvar_95 = result.cvar_95, "risk metrics computed");
                Ok(result)
            })
            .await
    }

    async fn position_series(&self, lookback: usize) -> QuantResult<(Vec<Position>, Vec<Vec<f64>>)> {
        let positions = self.positions.positions().await?;
        let series = try_join_all(
            positions
                .iter()
                .map(|p| self.provider.returns(&p.symbol, lookback)),
        )
        .await?;
        Ok((positions, series))
    }

    /// Risk metrics of the value-weighted portfolio. Not cached, since
    /// positions may change between calls.
    pub async fn portfolio_risk_metrics(&self, lookback: usize) -> QuantResult<RiskMetrics> {
        let (positions, series) = self.position_series(lookback).await?;
        let result = metrics::compute_portfolio_metrics(&positions, &series, lookback)?;
        info!(
            positions = positions.len(),
            var_95 = result.var_95,
            "portfolio risk metrics computed"
        );
        Ok(result)
    }

    /// Simulate `simulations` outcomes over `horizon_days` for `value` held
    /// in `symbol`, using the configured seed and lookback.
    #[instrument(skip(self, cancel), level = "debug")]
    pub async fn monte_carlo(
        &self,
        symbol: &str,
        simulations: usize,
        horizon_days: usize,
        value: f64,
        cancel: &CancellationFlag,
    ) -> QuantResult<MonteCarloResult> {
        let config = MonteCarloConfig::builder()
            .simulations(simulations)
            .horizon_days(horizon_days)
            .seed(self.monte_carlo.seed)
            .build()?;
        let lookback = self.monte_carlo.lookback_days;
        let key = Fingerprint::new("mc")
            .field("symbol", symbol)
            .int("sims", simulations as u64)
            .int("days", horizon_days as u64)
            .float("value", value)
            .int("seed", config.seed())
            .int("lookback", lookback as u64)
            .finish();

        self.simulation_cache
            .get_or_try_insert_with(&key, || async {
                cancel.check()?;
                let returns = self.provider.returns(symbol, lookback).await?;
                run_simulation(symbol, &returns, lookback, &config, value, cancel)
            })
            .await
    }

    /// Run several simulations concurrently.
    ///
    /// Results come back in request order, paired with their request, so
    /// several requests for one symbol are all kept. A cancelled flag fails
    /// the whole batch with `Cancelled`.
    pub async fn monte_carlo_batch(
        &self,
        requests: &[MonteCarloRequest],
        cancel: &CancellationFlag,
    ) -> QuantResult<Vec<(MonteCarloRequest, QuantResult<MonteCarloResult>)>> {
        cancel.check()?;
        let runs = requests.iter().map(|request| async move {
            let result = self
                .monte_carlo(
                    &request.symbol,
                    request.simulations,
                    request.horizon_days,
                    request.value,
                    cancel,
                )
                .await;
            (request.clone(), result)
        });
        let results = join_all(runs).await;

        if cancel.is_cancelled() {
            return Err(QuantError::Cancelled);
        }
        Ok(results)
    }

    /// Component VaR of the current positions.
    pub async fn component_var(
        &self,
        confidence: f64,
        lookback: usize,
    ) -> QuantResult<ComponentVarReport> {
        let (positions, series) = self.position_series(lookback).await?;
        let total = self.positions.total_value().await?;
        component::component_var(&positions, &series, total, confidence)
    }

    /// Stress catalogue for `value` held in `symbol`; the symbol's history
    /// supplies the base volatility.
    pub async fn stress_test(
        &self,
        symbol: &str,
        lookback: usize,
        value: f64,
    ) -> QuantResult<Vec<StressTestResult>> {
        crate::historical::validate_value(value)?;
        let returns = self.provider.returns(symbol, lookback).await?;
        Ok(stress::stress_test(&returns, value))
    }
}
