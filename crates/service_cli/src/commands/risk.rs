//! Risk command implementation
//!
//! Single-symbol metrics, or portfolio metrics plus component VaR when
//! positions are supplied.

use quant_core::{AnalyticsConfig, InMemoryPositionStore, Position};
use quant_risk::{ComponentVarReport, RiskEngine, RiskMetrics};
use serde::Serialize;
use tracing::info;

use super::{emit, synthetic_provider};
use crate::{CliError, Result};

#[derive(Serialize)]
struct PortfolioReport {
    metrics: RiskMetrics,
    component_var: ComponentVarReport,
}

/// Run the risk command
pub async fn run(
    config: &AnalyticsConfig,
    symbol: Option<&str>,
    value: f64,
    lookback: usize,
    positions: Vec<Position>,
    confidence: f64,
) -> Result<()> {
    let engine = RiskEngine::new(
        synthetic_provider(config)?,
        InMemoryPositionStore::new(positions.clone()),
        config,
    );

    match (symbol, positions.is_empty()) {
        (Some(symbol), true) => {
            info!(symbol, value, lookback, "computing risk metrics");
            emit(&engine.risk_metrics(symbol, lookback, value).await?)
        }
        (None, false) => {
            info!(positions = positions.len(), lookback, "computing portfolio risk");
            let metrics = engine.portfolio_risk_metrics(lookback).await?;
            let component_var = engine.component_var(confidence, lookback).await?;
            emit(&PortfolioReport {
                metrics,
                component_var,
            })
        }
        (Some(_), false) => Err(CliError::InvalidArgument(
            "give either a symbol or --position entries, not both".to_string(),
        )),
        (None, true) => Err(CliError::InvalidArgument(
            "a symbol or at least one --position is required".to_string(),
        )),
    }
}
