//! Fit command implementation
//!
//! Fits a factor model on synthetic returns and, on request, attributes
//! recent performance and scores loading stability.

use quant_core::AnalyticsConfig;
use quant_factors::{FactorAttribution, FactorCatalogue, FactorEngine, FactorModel, FactorStability};
use serde::Serialize;
use tracing::info;

use super::{emit, synthetic_provider};
use crate::Result;

#[derive(Serialize)]
struct FitReport {
    model: FactorModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribution: Option<FactorAttribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stability: Option<FactorStability>,
}

/// Run the fit command
pub async fn run(
    config: &AnalyticsConfig,
    symbol: &str,
    factors: &[String],
    lookback: usize,
    attribution_window: Option<usize>,
    rolling_window: Option<usize>,
) -> Result<()> {
    info!(symbol, ?factors, lookback, "fitting factor model");

    let engine = FactorEngine::new(
        synthetic_provider(config)?,
        FactorCatalogue::synthetic(config.monte_carlo.seed)?,
        config,
    );

    let model = engine.fit_symbol(symbol, factors, lookback).await?;
    let attribution = match attribution_window {
        Some(window) => Some(engine.attribute_symbol(symbol, factors, lookback, window).await?),
        None => None,
    };
    let stability = match rolling_window {
        Some(rolling) => Some(engine.stability(symbol, factors, lookback, rolling).await?),
        None => None,
    };

    emit(&FitReport {
        model,
        attribution,
        stability,
    })
}
