//! CLI command implementations
//!
//! Each submodule implements a specific CLI command and prints its result
//! as pretty JSON on stdout.

use quant_core::{AnalyticsConfig, SyntheticReturnProvider};
use serde::Serialize;

use crate::Result;

pub mod check;
pub mod fit;
pub mod implied_vol;
pub mod monte_carlo;
pub mod price;
pub mod risk;

/// Daily drift of the synthetic return provider.
const SYNTHETIC_DAILY_MEAN: f64 = 0.0005;
/// Daily volatility of the synthetic return provider.
const SYNTHETIC_DAILY_VOLATILITY: f64 = 0.02;

/// Seeded placeholder for a market data feed.
pub(crate) fn synthetic_provider(config: &AnalyticsConfig) -> Result<SyntheticReturnProvider> {
    Ok(SyntheticReturnProvider::new(
        config.monte_carlo.seed,
        SYNTHETIC_DAILY_MEAN,
        SYNTHETIC_DAILY_VOLATILITY,
    )?)
}

/// Write `value` to stdout as pretty JSON.
pub(crate) fn emit<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
