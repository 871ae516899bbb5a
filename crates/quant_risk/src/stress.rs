//! Named historical stress scenarios.
//!
//! The catalogue is fixed:
//! - Market Crash (−30%, vol ×2.0)
//! - Flash Crash (−15%, vol ×3.0)
//! - Interest Rate Spike (−10%, vol ×1.5)
//! - Inflation Shock (−12%, vol ×1.8)
//! - Currency Crisis (−20%, vol ×2.5)

use quant_core::math::statistics::annualised_volatility;
use quant_core::Position;
use serde::{Deserialize, Serialize};

/// Preset stress scenario types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetStressType {
    /// Broad equity sell-off
    MarketCrash,
    /// Sudden intraday liquidity collapse
    FlashCrash,
    /// Sharp rise in policy rates
    InterestRateSpike,
    /// Unexpected inflation print
    InflationShock,
    /// Disorderly currency devaluation
    CurrencyCrisis,
}

impl PresetStressType {
    /// All presets in catalogue order.
    pub fn all() -> [Self; 5] {
        [
            Self::MarketCrash,
            Self::FlashCrash,
            Self::InterestRateSpike,
            Self::InflationShock,
            Self::CurrencyCrisis,
        ]
    }

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MarketCrash => "Market Crash",
            Self::FlashCrash => "Flash Crash",
            Self::InterestRateSpike => "Interest Rate Spike",
            Self::InflationShock => "Inflation Shock",
            Self::CurrencyCrisis => "Currency Crisis",
        }
    }

    /// Get description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::MarketCrash => "Broad market decline of 30% with doubled volatility",
            Self::FlashCrash => "Rapid 15% drop with volatility tripling",
            Self::InterestRateSpike => "Rate shock driving a 10% decline and 1.5x volatility",
            Self::InflationShock => "Inflation surprise driving a 12% decline and 1.8x volatility",
            Self::CurrencyCrisis => "Currency collapse driving a 20% decline and 2.5x volatility",
        }
    }

    /// Fractional return applied to the exposure.
    pub fn return_shock(&self) -> f64 {
        match self {
            Self::MarketCrash => -0.30,
            Self::FlashCrash => -0.15,
            Self::InterestRateSpike => -0.10,
            Self::InflationShock => -0.12,
            Self::CurrencyCrisis => -0.20,
        }
    }

    /// Multiplier applied to base volatility.
    pub fn volatility_multiplier(&self) -> f64 {
        match self {
            Self::MarketCrash => 2.0,
            Self::FlashCrash => 3.0,
            Self::InterestRateSpike => 1.5,
            Self::InflationShock => 1.8,
            Self::CurrencyCrisis => 2.5,
        }
    }
}

/// A stress scenario definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    /// Scenario name
    pub name: String,
    /// What the scenario represents
    pub description: String,
    /// Fractional return shock
    pub return_shock: f64,
    /// Volatility multiplier
    pub volatility_multiplier: f64,
}

impl From<PresetStressType> for StressScenario {
    fn from(preset: PresetStressType) -> Self {
        Self {
            name: preset.name().to_string(),
            description: preset.description().to_string(),
            return_shock: preset.return_shock(),
            volatility_multiplier: preset.volatility_multiplier(),
        }
    }
}

impl StressScenario {
    /// The full preset catalogue.
    pub fn catalogue() -> Vec<Self> {
        PresetStressType::all().into_iter().map(Self::from).collect()
    }

    /// Apply to a single exposure with the given annualised base volatility.
    pub fn apply(&self, value: f64, base_volatility: f64) -> StressTestResult {
        StressTestResult {
            scenario_name: self.name.clone(),
            return_impact: self.return_shock,
            volatility_impact: base_volatility * self.volatility_multiplier,
            portfolio_impact: self.return_shock * value,
            description: self.description.clone(),
        }
    }

    /// Apply to every position, summing `positionValue × shock`.
    pub fn apply_to_positions(
        &self,
        positions: &[Position],
        base_volatility: f64,
    ) -> StressTestResult {
        let impact = positions
            .iter()
            .map(|p| p.market_value() * self.return_shock)
            .sum();
        StressTestResult {
            portfolio_impact: impact,
            ..self.apply(0.0, base_volatility)
        }
    }
}

/// Outcome of one stress scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestResult {
    /// Scenario name
    pub scenario_name: String,
    /// Return shock applied
    pub return_impact: f64,
    /// Stressed annualised volatility
    pub volatility_impact: f64,
    /// Currency impact on the exposure
    pub portfolio_impact: f64,
    /// Scenario description
    pub description: String,
}

/// Run the catalogue against one exposure whose history is `returns`.
pub fn stress_test(returns: &[f64], value: f64) -> Vec<StressTestResult> {
    let base_volatility = annualised_volatility(returns);
    StressScenario::catalogue()
        .iter()
        .map(|s| s.apply(value, base_volatility))
        .collect()
}

/// Run the catalogue against a set of positions.
///
/// `portfolio_returns` is the value-weighted return series used for the
/// volatility impact.
pub fn portfolio_stress_test(
    positions: &[Position],
    portfolio_returns: &[f64],
) -> Vec<StressTestResult> {
    let base_volatility = annualised_volatility(portfolio_returns);
    StressScenario::catalogue()
        .iter()
        .map(|s| s.apply_to_positions(positions, base_volatility))
        .collect()
}
