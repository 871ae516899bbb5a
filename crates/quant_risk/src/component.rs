//! Component VaR by position weight.
//!
//! Each position's stand-alone historical VaR, scaled to its market value,
//! is multiplied by its share of portfolio value. This is an additive
//! approximation: diversification is ignored, so the components need not
//! sum to the VaR of the combined portfolio.
//!
//! Short positions are supported: their stand-alone VaR is measured on the
//! rising side of the return distribution, and their weight is negative, so
//! they offset long components. The portfolio as a whole must be net long.

use quant_core::{Position, QuantError, QuantResult};
use serde::{Deserialize, Serialize};

use crate::historical::{historical_var, validate_confidence};

/// Risk attributed to one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentVar {
    /// Position symbol
    pub symbol: String,
    /// Quantity × current price, negative for shorts
    pub position_value: f64,
    /// Signed share of portfolio value
    pub weight: f64,
    /// VaR of the position on its own
    pub standalone_var: f64,
    /// `standalone_var × weight`
    pub component_var: f64,
}

/// Component VaR for every position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentVarReport {
    /// Confidence level used
    pub confidence: f64,
    /// Portfolio value the weights are relative to
    pub portfolio_value: f64,
    /// Per-position breakdown in input order
    pub components: Vec<ComponentVar>,
    /// Sum of component VaRs
    pub total_component_var: f64,
}

/// Attribute VaR to positions.
///
/// `series[i]` is the return history of `positions[i]`; weights are taken
/// against `portfolio_value`, normally the position store's total value.
///
/// # Errors
/// `InvalidParameter` for an invalid confidence, mismatched inputs, a
/// non-positive portfolio value or a zero-value position;
/// `InsufficientData` when any series has fewer than 30 observations.
pub fn component_var(
    positions: &[Position],
    series: &[Vec<f64>],
    portfolio_value: f64,
    confidence: f64,
) -> QuantResult<ComponentVarReport> {
    validate_confidence(confidence)?;
    if positions.len() != series.len() {
        return Err(QuantError::invalid(
            "series",
            series.len() as f64,
            "must match the number of positions",
        ));
    }
    if !(portfolio_value > 0.0 && portfolio_value.is_finite()) {
        return Err(QuantError::invalid(
            "portfolio_value",
            portfolio_value,
            "must be positive",
        ));
    }

    let components = positions
        .iter()
        .zip(series)
        .map(|(position, returns)| {
            let position_value = position.market_value();
            let standalone_var = standalone_var(returns, confidence, position_value)?;
            let weight = position_value / portfolio_value;
            Ok(ComponentVar {
                symbol: position.symbol.clone(),
                position_value,
                weight,
                standalone_var,
                component_var: standalone_var * weight,
            })
        })
        .collect::<QuantResult<Vec<_>>>()?;

    let total_component_var = components.iter().map(|c| c.component_var).sum();
    Ok(ComponentVarReport {
        confidence,
        portfolio_value,
        components,
        total_component_var,
    })
}

/// Historical VaR of the position's P&L; a short loses when returns rise.
fn standalone_var(returns: &[f64], confidence: f64, position_value: f64) -> QuantResult<f64> {
    if position_value < 0.0 {
        let flipped: Vec<f64> = returns.iter().map(|r| -r).collect();
        historical_var(&flipped, confidence, -position_value)
    } else {
        historical_var(returns, confidence, position_value)
    }
}
