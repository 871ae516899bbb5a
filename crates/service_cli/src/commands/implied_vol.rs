//! Implied volatility command implementation

use quant_core::AnalyticsConfig;
use quant_pricing::{OptionContract, OptionType, PricingKernel};

use super::emit;
use crate::Result;

/// Run the implied-vol command
///
/// A non-converged solve is still printed; `converged` tells the caller
/// whether to trust it.
pub async fn run(
    config: &AnalyticsConfig,
    market_price: f64,
    spot: f64,
    strike: f64,
    expiry: f64,
    option_type: OptionType,
    dividend_yield: f64,
) -> Result<()> {
    let kernel = PricingKernel::new(config);
    // Volatility is solved for; the contract's own value is unused
    let contract = OptionContract::new(spot, strike, expiry, 0.2, option_type)
        .with_dividend_yield(dividend_yield);
    let iv = kernel.implied_volatility(market_price, &contract).await?;
    emit(&iv)
}
