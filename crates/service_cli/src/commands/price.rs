//! Price command implementation
//!
//! Values a European option through the pricing kernel.

use quant_core::AnalyticsConfig;
use quant_pricing::{OptionContract, OptionType, PricingKernel, PricingResult};
use tracing::info;

use super::emit;
use crate::Result;

/// Arguments of the price command
#[derive(Debug, Clone, Copy)]
pub struct PriceArgs {
    pub spot: f64,
    pub strike: f64,
    pub expiry: f64,
    pub volatility: f64,
    pub option_type: OptionType,
    pub dividend_yield: f64,
    pub market_price: Option<f64>,
}

/// Run the price command
pub async fn run(config: &AnalyticsConfig, args: PriceArgs) -> Result<()> {
    info!(
        spot = args.spot,
        strike = args.strike,
        expiry = args.expiry,
        option_type = args.option_type.as_str(),
        "pricing option"
    );
    emit(&valuation(config, args).await?)
}

async fn valuation(config: &AnalyticsConfig, args: PriceArgs) -> Result<PricingResult> {
    let kernel = PricingKernel::new(config);
    let contract = OptionContract::new(
        args.spot,
        args.strike,
        args.expiry,
        args.volatility,
        args.option_type,
    )
    .with_dividend_yield(args.dividend_yield);

    let result = match args.market_price {
        Some(market_price) => kernel.price_with_implied_vol(&contract, market_price).await?,
        None => kernel.price(&contract).await?,
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(market_price: Option<f64>) -> PriceArgs {
        PriceArgs {
            spot: 100.0,
            strike: 100.0,
            expiry: 1.0,
            volatility: 0.2,
            option_type: OptionType::Call,
            dividend_yield: 0.0,
            market_price,
        }
    }

    #[tokio::test]
    async fn test_plain_price_has_no_implied_vol() {
        let result = valuation(&AnalyticsConfig::default(), args(None)).await.unwrap();
        assert!(result.implied_vol.is_none());
        assert!(result.price > 0.0);
    }

    #[tokio::test]
    async fn test_unreachable_market_price_reports_unconverged() {
        let result = valuation(&AnalyticsConfig::default(), args(Some(150.0)))
            .await
            .unwrap();
        let iv = result.implied_vol.unwrap();
        assert!(!iv.converged);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["implied_vol"]["converged"], false);
    }

    #[tokio::test]
    async fn test_reachable_market_price_reports_converged() {
        let result = valuation(&AnalyticsConfig::default(), args(Some(12.0)))
            .await
            .unwrap();
        assert!(result.implied_vol.unwrap().converged);
    }
}
