//! Cached pricing kernel.
//!
//! [`PricingKernel`] wraps the pure valuation functions with the configured
//! risk-free rate and a fingerprinted result cache.

use quant_core::{AnalyticsConfig, CacheSettings, Fingerprint, QuantResult, ResultCache};
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::black_scholes::price;
use crate::implied_vol::implied_volatility;
use crate::types::{ImpliedVolatility, OptionContract, OptionType, PricingResult};

/// Option pricing engine with a per-instance result cache.
///
/// # Examples
/// ```
/// use quant_core::AnalyticsConfig;
/// use quant_pricing::{OptionContract, OptionType, PricingKernel};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let kernel = PricingKernel::new(&AnalyticsConfig::default());
/// let contract = OptionContract::new(100.0, 105.0, 0.25, 0.2, OptionType::Call);
/// let result = kernel.price(&contract).await.unwrap();
/// assert_eq!(result.risk_free_rate, 0.05);
/// assert_eq!(kernel.cache().len(), 1);
/// # });
/// ```
#[derive(Debug)]
pub struct PricingKernel {
    risk_free_rate: f64,
    cache: ResultCache<PricingResult>,
}

impl PricingKernel {
    /// Build a kernel from the shared configuration.
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self::with_settings(config.risk_free_rate, config.pricing_cache)
    }

    /// Build a kernel with an explicit rate and default cache settings.
    pub fn with_rate(risk_free_rate: f64) -> Self {
        Self::with_settings(risk_free_rate, AnalyticsConfig::default().pricing_cache)
    }

    fn with_settings(risk_free_rate: f64, cache: CacheSettings) -> Self {
        Self {
            risk_free_rate,
            cache: ResultCache::new("pricing", cache.ttl(), cache.capacity),
        }
    }

    /// Configured risk-free rate.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// The kernel's result cache.
    pub fn cache(&self) -> &ResultCache<PricingResult> {
        &self.cache
    }

    fn rate_for(&self, contract: &OptionContract) -> f64 {
        contract.rate.unwrap_or(self.risk_free_rate)
    }

    fn fingerprint(contract: &OptionContract, rate: f64) -> String {
        Fingerprint::new("price")
            .float("spot", contract.spot)
            .float("strike", contract.strike)
            .float("expiry", contract.expiry)
            .float("vol", contract.volatility)
            .field("type", contract.option_type.as_str())
            .float("rate", rate)
            .float("q", contract.dividend_yield)
            .finish()
    }

    /// Value a contract, using the cache when an identical request was seen.
    #[instrument(skip(self), level = "debug")]
    pub async fn price(&self, contract: &OptionContract) -> QuantResult<PricingResult> {
        let rate = self.rate_for(contract);
        let key = Self::fingerprint(contract, rate);
        self.cache
            .get_or_try_insert_with(&key, || async {
                price(
                    contract.spot,
                    contract.strike,
                    contract.expiry,
                    contract.volatility,
                    contract.option_type,
                    rate,
                    contract.dividend_yield,
                )
            })
            .await
    }

    /// Invert a market price for the contract's volatility.
    ///
    /// The contract's own `volatility` field is ignored.
    pub async fn implied_volatility(
        &self,
        market_price: f64,
        contract: &OptionContract,
    ) -> QuantResult<ImpliedVolatility> {
        implied_volatility(
            market_price,
            contract.spot,
            contract.strike,
            contract.expiry,
            contract.option_type,
            self.rate_for(contract),
            contract.dividend_yield,
        )
    }

    /// Value a contract and attach the inversion of `market_price`.
    ///
    /// The attached [`ImpliedVolatility`] keeps the solver's `converged`
    /// flag; an unconverged inversion carries only the last iterate.
    pub async fn price_with_implied_vol(
        &self,
        contract: &OptionContract,
        market_price: f64,
    ) -> QuantResult<PricingResult> {
        let mut result = self.price(contract).await?;
        let iv = self.implied_volatility(market_price, contract).await?;
        if !iv.converged {
            warn!(
                market_price,
                last_iterate = iv.volatility,
                "attaching unconverged implied volatility"
            );
        }
        result.implied_vol = Some(iv);
        Ok(result)
    }

    /// Value a strike ladder in parallel at the configured rate. Results are
    /// not cached.
    ///
    /// # Errors
    /// The first `InvalidParameter` encountered, if any strike is invalid.
    pub fn price_many(
        &self,
        spot: f64,
        strikes: &[f64],
        expiry: f64,
        volatility: f64,
        option_type: OptionType,
        dividend_yield: f64,
    ) -> QuantResult<Vec<PricingResult>> {
        debug!(spot, strikes = strikes.len(), expiry, dividend_yield, "pricing strike ladder");
        strikes
            .par_iter()
            .map(|&strike| {
                price(
                    spot,
                    strike,
                    expiry,
                    volatility,
                    option_type,
                    self.risk_free_rate,
                    dividend_yield,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quant_core::QuantError;

    #[tokio::test]
    async fn test_configured_rate_is_used_when_omitted() {
        let kernel = PricingKernel::with_rate(0.02);
        let contract = OptionContract::new(100.0, 100.0, 1.0, 0.2, OptionType::Call);
        let result = kernel.price(&contract).await.unwrap();
        assert_eq!(result.risk_free_rate, 0.02);

        let explicit = kernel.price(&contract.with_rate(0.07)).await.unwrap();
        assert_eq!(explicit.risk_free_rate, 0.07);
        assert!(explicit.price > result.price);
        assert_eq!(kernel.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_repeat_request_hits_cache() {
        let kernel = PricingKernel::with_rate(0.05);
        let contract = OptionContract::new(100.0, 95.0, 0.5, 0.25, OptionType::Put);
        let first = kernel.price(&contract).await.unwrap();
        let second = kernel.price(&contract).await.unwrap();
        // Identical timestamp proves the second value came from the cache
        assert_eq!(first, second);
        assert_eq!(kernel.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_is_not_cached() {
        let kernel = PricingKernel::with_rate(0.05);
        let contract = OptionContract::new(100.0, 95.0, -0.5, 0.25, OptionType::Put);
        let err = kernel.price(&contract).await.unwrap_err();
        assert!(matches!(err, QuantError::InvalidParameter { .. }));
        assert!(kernel.cache().is_empty());
    }

    #[tokio::test]
    async fn test_price_with_implied_vol() {
        let kernel = PricingKernel::with_rate(0.05);
        let contract = OptionContract::new(100.0, 100.0, 1.0, 0.2, OptionType::Call);
        let result = kernel.price_with_implied_vol(&contract, 12.0).await.unwrap();
        let iv = result.implied_vol.unwrap();
        assert!(iv.converged);
        assert!(iv.volatility > 0.2);

        let check = price(100.0, 100.0, 1.0, iv.volatility, OptionType::Call, 0.05, 0.0).unwrap();
        assert_relative_eq!(check.price, 12.0, epsilon = 1e-4);
    }

    #[tokio::test]
    async fn test_unreachable_market_price_is_flagged_unconverged() {
        let kernel = PricingKernel::with_rate(0.05);
        let contract = OptionContract::new(100.0, 100.0, 1.0, 0.2, OptionType::Call);
        // No volatility makes a call on a 100 spot worth 150
        let result = kernel.price_with_implied_vol(&contract, 150.0).await.unwrap();
        let iv = result.implied_vol.unwrap();
        assert!(!iv.converged);
        assert!(iv.iterations > 0);
        // The model price itself is unaffected
        let plain = kernel.price(&contract).await.unwrap();
        assert_eq!(result.price, plain.price);
    }

    #[test]
    fn test_price_many_preserves_order() {
        let kernel = PricingKernel::with_rate(0.05);
        let strikes = [80.0, 90.0, 100.0, 110.0, 120.0];
        let ladder = kernel
            .price_many(100.0, &strikes, 0.5, 0.2, OptionType::Call, 0.0)
            .unwrap();
        assert_eq!(ladder.len(), strikes.len());
        for pair in ladder.windows(2) {
            assert!(pair[0].price > pair[1].price);
        }
    }

    #[test]
    fn test_price_many_applies_dividend_yield() {
        let kernel = PricingKernel::with_rate(0.05);
        let strikes = [95.0, 105.0];
        let ladder = kernel
            .price_many(100.0, &strikes, 1.0, 0.25, OptionType::Put, 0.03)
            .unwrap();
        for (strike, result) in strikes.iter().zip(&ladder) {
            let single = price(100.0, *strike, 1.0, 0.25, OptionType::Put, 0.05, 0.03).unwrap();
            assert_relative_eq!(result.price, single.price, epsilon = 1e-12);
        }
        let no_dividend = kernel
            .price_many(100.0, &strikes, 1.0, 0.25, OptionType::Put, 0.0)
            .unwrap();
        assert!(ladder[0].price > no_dividend[0].price);
    }

    #[test]
    fn test_price_many_rejects_bad_strike() {
        let kernel = PricingKernel::with_rate(0.05);
        assert!(kernel
            .price_many(100.0, &[90.0, 0.0], 0.5, 0.2, OptionType::Call, 0.0)
            .is_err());
    }
}
