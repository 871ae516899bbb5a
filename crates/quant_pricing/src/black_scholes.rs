//! Black-Scholes-Merton pricing for European options.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·e^(-qT)·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·e^(-qT)·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T

use chrono::Utc;
use quant_core::math::distributions::{norm_cdf, norm_pdf};
use quant_core::{QuantError, QuantResult};

use crate::types::{Greeks, OptionType, PricingResult};

/// Calendar days used to express theta per day.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Delta magnitude below which lambda is reported as zero.
const LAMBDA_DELTA_FLOOR: f64 = 1e-10;

/// Black-Scholes-Merton model with continuous dividend yield.
///
/// # Examples
/// ```
/// use quant_pricing::BlackScholesMerton;
/// use quant_pricing::OptionType;
///
/// let bs = BlackScholesMerton::new(100.0, 0.05, 0.0, 0.2).unwrap();
/// let call = bs.price(100.0, 1.0, OptionType::Call);
/// let put = bs.price(100.0, 1.0, OptionType::Put);
///
/// // Put-call parity: C - P = S - K·e^(-rT)
/// let parity = call - put - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesMerton {
    spot: f64,
    rate: f64,
    dividend_yield: f64,
    volatility: f64,
}

impl BlackScholesMerton {
    /// Creates a new model.
    ///
    /// # Errors
    /// `InvalidParameter` if `spot <= 0` or `volatility <= 0` (or either is
    /// non-finite), or if the rate or dividend yield is non-finite.
    pub fn new(spot: f64, rate: f64, dividend_yield: f64, volatility: f64) -> QuantResult<Self> {
        if !(spot > 0.0 && spot.is_finite()) {
            return Err(QuantError::invalid("spot", spot, "must be positive"));
        }
        if !(volatility > 0.0 && volatility.is_finite()) {
            return Err(QuantError::invalid(
                "volatility",
                volatility,
                "must be positive",
            ));
        }
        if !rate.is_finite() {
            return Err(QuantError::invalid("rate", rate, "must be finite"));
        }
        if !dividend_yield.is_finite() {
            return Err(QuantError::invalid(
                "dividend_yield",
                dividend_yield,
                "must be finite",
            ));
        }
        Ok(Self {
            spot,
            rate,
            dividend_yield,
            volatility,
        })
    }

    /// Same model with a different volatility. Caller guarantees `σ > 0`.
    #[inline]
    pub(crate) fn with_volatility(&self, volatility: f64) -> Self {
        Self { volatility, ..*self }
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Returns the risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the dividend yield.
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// d₁ = (ln(S/K) + (r − q + σ²/2)T) / (σ√T)
    #[inline]
    pub fn d1(&self, strike: f64, expiry: f64) -> f64 {
        let vol_sqrt_t = self.volatility * expiry.sqrt();
        let log_moneyness = (self.spot / strike).ln();
        let drift =
            (self.rate - self.dividend_yield + 0.5 * self.volatility * self.volatility) * expiry;
        (log_moneyness + drift) / vol_sqrt_t
    }

    /// d₂ = d₁ − σ√T
    #[inline]
    pub fn d2(&self, strike: f64, expiry: f64) -> f64 {
        self.d1(strike, expiry) - self.volatility * expiry.sqrt()
    }

    #[inline]
    fn discounts(&self, expiry: f64) -> (f64, f64) {
        (
            (-self.dividend_yield * expiry).exp(),
            (-self.rate * expiry).exp(),
        )
    }

    /// Theoretical option value.
    pub fn price(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        let d1 = self.d1(strike, expiry);
        let d2 = d1 - self.volatility * expiry.sqrt();
        let (div_df, df) = self.discounts(expiry);

        let w = option_type.sign();
        // C = S·e^(-qT)·N(d₁) - K·e^(-rT)·N(d₂)
        // P = K·e^(-rT)·N(-d₂) - S·e^(-qT)·N(-d₁)
        w * (self.spot * div_df * norm_cdf(w * d1) - strike * df * norm_cdf(w * d2))
    }

    /// Delta: e^(-qT)·N(d₁) for calls, −e^(-qT)·N(−d₁) for puts.
    pub fn delta(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        let d1 = self.d1(strike, expiry);
        let (div_df, _) = self.discounts(expiry);
        let w = option_type.sign();
        w * div_df * norm_cdf(w * d1)
    }

    /// Gamma = e^(-qT)·φ(d₁) / (S·σ·√T), identical for calls and puts.
    pub fn gamma(&self, strike: f64, expiry: f64) -> f64 {
        let d1 = self.d1(strike, expiry);
        let (div_df, _) = self.discounts(expiry);
        div_df * norm_pdf(d1) / (self.spot * self.volatility * expiry.sqrt())
    }

    /// Vega per unit of volatility: S·e^(-qT)·φ(d₁)·√T.
    ///
    /// This is the raw derivative used by the implied-volatility solver;
    /// [`Greeks::vega`] reports it per volatility point (÷100).
    pub fn raw_vega(&self, strike: f64, expiry: f64) -> f64 {
        let d1 = self.d1(strike, expiry);
        let (div_df, _) = self.discounts(expiry);
        self.spot * div_df * norm_pdf(d1) * expiry.sqrt()
    }

    /// Theta per calendar day.
    ///
    /// - Call: [−S·e^(-qT)·φ(d₁)·σ/(2√T) − r·K·e^(-rT)·N(d₂) + q·S·e^(-qT)·N(d₁)] / 365
    /// - Put:  [−S·e^(-qT)·φ(d₁)·σ/(2√T) + r·K·e^(-rT)·N(−d₂) − q·S·e^(-qT)·N(−d₁)] / 365
    pub fn theta(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        let d1 = self.d1(strike, expiry);
        let d2 = d1 - self.volatility * expiry.sqrt();
        let (div_df, df) = self.discounts(expiry);

        let decay = -(self.spot * div_df * norm_pdf(d1) * self.volatility) / (2.0 * expiry.sqrt());
        let w = option_type.sign();
        let annual = decay - w * self.rate * strike * df * norm_cdf(w * d2)
            + w * self.dividend_yield * self.spot * div_df * norm_cdf(w * d1);
        annual / DAYS_PER_YEAR
    }

    /// Rho per rate point: ±K·T·e^(-rT)·N(±d₂) / 100.
    pub fn rho(&self, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        let d2 = self.d2(strike, expiry);
        let (_, df) = self.discounts(expiry);
        let w = option_type.sign();
        w * strike * expiry * df * norm_cdf(w * d2) / 100.0
    }

    /// All sensitivities in one pass.
    pub fn greeks(&self, strike: f64, expiry: f64, option_type: OptionType) -> Greeks {
        let delta = self.delta(strike, expiry, option_type);
        Greeks {
            delta,
            gamma: self.gamma(strike, expiry),
            theta: self.theta(strike, expiry, option_type),
            vega: self.raw_vega(strike, expiry) / 100.0,
            rho: self.rho(strike, expiry, option_type),
            lambda: leverage(delta, self.spot),
        }
    }
}

/// Leverage as `delta × S`, zero for negligible delta.
///
/// This is not the textbook elasticity `delta × S / price`; callers that need
/// elasticity divide by the option price themselves.
#[inline]
pub fn leverage(delta: f64, spot: f64) -> f64 {
    if delta.abs() > LAMBDA_DELTA_FLOOR {
        delta * spot
    } else {
        0.0
    }
}

/// Validate strike and expiry for a valuation.
pub(crate) fn validate_contract(strike: f64, expiry: f64) -> QuantResult<()> {
    if !(strike > 0.0 && strike.is_finite()) {
        return Err(QuantError::invalid("strike", strike, "must be positive"));
    }
    if !(expiry > 0.0 && expiry.is_finite()) {
        return Err(QuantError::invalid(
            "time_to_expiration",
            expiry,
            "must be positive",
        ));
    }
    Ok(())
}

/// Value a European option and its Greeks.
///
/// # Errors
/// `InvalidParameter` unless `S > 0`, `K > 0`, `T > 0` and `σ > 0`.
///
/// # Examples
/// ```
/// use quant_pricing::{price, OptionType};
///
/// let result = price(100.0, 105.0, 0.25, 0.2, OptionType::Call, 0.05, 0.0).unwrap();
/// assert!((result.price - 2.48).abs() < 0.05);
/// assert!(result.implied_vol.is_none());
/// ```
pub fn price(
    spot: f64,
    strike: f64,
    expiry: f64,
    volatility: f64,
    option_type: OptionType,
    rate: f64,
    dividend_yield: f64,
) -> QuantResult<PricingResult> {
    validate_contract(strike, expiry)?;
    let model = BlackScholesMerton::new(spot, rate, dividend_yield, volatility)?;

    Ok(PricingResult {
        price: model.price(strike, expiry, option_type),
        greeks: model.greeks(strike, expiry, option_type),
        implied_vol: None,
        time_to_expiration: expiry,
        risk_free_rate: rate,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn atm() -> BlackScholesMerton {
        BlackScholesMerton::new(100.0, 0.05, 0.0, 0.2).unwrap()
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(BlackScholesMerton::new(-100.0, 0.05, 0.0, 0.2).is_err());
        assert!(BlackScholesMerton::new(100.0, 0.05, 0.0, 0.0).is_err());
        assert!(price(100.0, 0.0, 1.0, 0.2, OptionType::Call, 0.05, 0.0).is_err());
        assert!(price(100.0, 100.0, 0.0, 0.2, OptionType::Call, 0.05, 0.0).is_err());
        assert!(price(100.0, 100.0, 1.0, -0.2, OptionType::Put, 0.05, 0.0).is_err());
    }

    #[test]
    fn test_invalid_strike_reports_parameter() {
        match price(100.0, -5.0, 1.0, 0.2, OptionType::Call, 0.05, 0.0) {
            Err(QuantError::InvalidParameter { name, .. }) => assert_eq!(name, "strike"),
            other => panic!("Expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_reference_atm_call() {
        // Hull: S=K=100, r=5%, σ=20%, T=1 → C ≈ 10.4506, P ≈ 5.5735
        let bs = atm();
        assert_relative_eq!(bs.price(100.0, 1.0, OptionType::Call), 10.4506, epsilon = 1e-4);
        assert_relative_eq!(bs.price(100.0, 1.0, OptionType::Put), 5.5735, epsilon = 1e-4);
    }

    #[test]
    fn test_reference_otm_call() {
        let result = price(100.0, 105.0, 0.25, 0.2, OptionType::Call, 0.05, 0.0).unwrap();
        assert_relative_eq!(result.price, 2.4779, epsilon = 1e-3);
        assert_relative_eq!(result.greeks.delta, 0.3772, epsilon = 1e-3);
        assert!((result.price - 2.50).abs() < 0.05);
        assert!((result.greeks.delta - 0.42).abs() < 0.05);
    }

    #[test]
    fn test_gamma_and_vega_match_for_call_and_put() {
        let call = atm().greeks(95.0, 0.5, OptionType::Call);
        let put = atm().greeks(95.0, 0.5, OptionType::Put);
        assert_relative_eq!(call.gamma, put.gamma, epsilon = 1e-15);
        assert_relative_eq!(call.vega, put.vega, epsilon = 1e-15);
    }

    #[test]
    fn test_delta_parity_with_dividends() {
        // Δc − Δp = e^(-qT)
        let bs = BlackScholesMerton::new(100.0, 0.03, 0.02, 0.25).unwrap();
        let dc = bs.delta(110.0, 2.0, OptionType::Call);
        let dp = bs.delta(110.0, 2.0, OptionType::Put);
        assert_relative_eq!(dc - dp, (-0.02_f64 * 2.0).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_vega_matches_finite_difference() {
        let bs = atm();
        let h = 1e-5;
        let up = bs.with_volatility(0.2 + h).price(100.0, 1.0, OptionType::Call);
        let down = bs.with_volatility(0.2 - h).price(100.0, 1.0, OptionType::Call);
        let fd = (up - down) / (2.0 * h);
        assert_relative_eq!(bs.raw_vega(100.0, 1.0), fd, epsilon = 1e-5);
    }

    #[test]
    fn test_theta_matches_finite_difference() {
        let bs = BlackScholesMerton::new(100.0, 0.05, 0.01, 0.3).unwrap();
        let h = 1e-5;
        for option_type in [OptionType::Call, OptionType::Put] {
            // Theta is −∂V/∂T, per day
            let fd = -(bs.price(100.0, 0.5 + h, option_type) - bs.price(100.0, 0.5 - h, option_type))
                / (2.0 * h)
                / DAYS_PER_YEAR;
            assert_relative_eq!(bs.theta(100.0, 0.5, option_type), fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rho_matches_finite_difference() {
        let h = 1e-6;
        for option_type in [OptionType::Call, OptionType::Put] {
            let up = BlackScholesMerton::new(100.0, 0.05 + h, 0.0, 0.2)
                .unwrap()
                .price(100.0, 1.0, option_type);
            let down = BlackScholesMerton::new(100.0, 0.05 - h, 0.0, 0.2)
                .unwrap()
                .price(100.0, 1.0, option_type);
            let fd = (up - down) / (2.0 * h) / 100.0;
            assert_relative_eq!(atm().rho(100.0, 1.0, option_type), fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_lambda_is_delta_times_spot() {
        let greeks = atm().greeks(100.0, 1.0, OptionType::Call);
        assert_relative_eq!(greeks.lambda, greeks.delta * 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lambda_zero_for_negligible_delta() {
        assert_eq!(leverage(1e-12, 100.0), 0.0);
        assert_eq!(leverage(-0.5, 100.0), -50.0);
    }

    #[test]
    fn test_result_carries_inputs() {
        let result = price(100.0, 100.0, 0.5, 0.2, OptionType::Put, 0.04, 0.0).unwrap();
        assert_eq!(result.time_to_expiration, 0.5);
        assert_eq!(result.risk_free_rate, 0.04);
        assert!(result.greeks.delta < 0.0);
    }
}
