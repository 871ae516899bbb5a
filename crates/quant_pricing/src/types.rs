//! Value types produced by the pricing kernel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Option payoff direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Right to buy at the strike
    Call,
    /// Right to sell at the strike
    Put,
}

impl OptionType {
    /// Lower-case label used in fingerprints and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }

    /// `+1` for calls, `-1` for puts.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sensitivities attached to one option valuation.
///
/// Theta is per calendar day; vega and rho are per one percentage point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂t per day
    pub theta: f64,
    /// ∂V/∂σ per 1 vol point
    pub vega: f64,
    /// ∂V/∂r per 1 rate point
    pub rho: f64,
    /// Leverage `delta × S` (not divided by price)
    pub lambda: f64,
}

/// Immutable result of one valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Theoretical option value
    pub price: f64,
    /// Closed-form sensitivities
    pub greeks: Greeks,
    /// Inversion of a supplied market price, if one was given. Check
    /// `converged` before using the volatility.
    pub implied_vol: Option<ImpliedVolatility>,
    /// Time to expiration in years
    pub time_to_expiration: f64,
    /// Risk-free rate used
    pub risk_free_rate: f64,
    /// When the valuation was computed
    pub timestamp: DateTime<Utc>,
}

/// Outcome of implied-volatility inversion.
///
/// `converged == false` means `volatility` is the solver's last iterate, a
/// best-effort estimate that must not be treated as a solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVolatility {
    /// Solved (or last iterated) volatility
    pub volatility: f64,
    /// Whether `|price(σ) − market| < 1e-6` was reached
    pub converged: bool,
    /// Newton iterations performed
    pub iterations: usize,
}

/// Parameters of a European option valuation request.
///
/// # Examples
/// ```
/// use quant_pricing::{OptionContract, OptionType};
///
/// let contract = OptionContract::new(100.0, 105.0, 0.25, 0.2, OptionType::Call)
///     .with_rate(0.05)
///     .with_dividend_yield(0.01);
/// assert_eq!(contract.rate, Some(0.05));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Underlying price S
    pub spot: f64,
    /// Strike K
    pub strike: f64,
    /// Time to expiration T in years
    pub expiry: f64,
    /// Volatility σ
    pub volatility: f64,
    /// Call or put
    pub option_type: OptionType,
    /// Risk-free rate; the kernel's configured rate when `None`
    pub rate: Option<f64>,
    /// Continuous dividend yield q
    pub dividend_yield: f64,
}

impl OptionContract {
    /// Create a request with no explicit rate and zero dividend yield.
    pub fn new(spot: f64, strike: f64, expiry: f64, volatility: f64, option_type: OptionType) -> Self {
        Self {
            spot,
            strike,
            expiry,
            volatility,
            option_type,
            rate: None,
            dividend_yield: 0.0,
        }
    }

    /// Override the risk-free rate.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Set a continuous dividend yield.
    pub fn with_dividend_yield(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = dividend_yield;
        self
    }
}
