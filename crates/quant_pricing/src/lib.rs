//! # quant_pricing: Closed-form option valuation
//!
//! Black-Scholes-Merton pricing of European options with a continuous
//! dividend yield, the full set of Greeks, and Newton-Raphson
//! implied-volatility inversion.
//!
//! This crate provides:
//! - Pure valuation functions: [`price`], [`implied_volatility`]
//! - The [`BlackScholesMerton`] model for per-Greek access
//! - [`PricingKernel`]: configured rate plus a fingerprinted result cache
//!
//! ## Conventions
//!
//! - Theta is per calendar day (÷365)
//! - Vega and rho are per one percentage point (÷100)
//! - Lambda is `delta × S`, not the textbook elasticity
//!
//! ## Usage
//!
//! ```rust
//! use quant_pricing::{price, OptionType};
//!
//! let call = price(100.0, 100.0, 1.0, 0.2, OptionType::Call, 0.05, 0.0).unwrap();
//! assert!((call.price - 10.4506).abs() < 1e-3);
//! assert!(call.greeks.gamma > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod black_scholes;
pub mod implied_vol;
pub mod kernel;
pub mod types;

pub use black_scholes::{leverage, price, BlackScholesMerton};
pub use implied_vol::implied_volatility;
pub use kernel::PricingKernel;
pub use types::{Greeks, ImpliedVolatility, OptionContract, OptionType, PricingResult};
