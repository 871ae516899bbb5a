//! # quant_risk: Distributional risk measures
//!
//! Historical and Monte Carlo Value at Risk, tail statistics, named stress
//! scenarios and component risk attribution.
//!
//! This crate provides:
//! - Historical estimators: VaR, CVaR, max drawdown, tail ratio
//!   (`historical`)
//! - Fixed stress catalogue (`stress`)
//! - Seeded, chunked, parallel Monte Carlo (`monte_carlo`)
//! - Value-weighted component VaR (`component`)
//! - [`RiskEngine`]: provider-backed calls with result caches
//!
//! ## Usage
//!
//! ```rust
//! use quant_risk::historical::{historical_cvar, historical_var};
//!
//! let returns: Vec<f64> = (0..250).map(|i| ((i * 37 % 101) as f64 - 50.0) / 2_500.0).collect();
//! let var = historical_var(&returns, 0.95, 100_000.0).unwrap();
//! let cvar = historical_cvar(&returns, 0.95, 100_000.0).unwrap();
//! assert!(cvar >= var);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod component;
pub mod engine;
pub mod historical;
pub mod metrics;
pub mod monte_carlo;
pub mod stress;

pub use component::{component_var, ComponentVar, ComponentVarReport};
pub use engine::{MonteCarloRequest, RiskEngine};
pub use metrics::{compute_portfolio_metrics, compute_risk_metrics, RiskMetrics, PORTFOLIO_SYMBOL};
pub use monte_carlo::{
    run_simulation, simulate_outcomes, MonteCarloConfig, MonteCarloConfigBuilder, MonteCarloResult,
};
pub use stress::{PresetStressType, StressScenario, StressTestResult};
