//! # quant_core: Foundation for the quantlens analytics engines
//!
//! ## Layer 1 (Foundation) Role
//!
//! quant_core is the bottom layer shared by the pricing, factor and risk
//! engines. It provides:
//! - Error taxonomy: `QuantError`, `SolverError` (`error`)
//! - Normal and Student-t distribution functions (`math::distributions`)
//! - Moment and dispersion estimators (`math::statistics`)
//! - Newton-Raphson root finding (`math::solvers`)
//! - Fingerprinted single-flight result cache (`cache`)
//! - Return and position collaborators (`providers`)
//! - Configuration loading (`config`) and tracing setup (`telemetry`)
//!
//! The engines never share mutable state; each one owns its own
//! [`cache::ResultCache`].
//!
//! ## Usage Examples
//!
//! ```rust
//! use quant_core::math::distributions::norm_cdf;
//! use quant_core::math::statistics::{mean, sample_std_dev};
//!
//! let returns = [0.01, -0.02, 0.015, 0.003];
//! assert!((mean(&returns) - 0.002).abs() < 1e-12);
//! assert!(sample_std_dev(&returns) > 0.0);
//! assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod cancel;
#[allow(missing_docs)]
pub mod config;
pub mod error;
pub mod math;
pub mod providers;
pub mod telemetry;

pub use cache::{Fingerprint, ResultCache};
pub use cancel::CancellationFlag;
pub use config::{AnalyticsConfig, CacheSettings, ConfigError, MonteCarloSettings};
pub use error::{QuantError, QuantResult, SolverError};
pub use providers::{
    InMemoryPositionStore, InMemoryReturnProvider, Position, PositionStore, ReturnProvider,
    SyntheticReturnProvider, MAX_HISTORY_DAYS,
};

/// Minimum number of return observations any fit or risk calculation needs.
pub const MIN_OBSERVATIONS: usize = 30;

/// Fail with `InsufficientData` when `got < MIN_OBSERVATIONS`.
#[inline]
pub fn require_observations(got: usize) -> QuantResult<()> {
    if got < MIN_OBSERVATIONS {
        Err(QuantError::InsufficientData {
            got,
            need: MIN_OBSERVATIONS,
        })
    } else {
        Ok(())
    }
}
