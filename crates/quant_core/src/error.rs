//! Error types for structured error handling.
//!
//! This module provides:
//! - `QuantError`: Errors surfaced by every analytics engine
//! - `SolverError`: Errors from the generic root-finding solver

use thiserror::Error;

/// Categorised analytics errors.
///
/// Every engine operation returns this type. None of the variants is retried
/// internally; retry policy belongs to the caller or to the collaborators.
///
/// # Variants
/// - `InvalidParameter`: Non-positive price/strike/time/volatility/confidence/count
/// - `InsufficientData`: Fewer observations than a calculation needs
/// - `UnknownFactor`: Factor name absent from the registered catalogue
/// - `NumericalDegeneracy`: Zero or near-zero denominators, singular systems
/// - `Cancelled`: The caller raised the cancellation flag
/// - `Provider`: A return or position collaborator failed
///
/// # Examples
/// ```
/// use quant_core::QuantError;
///
/// let err = QuantError::InsufficientData { got: 12, need: 30 };
/// assert_eq!(format!("{}", err), "Insufficient data: got 12 observations, need at least 30");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantError {
    /// A parameter violated its domain.
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
        /// Constraint that was violated
        reason: &'static str,
    },

    /// Not enough observations to run the calculation.
    #[error("Insufficient data: got {got} observations, need at least {need}")]
    InsufficientData {
        /// Observations available
        got: usize,
        /// Observations required
        need: usize,
    },

    /// Factor name is not registered in the catalogue.
    #[error("Unknown factor: {0}")]
    UnknownFactor(String),

    /// Computation hit a zero or singular denominator.
    #[error("Numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    /// Computation was cancelled by the caller.
    #[error("Computation cancelled")]
    Cancelled,

    /// External collaborator failure.
    #[error("Provider error: {0}")]
    Provider(String),
}

impl QuantError {
    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        QuantError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Result alias used across the workspace.
pub type QuantResult<T> = Result<T, QuantError>;

/// Root-finding solver errors.
///
/// # Examples
/// ```
/// use quant_core::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Iteration limit reached without satisfying the tolerance.
    #[error("Maximum iterations ({iterations}) exceeded without convergence")]
    MaxIterationsExceeded {
        /// Number of iterations performed
        iterations: usize,
    },

    /// Derivative too small to take a Newton step.
    #[error("Derivative near zero at x = {x}")]
    DerivativeNearZero {
        /// Point at which the derivative vanished
        x: f64,
    },

    /// Iterate became non-finite.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl From<SolverError> for QuantError {
    fn from(err: SolverError) -> Self {
        QuantError::NumericalDegeneracy(err.to_string())
    }
}
