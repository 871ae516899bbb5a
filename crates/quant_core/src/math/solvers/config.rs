//! Solver configuration types.

use num_traits::Float;

/// Configuration for root-finding algorithms.
///
/// # Example
///
/// ```
/// use quant_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert!(config.tolerance < 1e-8);
/// assert_eq!(config.max_iterations, 100);
///
/// let bounded = SolverConfig::new(1e-6, 100).with_bounds(0.001, 5.0);
/// assert_eq!(bounded.bounds, Some((0.001, 5.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig<T: Float> {
    /// Convergence tolerance: the solver stops when `|f(x)| < tolerance`.
    pub tolerance: T,

    /// Maximum number of iterations before giving up.
    pub max_iterations: usize,

    /// Smallest derivative magnitude accepted for a Newton step.
    pub min_derivative: T,

    /// Optional `[lower, upper]` clamp applied after every step.
    pub bounds: Option<(T, T)>,
}

impl<T: Float> Default for SolverConfig<T> {
    /// Default values: tolerance 1e-10, 100 iterations, derivative floor
    /// 1e-30, unbounded.
    fn default() -> Self {
        Self {
            tolerance: T::from(1e-10).unwrap_or_else(T::epsilon),
            max_iterations: 100,
            min_derivative: T::from(1e-30).unwrap_or_else(T::min_positive_value),
            bounds: None,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Create a new configuration with specified tolerance and iteration cap.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance <= 0` or `max_iterations == 0`.
    pub fn new(tolerance: T, max_iterations: usize) -> Self {
        assert!(tolerance > T::zero(), "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            tolerance,
            max_iterations,
            ..Self::default()
        }
    }

    /// Set the derivative floor below which iteration stops.
    pub fn with_min_derivative(mut self, min_derivative: T) -> Self {
        self.min_derivative = min_derivative;
        self
    }

    /// Clamp every iterate into `[lower, upper]`.
    pub fn with_bounds(mut self, lower: T, upper: T) -> Self {
        self.bounds = Some((lower, upper));
        self
    }

    /// Apply the configured bounds to `x`.
    #[inline]
    pub fn clamp(&self, x: T) -> T {
        match self.bounds {
            Some((lo, hi)) => x.max(lo).min(hi),
            None => x,
        }
    }
}
