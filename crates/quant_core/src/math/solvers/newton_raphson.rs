//! Newton-Raphson root-finding solver.

use super::SolverConfig;
use crate::error::SolverError;
use num_traits::Float;

/// Why a Newton iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewtonStatus {
    /// `|f(x)| < tolerance` was reached.
    Converged,
    /// Derivative fell below `min_derivative`; the last iterate is returned.
    DerivativeNearZero,
    /// Iteration cap reached; the last iterate is returned.
    MaxIterations,
}

/// Outcome of a best-effort Newton iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonReport<T: Float> {
    /// Last iterate (the root when converged).
    pub root: T,
    /// Number of function evaluations performed.
    pub iterations: usize,
    /// Termination reason.
    pub status: NewtonStatus,
}

impl<T: Float> NewtonReport<T> {
    /// Whether the tolerance was satisfied.
    #[inline]
    pub fn converged(&self) -> bool {
        self.status == NewtonStatus::Converged
    }
}

/// Newton-Raphson root finder.
///
/// Uses Newton's method: `x_{n+1} = x_n - f(x_n) / f'(x_n)`, optionally
/// clamped into configured bounds after each step.
///
/// # Example
///
/// ```
/// use quant_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
///
/// let solver = NewtonRaphsonSolver::new(SolverConfig::default());
/// let root = solver.find_root(|x: f64| x * x - 2.0, |x: f64| 2.0 * x, 1.0).unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct NewtonRaphsonSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> NewtonRaphsonSolver<T> {
    /// Create a new Newton-Raphson solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Run the iteration to completion and report how it ended.
    ///
    /// Never fails on non-convergence: the last iterate is returned together
    /// with a [`NewtonStatus`] so the caller decides how to treat it.
    /// `f_and_derivative` returns `(f(x), f'(x))` in one evaluation.
    ///
    /// # Errors
    ///
    /// `SolverError::NumericalInstability` if an iterate becomes non-finite.
    pub fn solve<F>(&self, f_and_derivative: F, x0: T) -> Result<NewtonReport<T>, SolverError>
    where
        F: Fn(T) -> (T, T),
    {
        let mut x = self.config.clamp(x0);

        for iteration in 1..=self.config.max_iterations {
            let (f_val, f_prime_val) = f_and_derivative(x);

            if f_val.abs() < self.config.tolerance {
                return Ok(NewtonReport {
                    root: x,
                    iterations: iteration,
                    status: NewtonStatus::Converged,
                });
            }

            if f_prime_val.abs() < self.config.min_derivative {
                return Ok(NewtonReport {
                    root: x,
                    iterations: iteration,
                    status: NewtonStatus::DerivativeNearZero,
                });
            }

            x = self.config.clamp(x - f_val / f_prime_val);

            if !x.is_finite() {
                return Err(SolverError::NumericalInstability(
                    "Newton iteration produced non-finite value".to_string(),
                ));
            }
        }

        // The last step's landing point has not been tested yet
        let (f_val, _) = f_and_derivative(x);
        let status = if f_val.abs() < self.config.tolerance {
            NewtonStatus::Converged
        } else {
            NewtonStatus::MaxIterations
        };
        Ok(NewtonReport {
            root: x,
            iterations: self.config.max_iterations,
            status,
        })
    }

    /// Find a root of `f` using explicit derivative `f_prime`.
    ///
    /// # Errors
    ///
    /// * `SolverError::MaxIterationsExceeded` - Failed to converge
    /// * `SolverError::DerivativeNearZero` - Derivative too small
    pub fn find_root<F, G>(&self, f: F, f_prime: G, x0: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        let report = self.solve(|x| (f(x), f_prime(x)), x0)?;
        match report.status {
            NewtonStatus::Converged => Ok(report.root),
            NewtonStatus::DerivativeNearZero => Err(SolverError::DerivativeNearZero {
                x: report.root.to_f64().unwrap_or(f64::NAN),
            }),
            NewtonStatus::MaxIterations => Err(SolverError::MaxIterationsExceeded {
                iterations: report.iterations,
            }),
        }
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sqrt_2() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let root = solver
            .find_root(|x: f64| x * x - 2.0, |x: f64| 2.0 * x, 1.0)
            .unwrap();
        assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
    }

    #[test]
    fn test_derivative_near_zero_reports_last_iterate() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::new(1e-12, 50).with_min_derivative(1e-8));
        // f(x) = x² + 1 has f'(0) = 0
        let report = solver.solve(|x: f64| (x * x + 1.0, 2.0 * x), 0.0).unwrap();
        assert_eq!(report.status, NewtonStatus::DerivativeNearZero);
        assert!(!report.converged());
        assert_eq!(report.root, 0.0);
    }

    #[test]
    fn test_max_iterations_reports_best_effort() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::new(1e-12, 5));
        // No real root: iteration wanders
        let report = solver.solve(|x: f64| (x * x + 1.0, 2.0 * x), 3.0).unwrap();
        assert_eq!(report.status, NewtonStatus::MaxIterations);
        assert_eq!(report.iterations, 5);
    }

    #[test]
    fn test_root_reached_on_final_step_is_converged() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::new(1e-12, 1));
        // One exact step from 0 lands on the root of a line
        let report = solver.solve(|x: f64| (x - 3.0, 1.0), 0.0).unwrap();
        assert_eq!(report.status, NewtonStatus::Converged);
        assert_eq!(report.root, 3.0);
        assert_eq!(report.iterations, 1);
    }

    #[test]
    fn test_bounds_are_respected() {
        let config = SolverConfig::new(1e-10, 100).with_bounds(0.5, 1.0);
        let solver = NewtonRaphsonSolver::new(config);
        // Root at 3.0 lies outside bounds: iterate pinned at upper bound
        let report = solver.solve(|x: f64| (x - 3.0, 1.0), 0.7).unwrap();
        assert!(!report.converged());
        assert_eq!(report.root, 1.0);
    }

    #[test]
    fn test_find_root_maps_status_to_error() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::new(1e-12, 3));
        let err = solver
            .find_root(|x: f64| x * x + 1.0, |x: f64| 2.0 * x, 3.0)
            .unwrap_err();
        assert_eq!(err, SolverError::MaxIterationsExceeded { iterations: 3 });
    }
}
