//! Ordinary least squares via the normal equations.
//!
//! β = (XᵗX)⁻¹Xᵗy with X = [1, f₁ … f_k].

use nalgebra::{DMatrix, DVector};
use quant_core::math::distributions::student_t_two_tailed_p;
use quant_core::{QuantError, QuantResult};

/// Reciprocal condition estimate of XᵗX below which the solve is refused.
const MIN_RECIPROCAL_CONDITION: f64 = 1e-14;

/// Total sum of squares treated as zero variance.
const MIN_TOTAL_SUM_OF_SQUARES: f64 = 1e-20;

/// Fitted regression with intercept at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// Intercept followed by one slope per regressor
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient
    pub standard_errors: Vec<f64>,
    /// t-statistic of each coefficient
    pub t_statistics: Vec<f64>,
    /// Two-tailed p-value of each coefficient
    pub p_values: Vec<f64>,
    /// y − Xβ
    pub residuals: Vec<f64>,
    /// Coefficient of determination, in [0, 1]
    pub r_squared: f64,
    /// Adjusted R², may be negative
    pub adjusted_r_squared: f64,
    /// Residual degrees of freedom n − k − 1
    pub degrees_of_freedom: usize,
}

impl OlsFit {
    /// Intercept estimate.
    #[inline]
    pub fn intercept(&self) -> f64 {
        self.coefficients[0]
    }

    /// Standard error of the intercept.
    #[inline]
    pub fn intercept_standard_error(&self) -> f64 {
        self.standard_errors[0]
    }
}

/// t = β / SE; a perfect fit with non-zero β gives ±∞, and 0/0 gives 0.
fn t_statistic(beta: f64, se: f64) -> f64 {
    if se > 0.0 {
        beta / se
    } else if beta == 0.0 {
        0.0
    } else {
        beta.signum() * f64::INFINITY
    }
}

/// Regress `y` on an intercept plus `regressors`.
///
/// Every regressor must have the same length as `y`.
///
/// # Errors
/// - `InsufficientData` if `n − k − 1 ≤ 0`
/// - `NumericalDegeneracy` if XᵗX is singular or `y` has zero variance
pub fn ols(y: &[f64], regressors: &[&[f64]]) -> QuantResult<OlsFit> {
    let n = y.len();
    let k = regressors.len();
    if n <= k + 1 {
        return Err(QuantError::InsufficientData { got: n, need: k + 2 });
    }
    if let Some(bad) = regressors.iter().find(|r| r.len() != n) {
        return Err(QuantError::NumericalDegeneracy(format!(
            "regressor length {} does not match {} observations",
            bad.len(),
            n
        )));
    }
    let dof = n - k - 1;

    let x = DMatrix::from_fn(n, k + 1, |i, j| if j == 0 { 1.0 } else { regressors[j - 1][i] });
    let y_vec = DVector::from_column_slice(y);
    let xt = x.transpose();
    let xtx = &xt * &x;

    let singular_values = xtx.singular_values();
    let largest = singular_values.max();
    let smallest = singular_values.min();
    if !(largest > 0.0) || smallest / largest < MIN_RECIPROCAL_CONDITION {
        return Err(QuantError::NumericalDegeneracy(
            "design matrix is singular".to_string(),
        ));
    }
    let xtx_inv = xtx
        .try_inverse()
        .ok_or_else(|| QuantError::NumericalDegeneracy("design matrix is singular".to_string()))?;

    let beta = &xtx_inv * (&xt * &y_vec);
    let residuals = &y_vec - &x * &beta;

    let y_mean = y.iter().sum::<f64>() / n as f64;
    let sst: f64 = y.iter().map(|v| (v - y_mean) * (v - y_mean)).sum();
    if !(sst > MIN_TOTAL_SUM_OF_SQUARES) {
        return Err(QuantError::NumericalDegeneracy(
            "security returns have zero variance".to_string(),
        ));
    }
    let ssr = residuals.norm_squared();

    let r_squared = (1.0 - ssr / sst).clamp(0.0, 1.0);
    let adjusted_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / dof as f64;

    let mse = ssr / dof as f64;
    let standard_errors: Vec<f64> = (0..=k)
        .map(|j| (mse * xtx_inv[(j, j)]).max(0.0).sqrt())
        .collect();
    let coefficients: Vec<f64> = beta.iter().copied().collect();
    let t_statistics: Vec<f64> = coefficients
        .iter()
        .zip(&standard_errors)
        .map(|(&b, &se)| t_statistic(b, se))
        .collect();
    let p_values = t_statistics
        .iter()
        .map(|&t| student_t_two_tailed_p(t, dof as f64))
        .collect();

    Ok(OlsFit {
        coefficients,
        standard_errors,
        t_statistics,
        p_values,
        residuals: residuals.iter().copied().collect(),
        r_squared,
        adjusted_r_squared,
        degrees_of_freedom: dof,
    })
}
