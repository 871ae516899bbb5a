//! Probability distribution functions.
//!
//! This module provides:
//! - `norm_cdf`: Standard normal cumulative distribution function
//! - `norm_pdf`: Standard normal probability density function
//! - `student_t_two_tailed_p`: Two-tailed p-value of a t statistic

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::function::erf::erfc;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal cumulative distribution function.
///
/// Φ(x) = (1/2) · erfc(−x / √2)
///
/// Symmetric to machine precision: `norm_cdf(x) + norm_cdf(-x) == 1`.
///
/// # Examples
/// ```
/// use quant_core::math::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!((norm_cdf(1.959_963_985) - 0.975).abs() < 1e-9);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal probability density function.
///
/// φ(x) = (1 / √(2π)) · exp(−x² / 2)
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Two-tailed p-value of a Student-t statistic.
///
/// Returns `2 · (1 − F(|t|))` for a t distribution with `dof` degrees of
/// freedom. Non-finite statistics map to 0 (infinitely significant) and a
/// zero `dof` maps to 1.
///
/// # Examples
/// ```
/// use quant_core::math::distributions::student_t_two_tailed_p;
///
/// let p = student_t_two_tailed_p(0.0, 30.0);
/// assert!((p - 1.0).abs() < 1e-12);
/// ```
pub fn student_t_two_tailed_p(t: f64, dof: f64) -> f64 {
    if dof <= 0.0 || t.is_nan() {
        return 1.0;
    }
    if t.is_infinite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}
