//! Factor model value types and the pure fitting routines behind them.

use chrono::{Duration, NaiveDate};
use quant_core::math::statistics::{coefficient_of_variation, sample_std_dev, TRADING_DAYS_PER_YEAR};
use quant_core::{require_observations, QuantError, QuantResult, MIN_OBSERVATIONS};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::catalogue::FactorCatalogue;
use crate::ols::{ols, OlsFit};

/// p-value below which a loading is considered significant.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// One fitted factor loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    /// Catalogue name
    pub name: String,
    /// Fitted loading
    pub beta: f64,
    /// β / SE(β)
    pub t_statistic: f64,
    /// Two-tailed p-value of the loading
    pub p_value: f64,
    /// Exposure used in attribution (the fitted loading)
    pub exposure: f64,
}

impl Factor {
    /// `p_value < 0.05`.
    #[inline]
    pub fn is_significant(&self) -> bool {
        self.p_value < SIGNIFICANCE_LEVEL
    }
}

/// A fitted linear factor model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorModel {
    /// Model label (the symbol for engine fits)
    pub name: String,
    /// Loadings in requested order; the intercept is reported as `alpha`
    pub factors: Vec<Factor>,
    /// Daily intercept, read through [`FactorModel::alpha`]
    pub(crate) alpha: f64,
    /// Coefficient of determination, in [0, 1]
    pub r_squared: f64,
    /// Adjusted R², may be negative
    pub adjusted_r_squared: f64,
    /// Annualised residual standard deviation
    pub tracking_error: f64,
    /// Alpha divided by its standard error
    pub information_ratio: f64,
    /// Start of the lookback period
    pub period_start: NaiveDate,
    /// Evaluation date
    pub period_end: NaiveDate,
    /// Observations used in the regression
    pub observations: usize,
}

impl FactorModel {
    /// Fitted daily intercept. Not one of the `factors`; its significance is
    /// summarised by `information_ratio`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Loading for `name`, if it was fitted.
    pub fn factor(&self, name: &str) -> Option<&Factor> {
        self.factors.iter().find(|f| f.name == name)
    }

    /// Loadings with `p < 0.05`.
    pub fn significant_factors(&self) -> impl Iterator<Item = &Factor> {
        self.factors.iter().filter(|f| f.is_significant())
    }
}

/// Return explained by one factor over the attribution window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    /// Factor name
    pub factor_name: String,
    /// Loading applied
    pub exposure: f64,
    /// Cumulative factor return over the window
    pub factor_return: f64,
    /// `exposure × factor_return`
    pub contribution: f64,
}

/// Decomposition of a security's window return into factor contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorAttribution {
    /// Security identifier
    pub symbol: String,
    /// Sum of the security's returns over the window
    pub total_return: f64,
    /// `total_return − Σ contribution`
    pub alpha_return: f64,
    /// Per-factor contributions in model order
    pub contributions: Vec<FactorContribution>,
    /// Same as `alpha_return`
    pub specific_return: f64,
}

/// Rolling-window loading stability per factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorStability {
    /// Security identifier
    pub symbol: String,
    /// Factor name to score in [0, 1]; 1 means a perfectly stable loading
    pub scores: BTreeMap<String, f64>,
    /// Sub-windows that produced a usable fit
    pub windows: usize,
}

/// Trailing `len` elements.
#[inline]
pub(crate) fn tail(values: &[f64], len: usize) -> &[f64] {
    &values[values.len() - len.min(values.len())..]
}

/// Trailing-aligned security and factor series of a common length.
fn align<'a>(
    security: &'a [f64],
    factors: &[&'a [f64]],
    limit: usize,
) -> (&'a [f64], Vec<&'a [f64]>) {
    let n = factors
        .iter()
        .map(|f| f.len())
        .fold(security.len().min(limit), usize::min);
    (tail(security, n), factors.iter().map(|f| tail(f, n)).collect())
}

fn model_from_fit(
    name: &str,
    factor_names: &[String],
    fit: &OlsFit,
    observations: usize,
    lookback: usize,
    as_of: NaiveDate,
) -> FactorModel {
    let factors = factor_names
        .iter()
        .enumerate()
        .map(|(i, factor_name)| {
            let beta = fit.coefficients[i + 1];
            Factor {
                name: factor_name.clone(),
                beta,
                t_statistic: fit.t_statistics[i + 1],
                p_value: fit.p_values[i + 1],
                exposure: beta,
            }
        })
        .collect();

    let se_alpha = fit.intercept_standard_error();
    let information_ratio = if se_alpha > 0.0 {
        fit.intercept() / se_alpha
    } else {
        0.0
    };

    FactorModel {
        name: name.to_string(),
        factors,
        alpha: fit.intercept(),
        r_squared: fit.r_squared,
        adjusted_r_squared: fit.adjusted_r_squared,
        tracking_error: sample_std_dev(&fit.residuals) * TRADING_DAYS_PER_YEAR.sqrt(),
        information_ratio,
        period_start: as_of - Duration::days(lookback as i64),
        period_end: as_of,
        observations,
    }
}

/// Fit `security_returns` on the named catalogue factors.
///
/// Uses the trailing `min(lookback, len)` observations common to the
/// security and every factor.
///
/// # Errors
/// - `UnknownFactor` for a name missing from `catalogue`
/// - `InsufficientData` for fewer than 30 aligned observations, or too few
///   for the number of factors
/// - `NumericalDegeneracy` for a singular design or constant returns
pub fn fit_model(
    name: &str,
    security_returns: &[f64],
    catalogue: &FactorCatalogue,
    factor_names: &[String],
    lookback: usize,
    as_of: NaiveDate,
) -> QuantResult<FactorModel> {
    let factor_series = catalogue.resolve(factor_names)?;
    let (y, regressors) = align(security_returns, &factor_series, lookback);
    require_observations(y.len())?;

    let fit = ols(y, &regressors)?;
    let model = model_from_fit(name, factor_names, &fit, y.len(), lookback, as_of);
    debug!(
        model = name,
        observations = y.len(),
        r_squared = model.r_squared,
        "fitted factor model"
    );
    Ok(model)
}

/// Split the last `window` returns into factor contributions.
///
/// # Errors
/// `InvalidParameter` for a zero window; `UnknownFactor` if a model factor is
/// missing from the catalogue.
pub fn attribute(
    symbol: &str,
    model: &FactorModel,
    security_returns: &[f64],
    catalogue: &FactorCatalogue,
    window: usize,
) -> QuantResult<FactorAttribution> {
    if window == 0 {
        return Err(QuantError::invalid("window", 0.0, "must be positive"));
    }
    let total_return: f64 = tail(security_returns, window).iter().sum();

    let contributions = model
        .factors
        .iter()
        .map(|factor| {
            let factor_return: f64 = tail(catalogue.series(&factor.name)?, window).iter().sum();
            Ok(FactorContribution {
                factor_name: factor.name.clone(),
                exposure: factor.exposure,
                factor_return,
                contribution: factor.exposure * factor_return,
            })
        })
        .collect::<QuantResult<Vec<_>>>()?;

    let explained: f64 = contributions.iter().map(|c| c.contribution).sum();
    let alpha_return = total_return - explained;

    Ok(FactorAttribution {
        symbol: symbol.to_string(),
        total_return,
        alpha_return,
        contributions,
        specific_return: alpha_return,
    })
}

/// `max(0, 1 − stdev/|mean|)`, 0 for a mean indistinguishable from zero.
pub fn stability_score(betas: &[f64]) -> f64 {
    coefficient_of_variation(betas).map_or(0.0, |cv| (1.0 - cv).max(0.0))
}

/// Refit on every `rolling_window_days` sub-window (step 1) of the last
/// `window` observations and score how stable each loading is.
///
/// Degenerate sub-windows are skipped with a warning.
///
/// # Errors
/// - `InvalidParameter` if `rolling_window_days > window`
/// - `InsufficientData` if `rolling_window_days < 30` or fewer aligned
///   observations than `rolling_window_days` are available
/// - `NumericalDegeneracy` if no sub-window could be fitted
pub fn stability(
    symbol: &str,
    security_returns: &[f64],
    catalogue: &FactorCatalogue,
    factor_names: &[String],
    window: usize,
    rolling_window_days: usize,
) -> QuantResult<FactorStability> {
    if rolling_window_days > window {
        return Err(QuantError::invalid(
            "rolling_window_days",
            rolling_window_days as f64,
            "must not exceed the window",
        ));
    }
    if rolling_window_days < MIN_OBSERVATIONS {
        return Err(QuantError::InsufficientData {
            got: rolling_window_days,
            need: MIN_OBSERVATIONS,
        });
    }

    let factor_series = catalogue.resolve(factor_names)?;
    let (y, regressors) = align(security_returns, &factor_series, window);
    if y.len() < rolling_window_days {
        return Err(QuantError::InsufficientData {
            got: y.len(),
            need: rolling_window_days,
        });
    }

    let starts = y.len() - rolling_window_days + 1;
    let fits: Vec<Vec<f64>> = (0..starts)
        .into_par_iter()
        .filter_map(|start| {
            let end = start + rolling_window_days;
            let sub: Vec<&[f64]> = regressors.iter().map(|r| &r[start..end]).collect();
            match ols(&y[start..end], &sub) {
                Ok(fit) => Some(fit.coefficients[1..].to_vec()),
                Err(e) => {
                    warn!(symbol, start, error = %e, "skipping degenerate stability window");
                    None
                }
            }
        })
        .collect();

    if fits.is_empty() {
        return Err(QuantError::NumericalDegeneracy(format!(
            "no usable rolling window for {}",
            symbol
        )));
    }

    let scores = factor_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let betas: Vec<f64> = fits.iter().map(|b| b[i]).collect();
            (name.clone(), stability_score(&betas))
        })
        .collect();

    Ok(FactorStability {
        symbol: symbol.to_string(),
        scores,
        windows: fits.len(),
    })
}
