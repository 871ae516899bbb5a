//! Implied volatility by Newton-Raphson on the Black-Scholes-Merton price.

use quant_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
use quant_core::{QuantError, QuantResult};
use tracing::{debug, warn};

use crate::black_scholes::{validate_contract, BlackScholesMerton};
use crate::types::{ImpliedVolatility, OptionType};

/// Initial volatility guess.
pub const INITIAL_GUESS: f64 = 0.20;
/// Lower clamp for volatility iterates.
pub const MIN_VOLATILITY: f64 = 0.001;
/// Upper clamp for volatility iterates.
pub const MAX_VOLATILITY: f64 = 5.0;
/// Absolute price tolerance.
pub const PRICE_TOLERANCE: f64 = 1e-6;
/// Vega floor below which iteration stops.
pub const MIN_VEGA: f64 = 1e-10;
/// Iteration cap.
pub const MAX_ITERATIONS: usize = 100;

fn solver() -> NewtonRaphsonSolver<f64> {
    NewtonRaphsonSolver::new(
        SolverConfig::new(PRICE_TOLERANCE, MAX_ITERATIONS)
            .with_min_derivative(MIN_VEGA)
            .with_bounds(MIN_VOLATILITY, MAX_VOLATILITY),
    )
}

/// Invert the Black-Scholes-Merton price for volatility.
///
/// Non-convergence is not an error: the last iterate is returned with
/// `converged == false` and a warning is logged.
///
/// # Errors
/// `InvalidParameter` if `market_price <= 0` or spot, strike or expiry is
/// not positive. `NumericalDegeneracy` if an iterate becomes non-finite.
///
/// # Examples
/// ```
/// use quant_pricing::{implied_volatility, price, OptionType};
///
/// let quoted = price(100.0, 100.0, 0.5, 0.3, OptionType::Call, 0.05, 0.0).unwrap();
/// let iv = implied_volatility(quoted.price, 100.0, 100.0, 0.5, OptionType::Call, 0.05, 0.0)
///     .unwrap();
/// assert!(iv.converged);
/// assert!((iv.volatility - 0.3).abs() < 1e-4);
/// ```
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    expiry: f64,
    option_type: OptionType,
    rate: f64,
    dividend_yield: f64,
) -> QuantResult<ImpliedVolatility> {
    if !(market_price > 0.0 && market_price.is_finite()) {
        return Err(QuantError::invalid(
            "market_price",
            market_price,
            "must be positive",
        ));
    }
    validate_contract(strike, expiry)?;
    let model = BlackScholesMerton::new(spot, rate, dividend_yield, INITIAL_GUESS)?;

    let report = solver().solve(
        |sigma| {
            let trial = model.with_volatility(sigma);
            (
                trial.price(strike, expiry, option_type) - market_price,
                trial.raw_vega(strike, expiry),
            )
        },
        INITIAL_GUESS,
    )?;

    if report.converged() {
        debug!(
            volatility = report.root,
            iterations = report.iterations,
            "implied volatility converged"
        );
    } else {
        warn!(
            market_price,
            spot,
            strike,
            expiry,
            option_type = option_type.as_str(),
            last_iterate = report.root,
            iterations = report.iterations,
            status = ?report.status,
            "implied volatility did not converge"
        );
    }

    Ok(ImpliedVolatility {
        volatility: report.root,
        converged: report.converged(),
        iterations: report.iterations,
    })
}
