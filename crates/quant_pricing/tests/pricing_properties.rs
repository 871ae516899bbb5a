//! Property tests for Black-Scholes-Merton valuation.
//!
//! # Test Categories
//!
//! 1. **Parity**: put-call parity over random valid inputs
//! 2. **Limits**: expiry → 0⁺ and deep in/out of the money deltas
//! 3. **Inversion**: implied volatility round trip

use approx::assert_relative_eq;
use proptest::prelude::*;
use quant_core::QuantError;
use quant_pricing::{implied_volatility, price, OptionType};

proptest! {
    #[test]
    fn put_call_parity_holds(
        spot in 20.0_f64..200.0,
        strike in 20.0_f64..200.0,
        expiry in 0.05_f64..3.0,
        vol in 0.05_f64..1.0,
        rate in -0.01_f64..0.10,
        q in 0.0_f64..0.05,
    ) {
        let call = price(spot, strike, expiry, vol, OptionType::Call, rate, q).unwrap();
        let put = price(spot, strike, expiry, vol, OptionType::Put, rate, q).unwrap();
        let forward_gap = spot * (-q * expiry).exp() - strike * (-rate * expiry).exp();
        prop_assert!((call.price - put.price - forward_gap).abs() < 1e-8);
    }

    #[test]
    fn prices_are_non_negative_and_bounded(
        spot in 20.0_f64..200.0,
        strike in 20.0_f64..200.0,
        expiry in 0.05_f64..3.0,
        vol in 0.05_f64..1.0,
    ) {
        let call = price(spot, strike, expiry, vol, OptionType::Call, 0.05, 0.0).unwrap();
        prop_assert!(call.price >= -1e-12);
        prop_assert!(call.price <= spot + 1e-9);
        prop_assert!(call.greeks.delta >= 0.0 && call.greeks.delta <= 1.0);
        prop_assert!(call.greeks.gamma >= 0.0);
        prop_assert!(call.greeks.vega >= 0.0);
    }

    #[test]
    fn implied_vol_round_trip(
        strike in 90.0_f64..110.0,
        expiry in 0.25_f64..2.0,
        vol in 0.1_f64..1.5,
        is_call in any::<bool>(),
    ) {
        let option_type = if is_call { OptionType::Call } else { OptionType::Put };
        let quoted = price(100.0, strike, expiry, vol, option_type, 0.03, 0.0).unwrap();
        let iv = implied_volatility(quoted.price, 100.0, strike, expiry, option_type, 0.03, 0.0)
            .unwrap();
        prop_assert!(iv.converged, "no convergence for K={strike} T={expiry} vol={vol}");
        prop_assert!((iv.volatility - vol).abs() < 1e-4);
    }
}

#[test]
fn test_near_expiry_converges_to_intrinsic() {
    let expiry = 1e-8;
    let itm_call = price(110.0, 100.0, expiry, 0.2, OptionType::Call, 0.05, 0.0).unwrap();
    let otm_call = price(90.0, 100.0, expiry, 0.2, OptionType::Call, 0.05, 0.0).unwrap();
    let itm_put = price(90.0, 100.0, expiry, 0.2, OptionType::Put, 0.05, 0.0).unwrap();

    assert_relative_eq!(itm_call.price, 10.0, epsilon = 1e-4);
    assert_relative_eq!(otm_call.price, 0.0, epsilon = 1e-8);
    assert_relative_eq!(itm_put.price, 10.0, epsilon = 1e-4);
}

#[test]
fn test_deep_itm_call_delta_tends_to_dividend_discount() {
    let q = 0.02;
    let expiry = 0.5;
    let deep_itm = price(1_000.0, 100.0, expiry, 0.2, OptionType::Call, 0.05, q).unwrap();
    assert_relative_eq!(deep_itm.greeks.delta, (-q * expiry).exp(), epsilon = 1e-10);
}

#[test]
fn test_deep_otm_call_delta_tends_to_zero() {
    let deep_otm = price(10.0, 100.0, 0.5, 0.2, OptionType::Call, 0.05, 0.0).unwrap();
    assert!(deep_otm.greeks.delta.abs() < 1e-10);
    assert_eq!(deep_otm.greeks.lambda, 0.0);
}

#[test]
fn test_reference_scenario() {
    let result = price(100.0, 105.0, 0.25, 0.2, OptionType::Call, 0.05, 0.0).unwrap();
    assert_relative_eq!(result.price, 2.4779, epsilon = 1e-3);
    assert_relative_eq!(result.greeks.delta, 0.3772, epsilon = 1e-3);
    assert!(result.greeks.theta < 0.0);
}

#[test]
fn test_invalid_parameters_are_named() {
    let cases = [
        (0.0, 100.0, 1.0, 0.2, "spot"),
        (100.0, -1.0, 1.0, 0.2, "strike"),
        (100.0, 100.0, 0.0, 0.2, "time_to_expiration"),
        (100.0, 100.0, 1.0, 0.0, "volatility"),
    ];
    for (spot, strike, expiry, vol, expected) in cases {
        match price(spot, strike, expiry, vol, OptionType::Call, 0.05, 0.0) {
            Err(QuantError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
            other => panic!("Expected InvalidParameter({expected}), got {other:?}"),
        }
    }
}
