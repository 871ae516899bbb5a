//! Property tests for factor fits and attribution.

use chrono::NaiveDate;
use proptest::prelude::*;
use quant_core::QuantError;
use quant_factors::{attribute, fit_model, FactorCatalogue};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn attribution_always_closes(
        seed in 0_u64..1_000,
        beta in -2.0_f64..2.0,
        window in 1_usize..120,
    ) {
        let catalogue = FactorCatalogue::synthetic_with_len(seed, 150).unwrap();
        let market = catalogue.series("Market").unwrap().to_vec();
        let hml = catalogue.series("HML").unwrap();
        let returns: Vec<f64> = market
            .iter()
            .zip(hml)
            .enumerate()
            .map(|(i, (m, h))| beta * m - 0.3 * h + 0.001 * (0.37 * i as f64).cos())
            .collect();
        let factor_names = vec!["Market".to_string(), "HML".to_string()];

        let model = fit_model("P", &returns, &catalogue, &factor_names, 150, as_of()).unwrap();
        let attribution = attribute("P", &model, &returns, &catalogue, window).unwrap();
        let explained: f64 = attribution.contributions.iter().map(|c| c.contribution).sum();

        prop_assert!((attribution.alpha_return + explained - attribution.total_return).abs() < 1e-12);
        prop_assert!(model.r_squared >= 0.0 && model.r_squared <= 1.0);
        prop_assert!(model.adjusted_r_squared <= model.r_squared + 1e-15);
    }
}

#[test]
fn test_uncorrelated_returns_give_negative_adjusted_r_squared() {
    let n = 40;
    let trend: Vec<f64> = (0..n).map(|i| 0.001 * i as f64).collect();
    let alternating: Vec<f64> = (0..n)
        .map(|i| if i % 2 == 0 { 0.01 } else { -0.01 })
        .collect();
    let catalogue = FactorCatalogue::new().with_factor("Trend", trend);

    let model = fit_model(
        "ALT",
        &alternating,
        &catalogue,
        &["Trend".to_string()],
        n,
        as_of(),
    )
    .unwrap();

    assert!(model.r_squared >= 0.0);
    assert!(model.adjusted_r_squared < 0.0);
    assert!(!model.factors[0].is_significant());
}

#[test]
fn test_collinear_factor_is_degenerate() {
    let n = 60;
    let base: Vec<f64> = (0..n).map(|i| 0.01 * (0.5 * i as f64).sin()).collect();
    let returns: Vec<f64> = (0..n).map(|i| 0.01 * (1.3 * i as f64).cos()).collect();
    let catalogue = FactorCatalogue::new()
        .with_factor("A", base)
        .with_factor("Zero", vec![0.0; n]);

    let err = fit_model(
        "X",
        &returns,
        &catalogue,
        &["A".to_string(), "Zero".to_string()],
        n,
        as_of(),
    )
    .unwrap_err();
    assert!(matches!(err, QuantError::NumericalDegeneracy(_)));
}
