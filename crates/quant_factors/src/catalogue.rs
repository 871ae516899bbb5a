//! Named factor return series.
//!
//! Every series is a daily return history, oldest first, aligned on its
//! trailing index with the security returns it is regressed against.

use quant_core::{QuantError, QuantResult, MAX_HISTORY_DAYS};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::collections::BTreeMap;

/// Fama-French/Carhart factors shipped with the synthetic catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StandardFactor {
    /// Market excess return
    Market,
    /// Small minus big
    Smb,
    /// High minus low book-to-market
    Hml,
    /// Up minus down (momentum)
    Umd,
}

impl StandardFactor {
    /// All standard factors in canonical order.
    pub fn all() -> [Self; 4] {
        [Self::Market, Self::Smb, Self::Hml, Self::Umd]
    }

    /// Catalogue name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Market => "Market",
            Self::Smb => "SMB",
            Self::Hml => "HML",
            Self::Umd => "UMD",
        }
    }

    /// Get description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Market => "Market portfolio return in excess of the risk-free rate",
            Self::Smb => "Small-cap minus large-cap size premium",
            Self::Hml => "Value minus growth book-to-market premium",
            Self::Umd => "Past winners minus past losers momentum premium",
        }
    }

    /// Daily (mean, volatility) of the synthetic series.
    fn synthetic_moments(&self) -> (f64, f64) {
        match self {
            Self::Market => (0.0004, 0.010),
            Self::Smb => (0.0001, 0.005),
            Self::Hml => (0.0001, 0.005),
            Self::Umd => (0.0002, 0.006),
        }
    }
}

/// Lookup table from factor name to its return series.
///
/// # Examples
/// ```
/// use quant_factors::FactorCatalogue;
///
/// let catalogue = FactorCatalogue::new().with_factor("Market", vec![0.01, -0.02, 0.005]);
/// assert_eq!(catalogue.series("Market").unwrap().len(), 3);
/// assert!(catalogue.series("Quality").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FactorCatalogue {
    factors: BTreeMap<String, Vec<f64>>,
}

impl FactorCatalogue {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a factor series.
    pub fn with_factor(mut self, name: impl Into<String>, returns: Vec<f64>) -> Self {
        self.factors.insert(name.into(), returns);
        self
    }

    /// Seeded Market/SMB/HML/UMD series of `MAX_HISTORY_DAYS` observations.
    ///
    /// Placeholder for a real factor data feed; each factor draws from its
    /// own stream so the catalogue is reproducible for a given seed.
    pub fn synthetic(seed: u64) -> QuantResult<Self> {
        Self::synthetic_with_len(seed, MAX_HISTORY_DAYS)
    }

    /// Seeded standard factors with `len` observations each.
    pub fn synthetic_with_len(seed: u64, len: usize) -> QuantResult<Self> {
        let mut catalogue = Self::new();
        for (i, factor) in StandardFactor::all().iter().enumerate() {
            let (mu, sigma) = factor.synthetic_moments();
            let normal =
                Normal::new(mu, sigma).map_err(|e| QuantError::NumericalDegeneracy(e.to_string()))?;
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64 + 1));
            let series = (0..len).map(|_| normal.sample(&mut rng)).collect();
            catalogue = catalogue.with_factor(factor.name(), series);
        }
        Ok(catalogue)
    }

    /// Return series for `name`.
    ///
    /// # Errors
    /// `UnknownFactor` if the name is not in the catalogue.
    pub fn series(&self, name: &str) -> QuantResult<&[f64]> {
        self.factors
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| QuantError::UnknownFactor(name.to_string()))
    }

    /// Resolve several names at once, preserving order.
    pub fn resolve<'a>(&'a self, names: &[String]) -> QuantResult<Vec<&'a [f64]>> {
        names.iter().map(|name| self.series(name)).collect()
    }

    /// Whether `name` is known.
    pub fn contains(&self, name: &str) -> bool {
        self.factors.contains_key(name)
    }

    /// Known factor names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.factors.keys().cloned().collect()
    }

    /// Number of factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}
