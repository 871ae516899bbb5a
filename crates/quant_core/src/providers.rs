//! External collaborators consumed by the engines.
//!
//! - [`ReturnProvider`]: historical periodic (daily) fractional returns
//! - [`PositionStore`]: current portfolio positions
//!
//! Live market data and persisted positions are outside this workspace; the
//! in-memory and synthetic implementations here serve as fixtures and as
//! placeholder integration points.

use crate::error::{QuantError, QuantResult};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Longest history a provider returns (three trading years).
pub const MAX_HISTORY_DAYS: usize = 756;

/// Supplier of historical return series.
#[async_trait]
pub trait ReturnProvider: Send + Sync {
    /// Ordered daily fractional returns for `symbol`, oldest first, of length
    /// at most `min(lookback_days, MAX_HISTORY_DAYS)`.
    async fn returns(&self, symbol: &str, lookback_days: usize) -> QuantResult<Vec<f64>>;
}

/// A single portfolio holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Instrument identifier
    pub symbol: String,
    /// Units held
    pub quantity: f64,
    /// Latest price per unit
    pub current_price: f64,
}

impl Position {
    /// Create a position.
    pub fn new(symbol: impl Into<String>, quantity: f64, current_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            current_price,
        }
    }

    /// Quantity times current price.
    #[inline]
    pub fn market_value(&self) -> f64 {
        self.quantity * self.current_price
    }
}

/// Supplier of current portfolio positions.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// All current positions.
    async fn positions(&self) -> QuantResult<Vec<Position>>;

    /// Aggregate market value of all positions.
    async fn total_value(&self) -> QuantResult<f64> {
        Ok(self.positions().await?.iter().map(Position::market_value).sum())
    }
}

/// Fixed return series keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReturnProvider {
    series: HashMap<String, Vec<f64>>,
}

impl InMemoryReturnProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a series for `symbol`, replacing any previous one.
    pub fn with_series(mut self, symbol: impl Into<String>, returns: Vec<f64>) -> Self {
        self.series.insert(symbol.into(), returns);
        self
    }
}

#[async_trait]
impl ReturnProvider for InMemoryReturnProvider {
    async fn returns(&self, symbol: &str, lookback_days: usize) -> QuantResult<Vec<f64>> {
        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| QuantError::Provider(format!("no return history for {}", symbol)))?;
        let take = lookback_days.min(MAX_HISTORY_DAYS).min(series.len());
        Ok(series[series.len() - take..].to_vec())
    }
}

/// Seeded generator of normally distributed daily returns.
///
/// Each symbol owns a fixed history of [`MAX_HISTORY_DAYS`] draws, seeded by
/// the base seed and a SHA-256 digest of the symbol. A lookback selects the
/// trailing part of that history, so shorter windows are tails of longer
/// ones and a given `(seed, symbol, lookback)` always yields the same series.
#[derive(Debug, Clone)]
pub struct SyntheticReturnProvider {
    seed: u64,
    mean: f64,
    volatility: f64,
}

impl SyntheticReturnProvider {
    /// Create a generator with daily drift `mean` and daily `volatility`.
    ///
    /// # Errors
    /// `InvalidParameter` if `volatility` is not positive and finite.
    pub fn new(seed: u64, mean: f64, volatility: f64) -> QuantResult<Self> {
        if !(volatility > 0.0 && volatility.is_finite()) {
            return Err(QuantError::invalid(
                "volatility",
                volatility,
                "must be positive and finite",
            ));
        }
        Ok(Self {
            seed,
            mean,
            volatility,
        })
    }

    /// Per-symbol stream seed.
    pub fn symbol_seed(&self, symbol: &str) -> u64 {
        let digest = Sha256::digest(symbol.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        self.seed ^ u64::from_le_bytes(prefix)
    }

    /// Full [`MAX_HISTORY_DAYS`] history for `symbol`, oldest first.
    pub fn history(&self, symbol: &str) -> QuantResult<Vec<f64>> {
        let normal = Normal::new(self.mean, self.volatility)
            .map_err(|e| QuantError::NumericalDegeneracy(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(self.symbol_seed(symbol));
        Ok((0..MAX_HISTORY_DAYS).map(|_| normal.sample(&mut rng)).collect())
    }

    /// Trailing `len` returns of the symbol's history, capped at
    /// [`MAX_HISTORY_DAYS`].
    pub fn generate(&self, symbol: &str, len: usize) -> QuantResult<Vec<f64>> {
        let mut history = self.history(symbol)?;
        let start = history.len() - len.min(history.len());
        Ok(history.split_off(start))
    }
}

#[async_trait]
impl ReturnProvider for SyntheticReturnProvider {
    async fn returns(&self, symbol: &str, lookback_days: usize) -> QuantResult<Vec<f64>> {
        self.generate(symbol, lookback_days)
    }
}

/// Positions held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPositionStore {
    positions: Vec<Position>,
}

impl InMemoryPositionStore {
    /// Create a store with the given positions.
    pub fn new(positions: Vec<Position>) -> Self {
        Self { positions }
    }
}

#[async_trait]
impl PositionStore for InMemoryPositionStore {
    async fn positions(&self) -> QuantResult<Vec<Position>> {
        Ok(self.positions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[tokio::test]
    async fn test_in_memory_provider_returns_tail() {
        let provider = InMemoryReturnProvider::new().with_series("AAA", vec![0.1, 0.2, 0.3, 0.4]);
        let tail = provider.returns("AAA", 2).await.unwrap();
        assert_eq!(tail, vec![0.3, 0.4]);
        let all = provider.returns("AAA", 100).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_in_memory_provider_unknown_symbol() {
        let provider = InMemoryReturnProvider::new();
        let err = provider.returns("ZZZ", 10).await.unwrap_err();
        assert!(matches!(err, QuantError::Provider(_)));
    }

    #[tokio::test]
    async fn test_synthetic_provider_is_reproducible() {
        let provider = SyntheticReturnProvider::new(7, 0.0005, 0.02).unwrap();
        let a = provider.returns("AAPL", 252).await.unwrap();
        let b = provider.returns("AAPL", 252).await.unwrap();
        let c = provider.returns("MSFT", 252).await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 252);
    }

    #[tokio::test]
    async fn test_synthetic_provider_caps_history() {
        let provider = SyntheticReturnProvider::new(7, 0.0, 0.01).unwrap();
        let series = provider.returns("AAPL", 5_000).await.unwrap();
        assert_eq!(series.len(), MAX_HISTORY_DAYS);
    }

    #[tokio::test]
    async fn test_synthetic_short_window_is_tail_of_long_window() {
        let provider = SyntheticReturnProvider::new(3, 0.0005, 0.02).unwrap();
        let long = provider.returns("AAPL", 252).await.unwrap();
        let short = provider.returns("AAPL", 21).await.unwrap();
        assert_eq!(short.as_slice(), &long[long.len() - 21..]);

        let full = provider.history("AAPL").unwrap();
        assert_eq!(long.as_slice(), &full[full.len() - 252..]);
    }

    #[test]
    fn test_symbol_seed_is_stable() {
        let provider = SyntheticReturnProvider::new(0, 0.0, 0.01).unwrap();
        // First eight bytes of SHA-256("AAPL"), little-endian
        let expected = 0xeba4_7152_624d_b41e_u64;
        assert_eq!(provider.symbol_seed("AAPL"), expected);
        let shifted = SyntheticReturnProvider::new(5, 0.0, 0.01).unwrap();
        assert_eq!(shifted.symbol_seed("AAPL"), expected ^ 5);
    }

    #[test]
    fn test_synthetic_provider_rejects_bad_volatility() {
        assert!(SyntheticReturnProvider::new(1, 0.0, 0.0).is_err());
        assert!(SyntheticReturnProvider::new(1, 0.0, f64::NAN).is_err());
    }

    #[tokio::test]
    async fn test_position_store_total_value() {
        let store = InMemoryPositionStore::new(vec![
            Position::new("AAA", 10.0, 50.0),
            Position::new("BBB", 5.0, 20.0),
        ]);
        assert_relative_eq!(store.total_value().await.unwrap(), 600.0);
    }
}
