//! Fingerprinted result cache shared by the analytics engines.
//!
//! Each engine owns its own [`ResultCache`] constructed with an explicit
//! staleness window and capacity. Entries are keyed by a deterministic
//! [`Fingerprint`] of the call parameters.
//!
//! ## Guarantees
//!
//! - Safe for concurrent reads and writes (`dashmap` shards).
//! - At most one in-flight computation per fingerprint: concurrent misses on
//!   the same key wait on a per-key async mutex and re-check the cache once
//!   they acquire it.
//! - Stale entries are discarded lazily on lookup or when capacity is hit.

use dashmap::DashMap;
use std::fmt::Write as _;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Deterministic request fingerprint.
///
/// Floats are rendered with their shortest round-trip representation so two
/// requests collide only when their parameters are bit-for-bit equal.
///
/// # Examples
/// ```
/// use quant_core::cache::Fingerprint;
///
/// let key = Fingerprint::new("risk")
///     .field("symbol", "AAPL")
///     .float("value", 100_000.0)
///     .int("lookback", 252)
///     .finish();
/// assert_eq!(key, "risk|symbol=AAPL|value=100000.0|lookback=252");
/// ```
#[derive(Debug, Clone)]
pub struct Fingerprint {
    buffer: String,
}

impl Fingerprint {
    /// Start a fingerprint in the given namespace.
    pub fn new(namespace: &str) -> Self {
        Self {
            buffer: namespace.to_string(),
        }
    }

    /// Append a string field.
    pub fn field(mut self, name: &str, value: &str) -> Self {
        let _ = write!(self.buffer, "|{}={}", name, value);
        self
    }

    /// Append a float field.
    pub fn float(mut self, name: &str, value: f64) -> Self {
        let _ = write!(self.buffer, "|{}={:?}", name, value);
        self
    }

    /// Append an integer field.
    pub fn int(mut self, name: &str, value: u64) -> Self {
        let _ = write!(self.buffer, "|{}={}", name, value);
        self
    }

    /// Append an ordered list of names.
    pub fn list(mut self, name: &str, values: &[String]) -> Self {
        let _ = write!(self.buffer, "|{}=[{}]", name, values.join(","));
        self
    }

    /// Finalise into the cache key.
    pub fn finish(self) -> String {
        self.buffer
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Concurrent TTL cache with single-flight computation.
///
/// # Examples
/// ```
/// use quant_core::cache::ResultCache;
/// use std::time::Duration;
///
/// let cache: ResultCache<f64> = ResultCache::new("doc", Duration::from_secs(60), 16);
/// cache.insert("k", 1.5);
/// assert_eq!(cache.get("k"), Some(1.5));
/// assert!(cache.invalidate("k"));
/// assert!(cache.get("k").is_none());
/// ```
#[derive(Debug)]
pub struct ResultCache<V> {
    name: &'static str,
    entries: DashMap<String, CacheEntry<V>>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    ttl: Duration,
    capacity: usize,
}

impl<V: Clone> ResultCache<V> {
    /// Create a cache with a staleness window and maximum entry count.
    ///
    /// A zero capacity is treated as one.
    pub fn new(name: &'static str, ttl: Duration, capacity: usize) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Returns the staleness window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently held (fresh or not yet evicted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a fresh entry, discarding it if stale.
    pub fn get(&self, key: &str) -> Option<V> {
        let stale = match self.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if stale {
            self.entries
                .remove_if(key, |_, entry| entry.inserted_at.elapsed() > self.ttl);
            tracing::debug!(cache = self.name, key, "discarded stale entry");
        }
        None
    }

    /// Store a value, evicting expired then oldest entries at capacity.
    pub fn insert(&self, key: &str, value: V) {
        if !self.entries.contains_key(key) && self.entries.len() >= self.capacity {
            self.evict();
        }
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop one entry. Returns whether it existed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn evict(&self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.inserted_at.elapsed() <= ttl);
        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().inserted_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                    tracing::debug!(cache = self.name, key = %key, "evicted oldest entry");
                }
                None => break,
            }
        }
    }

    /// Return the cached value for `key` or compute and store it.
    ///
    /// Concurrent callers with the same key run `compute` at most once; the
    /// others wait and receive the stored result. Errors are not cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            tracing::debug!(cache = self.name, key, "cache hit");
            return Ok(value);
        }

        let gate = self
            .in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = gate.lock().await;
            if let Some(value) = self.get(key) {
                tracing::debug!(cache = self.name, key, "cache hit after wait");
                Ok(value)
            } else {
                tracing::debug!(cache = self.name, key, "cache miss");
                let computed = compute().await;
                if let Ok(value) = &computed {
                    self.insert(key, value.clone());
                }
                computed
            }
        };

        drop(gate);
        self.in_flight
            .remove_if(key, |_, gate| Arc::strong_count(gate) == 1);

        result
    }
}
