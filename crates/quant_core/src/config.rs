//! Analytics configuration management.
//!
//! Handles loading configuration from TOML files, environment variables and
//! caller overrides.
//!
//! Priority (highest to lowest):
//! 1. Caller (CLI) overrides
//! 2. Environment variables
//! 3. Config file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid risk-free rate: {0}. Must be finite")]
    InvalidRate(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid cache settings for {0}: capacity must be positive")]
    InvalidCache(&'static str),

    #[error("Invalid Monte Carlo settings: {0}")]
    InvalidMonteCarlo(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels understood by the tracing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Staleness window and size bound for one engine cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Seconds an entry stays fresh
    pub ttl_secs: u64,
    /// Maximum number of entries
    pub capacity: usize,
}

impl CacheSettings {
    /// Create cache settings.
    pub const fn new(ttl_secs: u64, capacity: usize) -> Self {
        Self { ttl_secs, capacity }
    }

    /// Staleness window as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Monte Carlo defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloSettings {
    /// Number of simulated outcomes
    pub simulations: usize,
    /// Holding period in trading days
    pub horizon_days: usize,
    /// Historical sample used to estimate drift and volatility
    pub lookback_days: usize,
    /// Base seed for the simulation generator
    pub seed: u64,
}

impl Default for MonteCarloSettings {
    fn default() -> Self {
        Self {
            simulations: 10_000,
            horizon_days: 22,
            lookback_days: 252,
            seed: 42,
        }
    }
}

/// Configuration shared by the analytics engines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Annualised risk-free rate feeding the pricing kernel
    pub risk_free_rate: f64,
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Pricing kernel cache
    pub pricing_cache: CacheSettings,
    /// Factor model cache
    pub factor_cache: CacheSettings,
    /// Risk engine cache
    pub risk_cache: CacheSettings,
    /// Monte Carlo defaults
    pub monte_carlo: MonteCarloSettings,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            log_level: LogLevel::Info,
            pricing_cache: CacheSettings::new(3_600, 4_096),
            factor_cache: CacheSettings::new(86_400, 1_024),
            risk_cache: CacheSettings::new(3_600, 1_024),
            monte_carlo: MonteCarloSettings::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Create a new AnalyticsConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AnalyticsConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rate) = lookup("QUANT_RISK_FREE_RATE") {
            self.risk_free_rate = rate
                .parse()
                .map_err(|_| ConfigError::EnvError(format!("QUANT_RISK_FREE_RATE={}", rate)))?;
        }

        if let Some(level) = lookup("QUANT_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }

        if let Some(seed) = lookup("QUANT_MC_SEED") {
            self.monte_carlo.seed = seed
                .parse()
                .map_err(|_| ConfigError::EnvError(format!("QUANT_MC_SEED={}", seed)))?;
        }

        if let Some(sims) = lookup("QUANT_MC_SIMULATIONS") {
            self.monte_carlo.simulations = sims
                .parse()
                .map_err(|_| ConfigError::EnvError(format!("QUANT_MC_SIMULATIONS={}", sims)))?;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::InvalidRate(self.risk_free_rate));
        }
        for (name, cache) in [
            ("pricing_cache", &self.pricing_cache),
            ("factor_cache", &self.factor_cache),
            ("risk_cache", &self.risk_cache),
        ] {
            if cache.capacity == 0 {
                return Err(ConfigError::InvalidCache(name));
            }
        }
        if self.monte_carlo.simulations == 0 {
            return Err(ConfigError::InvalidMonteCarlo(
                "simulations must be positive".to_string(),
            ));
        }
        if self.monte_carlo.horizon_days == 0 {
            return Err(ConfigError::InvalidMonteCarlo(
                "horizon_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Caller overrides, typically parsed from the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Config file path
    pub config_file: Option<std::path::PathBuf>,
    /// Risk-free rate override
    pub risk_free_rate: Option<f64>,
    /// Log level override
    pub log_level: Option<String>,
    /// Monte Carlo seed override
    pub seed: Option<u64>,
}

/// Build configuration from all sources
pub fn build_config(overrides: &ConfigOverrides) -> Result<AnalyticsConfig, ConfigError> {
    let mut config = match &overrides.config_file {
        Some(path) => AnalyticsConfig::from_file(path)?,
        None => AnalyticsConfig::default(),
    };

    config.apply_env()?;

    if let Some(rate) = overrides.risk_free_rate {
        config.risk_free_rate = rate;
    }
    if let Some(level) = &overrides.log_level {
        config.log_level = LogLevel::from_str(level)?;
    }
    if let Some(seed) = overrides.seed {
        config.monte_carlo.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.risk_free_rate, 0.05);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.factor_cache.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.monte_carlo.lookback_days, 252);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalyticsConfig::from_toml_str(
            r#"
            risk_free_rate = 0.03
            log_level = "debug"

            [monte_carlo]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.risk_free_rate, 0.03);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.monte_carlo.seed, 7);
        assert_eq!(config.monte_carlo.simulations, 10_000);
        assert_eq!(config.risk_cache.capacity, 1_024);
    }

    #[test]
    fn test_invalid_log_level_in_toml() {
        let err = AnalyticsConfig::from_toml_str(r#"log_level = "loud""#).unwrap_err();
        assert!(matches!(err, ConfigError::FileError(_)));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = AnalyticsConfig::from_toml_str(
            r#"
            [risk_cache]
            ttl_secs = 10
            capacity = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCache("risk_cache")));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("QUANT_RISK_FREE_RATE", "0.04"),
            ("QUANT_LOG_LEVEL", "warn"),
            ("QUANT_MC_SEED", "99"),
        ]
        .into_iter()
        .collect();

        let mut config = AnalyticsConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.risk_free_rate, 0.04);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.monte_carlo.seed, 99);
    }

    #[test]
    fn test_bad_override_is_reported() {
        let mut config = AnalyticsConfig::default();
        let err = config
            .apply_overrides(|name| (name == "QUANT_MC_SIMULATIONS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(_)));
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("TRACE").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("verbose").is_err());
        assert_eq!(LogLevel::Error.to_string(), "error");
    }
}
