//! QuantLens CLI - Command Line Access to the Analytics Engines
//!
//! This is the operational entry point for the quantlens analytics
//! workspace. Every command prints its result as JSON on stdout; logs go to
//! stderr.
//!
//! # Commands
//!
//! - `quantlens price` - Value a European option and its Greeks
//! - `quantlens implied-vol` - Invert a market price for volatility
//! - `quantlens fit` - Fit a factor model, with optional attribution/stability
//! - `quantlens risk` - Historical risk metrics for a symbol or portfolio
//! - `quantlens monte-carlo` - Simulate horizon outcomes for one or more symbols
//! - `quantlens check` - Print the resolved configuration
//!
//! Return series come from the seeded synthetic provider; the harness holds
//! no analytics logic of its own.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use quant_core::config::{build_config, ConfigOverrides};
use quant_core::telemetry::init_tracing;
use quant_core::Position;
use quant_pricing::OptionType;
use tracing::debug;

mod commands;
mod error;

pub use error::{CliError, Result};

/// QuantLens analytics CLI
#[derive(Parser)]
#[command(name = "quantlens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the risk-free rate
    #[arg(long, global = true)]
    rate: Option<f64>,

    /// Override the log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Override the Monte Carlo and synthetic data seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Option direction accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OptionKind {
    Call,
    Put,
}

impl From<OptionKind> for OptionType {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Call => OptionType::Call,
            OptionKind::Put => OptionType::Put,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Value a European option
    Price {
        /// Underlying price
        #[arg(long)]
        spot: f64,

        /// Strike price
        #[arg(long)]
        strike: f64,

        /// Time to expiration in years
        #[arg(long)]
        expiry: f64,

        /// Volatility (annualised, e.g. 0.2)
        #[arg(long)]
        vol: f64,

        /// Call or put
        #[arg(short = 't', long = "type", value_enum, default_value = "call")]
        option_type: OptionKind,

        /// Continuous dividend yield
        #[arg(short, long, default_value = "0.0")]
        dividend_yield: f64,

        /// Market price; attaches the implied volatility to the result
        #[arg(short, long)]
        market_price: Option<f64>,
    },

    /// Solve for the volatility matching a market price
    ImpliedVol {
        /// Observed option price
        #[arg(short, long)]
        market_price: f64,

        /// Underlying price
        #[arg(long)]
        spot: f64,

        /// Strike price
        #[arg(long)]
        strike: f64,

        /// Time to expiration in years
        #[arg(long)]
        expiry: f64,

        /// Call or put
        #[arg(short = 't', long = "type", value_enum, default_value = "call")]
        option_type: OptionKind,

        /// Continuous dividend yield
        #[arg(short, long, default_value = "0.0")]
        dividend_yield: f64,
    },

    /// Fit a multi-factor model for a symbol
    Fit {
        /// Security symbol
        symbol: String,

        /// Factors to regress on
        #[arg(short, long, value_delimiter = ',', default_value = "Market,SMB,HML,UMD")]
        factors: Vec<String>,

        /// Lookback in trading days
        #[arg(short, long, default_value = "252")]
        lookback: usize,

        /// Also attribute the last N days of return
        #[arg(long)]
        attribution_window: Option<usize>,

        /// Also score loading stability with this rolling window
        #[arg(long)]
        rolling_window: Option<usize>,
    },

    /// Historical risk metrics
    Risk {
        /// Security symbol; omit to analyse the positions given with --position
        symbol: Option<String>,

        /// Exposure value for a single symbol
        #[arg(short, long, default_value = "100000.0")]
        value: f64,

        /// Lookback in trading days
        #[arg(short, long, default_value = "252")]
        lookback: usize,

        /// Portfolio position as SYMBOL:QUANTITY:PRICE (repeatable)
        #[arg(short, long = "position", value_parser = parse_position)]
        positions: Vec<Position>,

        /// Confidence for component VaR in portfolio mode
        #[arg(long, default_value = "0.95")]
        confidence: f64,
    },

    /// Monte Carlo simulation of horizon outcomes
    MonteCarlo {
        /// Symbols to simulate
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Number of outcomes (defaults to configuration)
        #[arg(short = 'n', long)]
        simulations: Option<usize>,

        /// Horizon in trading days (defaults to configuration)
        #[arg(short = 'd', long)]
        horizon_days: Option<usize>,

        /// Exposure value per symbol
        #[arg(short, long, default_value = "100000.0")]
        value: f64,
    },

    /// Print the resolved configuration
    Check,
}

/// Parse `SYMBOL:QUANTITY:PRICE`.
fn parse_position(raw: &str) -> std::result::Result<Position, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [symbol, quantity, price] = parts.as_slice() else {
        return Err(format!("expected SYMBOL:QUANTITY:PRICE, got '{}'", raw));
    };
    if symbol.is_empty() {
        return Err("symbol must not be empty".to_string());
    }
    let quantity: f64 = quantity
        .parse()
        .map_err(|_| format!("invalid quantity '{}'", quantity))?;
    let price: f64 = price
        .parse()
        .map_err(|_| format!("invalid price '{}'", price))?;
    Ok(Position::new(*symbol, quantity, price))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        config_file: cli.config.clone(),
        risk_free_rate: cli.rate,
        log_level: cli.log_level.clone(),
        seed: cli.seed,
    };
    let config = build_config(&overrides)
        .map_err(CliError::from)
        .context("failed to resolve configuration")?;

    init_tracing(config.log_level.as_filter_str());
    debug!(?config, "configuration resolved");

    match cli.command {
        Commands::Price {
            spot,
            strike,
            expiry,
            vol,
            option_type,
            dividend_yield,
            market_price,
        } => {
            commands::price::run(
                &config,
                commands::price::PriceArgs {
                    spot,
                    strike,
                    expiry,
                    volatility: vol,
                    option_type: option_type.into(),
                    dividend_yield,
                    market_price,
                },
            )
            .await?
        }
        Commands::ImpliedVol {
            market_price,
            spot,
            strike,
            expiry,
            option_type,
            dividend_yield,
        } => {
            commands::implied_vol::run(
                &config,
                market_price,
                spot,
                strike,
                expiry,
                option_type.into(),
                dividend_yield,
            )
            .await?
        }
        Commands::Fit {
            symbol,
            factors,
            lookback,
            attribution_window,
            rolling_window,
        } => {
            commands::fit::run(
                &config,
                &symbol,
                &factors,
                lookback,
                attribution_window,
                rolling_window,
            )
            .await?
        }
        Commands::Risk {
            symbol,
            value,
            lookback,
            positions,
            confidence,
        } => {
            commands::risk::run(
                &config,
                symbol.as_deref(),
                value,
                lookback,
                positions,
                confidence,
            )
            .await?
        }
        Commands::MonteCarlo {
            symbols,
            simulations,
            horizon_days,
            value,
        } => {
            commands::monte_carlo::run(&config, &symbols, simulations, horizon_days, value).await?
        }
        Commands::Check => commands::check::run(&config)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_position() {
        let position = parse_position("AAPL:100:190.5").unwrap();
        assert_eq!(position.symbol, "AAPL");
        assert_eq!(position.quantity, 100.0);
        assert_eq!(position.current_price, 190.5);

        assert!(parse_position("AAPL:100").is_err());
        assert!(parse_position(":1:2").is_err());
        assert!(parse_position("AAPL:x:2").is_err());
    }

    #[test]
    fn test_parses_price_command() {
        let cli = Cli::try_parse_from([
            "quantlens", "price", "--spot", "100", "--strike", "105", "--expiry", "0.25",
            "--vol", "0.2", "--type", "put",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Price {
                option_type: OptionKind::Put,
                ..
            }
        ));
    }

    #[test]
    fn test_fit_factor_list_is_comma_separated() {
        let cli = Cli::try_parse_from(["quantlens", "fit", "MSFT", "--factors", "Market,HML"])
            .unwrap();
        match cli.command {
            Commands::Fit { factors, .. } => assert_eq!(factors, ["Market", "HML"]),
            _ => panic!("expected fit"),
        }
    }
}
