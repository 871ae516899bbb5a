//! CLI error types

use quant_core::{ConfigError, QuantError};
use thiserror::Error;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be resolved
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An analytics engine rejected the request
    #[error("Analytics error: {0}")]
    Analytics(#[from] QuantError),

    /// Command-line arguments are inconsistent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Result could not be rendered
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;
