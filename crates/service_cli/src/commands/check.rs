//! Check command implementation
//!
//! Prints the configuration after file, environment and CLI overrides.

use quant_core::AnalyticsConfig;

use super::emit;
use crate::Result;

/// Run the check command
pub fn run(config: &AnalyticsConfig) -> Result<()> {
    config.validate()?;
    emit(config)
}
