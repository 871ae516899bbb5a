//! Monte Carlo command implementation

use quant_core::{AnalyticsConfig, CancellationFlag, InMemoryPositionStore};
use quant_risk::{MonteCarloRequest, RiskEngine};
use tracing::{info, warn};

use super::{emit, synthetic_provider};
use crate::Result;

/// Run the monte-carlo command
///
/// Ctrl-C cancels the batch between simulation chunks.
pub async fn run(
    config: &AnalyticsConfig,
    symbols: &[String],
    simulations: Option<usize>,
    horizon_days: Option<usize>,
    value: f64,
) -> Result<()> {
    let engine = RiskEngine::new(
        synthetic_provider(config)?,
        InMemoryPositionStore::default(),
        config,
    );
    let requests: Vec<MonteCarloRequest> = symbols
        .iter()
        .map(|symbol| MonteCarloRequest {
            symbol: symbol.clone(),
            simulations: simulations.unwrap_or(config.monte_carlo.simulations),
            horizon_days: horizon_days.unwrap_or(config.monte_carlo.horizon_days),
            value,
        })
        .collect();
    info!(symbols = requests.len(), "running monte carlo batch");

    let cancel = CancellationFlag::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling simulations");
            on_interrupt.cancel();
        }
    });

    let results = engine.monte_carlo_batch(&requests, &cancel).await;
    interrupt.abort();

    let rendered = results?
        .into_iter()
        .map(|(request, result)| -> Result<serde_json::Value> {
            let outcome = match result {
                Ok(summary) => serde_json::to_value(summary)?,
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            };
            let mut entry = serde_json::Map::new();
            entry.insert("request".to_string(), serde_json::to_value(request)?);
            entry.insert("result".to_string(), outcome);
            Ok(serde_json::Value::Object(entry))
        })
        .collect::<Result<Vec<_>>>()?;
    emit(&rendered)
}
