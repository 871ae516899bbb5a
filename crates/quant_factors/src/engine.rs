//! Factor engine: provider-backed fits with a fingerprinted cache.

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use quant_core::{
    AnalyticsConfig, CancellationFlag, Fingerprint, QuantError, QuantResult, ResultCache,
    ReturnProvider,
};
use std::collections::BTreeMap;
use tracing::{info, instrument};

use crate::catalogue::FactorCatalogue;
use crate::model::{self, FactorAttribution, FactorModel, FactorStability};

/// Multi-factor regression engine over a return provider.
pub struct FactorEngine<P> {
    provider: P,
    catalogue: FactorCatalogue,
    cache: ResultCache<FactorModel>,
}

impl<P: ReturnProvider> FactorEngine<P> {
    /// Create an engine with the configured factor cache settings.
    pub fn new(provider: P, catalogue: FactorCatalogue, config: &AnalyticsConfig) -> Self {
        let settings = config.factor_cache;
        Self {
            provider,
            catalogue,
            cache: ResultCache::new("factor", settings.ttl(), settings.capacity),
        }
    }

    /// The factor series used for fitting.
    pub fn catalogue(&self) -> &FactorCatalogue {
        &self.catalogue
    }

    /// The engine's model cache.
    pub fn cache(&self) -> &ResultCache<FactorModel> {
        &self.cache
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Fit caller-supplied returns; never cached.
    pub fn fit(
        &self,
        security_returns: &[f64],
        factor_names: &[String],
        lookback: usize,
    ) -> QuantResult<FactorModel> {
        model::fit_model(
            &factor_names.join("+"),
            security_returns,
            &self.catalogue,
            factor_names,
            lookback,
            Self::today(),
        )
    }

    /// Fit `symbol`'s provider returns, cached on `(symbol, factors, lookback)`.
    #[instrument(skip(self), level = "debug")]
    pub async fn fit_symbol(
        &self,
        symbol: &str,
        factor_names: &[String],
        lookback: usize,
    ) -> QuantResult<FactorModel> {
        let key = Fingerprint::new("fit")
            .field("symbol", symbol)
            .list("factors", factor_names)
            .int("lookback", lookback as u64)
            .finish();

        self.cache
            .get_or_try_insert_with(&key, || async {
                let returns = self.provider.returns(symbol, lookback).await?;
                let model = model::fit_model(
                    symbol,
                    &returns,
                    &self.catalogue,
                    factor_names,
                    lookback,
                    Self::today(),
                )?;
                info!(
                    symbol,
                    factors = factor_names.len(),
                    r_squared = model.r_squared,
                    adjusted_r_squared = model.adjusted_r_squared,
                    "factor model fitted"
                );
                Ok(model)
            })
            .await
    }

    /// Attribute `symbol`'s last `window` returns using its fitted model.
    pub async fn attribute_symbol(
        &self,
        symbol: &str,
        factor_names: &[String],
        lookback: usize,
        window: usize,
    ) -> QuantResult<FactorAttribution> {
        let model = self.fit_symbol(symbol, factor_names, lookback).await?;
        let returns = self.provider.returns(symbol, window).await?;
        model::attribute(symbol, &model, &returns, &self.catalogue, window)
    }

    /// Rolling-window loading stability for `symbol`.
    pub async fn stability(
        &self,
        symbol: &str,
        factor_names: &[String],
        window: usize,
        rolling_window_days: usize,
    ) -> QuantResult<FactorStability> {
        let returns = self.provider.returns(symbol, window).await?;
        let result = model::stability(
            symbol,
            &returns,
            &self.catalogue,
            factor_names,
            window,
            rolling_window_days,
        )?;
        info!(symbol, windows = result.windows, "stability computed");
        Ok(result)
    }

    /// Fit every symbol concurrently.
    ///
    /// Per-symbol failures are reported in the map. A cancelled flag, before
    /// or during the batch, fails the whole call with `Cancelled`.
    pub async fn factor_exposures(
        &self,
        symbols: &[String],
        factor_names: &[String],
        lookback: usize,
        cancel: &CancellationFlag,
    ) -> QuantResult<BTreeMap<String, QuantResult<FactorModel>>> {
        cancel.check()?;

        let fits = symbols.iter().map(|symbol| async move {
            let result = match cancel.check() {
                Ok(()) => self.fit_symbol(symbol, factor_names, lookback).await,
                Err(e) => Err(e),
            };
            (symbol.clone(), result)
        });
        let results: BTreeMap<_, _> = join_all(fits).await.into_iter().collect();

        if cancel.is_cancelled() {
            return Err(QuantError::Cancelled);
        }
        Ok(results)
    }
}
