use crate::diagnosis::error::DiagnoseError;
use crate::domain::symbol::SymbolQuery;
use crate::ingest::provider::MarketDataProvider;
use crate::ingest::types::ResolvedSeries;
use crate::time::lookback::LookbackWindow;
use anyhow::Context;

/// Fetches history for each candidate symbol in turn and returns the first
/// non-empty series. Provider errors abort immediately; they are not a reason
/// to try the next suffix.
pub async fn resolve_series(
    provider: &dyn MarketDataProvider,
    query: &SymbolQuery,
    window: LookbackWindow,
) -> Result<ResolvedSeries, DiagnoseError> {
    for (idx, symbol) in query.candidates().into_iter().enumerate() {
        if idx != 0 {
            tracing::info!(code = %query.code(), %symbol, "no data under primary suffix; trying alternate");
        }

        let bars = provider
            .fetch_daily_history(&symbol, window)
            .await
            .with_context(|| format!("failed to fetch daily history for {symbol}"))?;

        tracing::debug!(
            provider = provider.provider_name(),
            %symbol,
            attempt = idx + 1,
            bars = bars.len(),
            "history fetched"
        );

        if !bars.is_empty() {
            return Ok(ResolvedSeries { symbol, bars });
        }
    }

    Err(DiagnoseError::NoData {
        code: query.code().to_string(),
    })
}
