use crate::domain::indicators::{rolling_mean, IndicatorSet, MA_LONG_WINDOW};
use crate::domain::recommendation::{Recommendation, RuleSet};
use crate::domain::symbol::SymbolQuery;
use crate::ingest::provider::{display_name, MarketDataProvider};
use crate::ingest::types::Bar;
use crate::time::lookback::LookbackWindow;
use chrono::NaiveDate;
use serde::Serialize;

pub mod error;
pub mod resolve;

#[cfg(test)]
pub(crate) mod fake;

pub use error::DiagnoseError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub ma20: Option<f64>,
}

/// Everything the report shows for one code.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub code: String,
    pub symbol: String,
    pub name: String,
    pub as_of: NaiveDate,
    pub indicators: IndicatorSet,
    pub recommendation: Recommendation,
    pub chart: Vec<ChartPoint>,
}

/// Resolve, fetch, compute and evaluate one code. Nothing is cached between calls.
pub async fn diagnose(
    provider: &dyn MarketDataProvider,
    query: &SymbolQuery,
    rules: RuleSet,
    window: LookbackWindow,
) -> Result<Diagnosis, DiagnoseError> {
    let resolved = resolve::resolve_series(provider, query, window).await?;

    let indicators = IndicatorSet::from_bars(&resolved.bars).map_err(|source| {
        DiagnoseError::InsufficientHistory {
            symbol: resolved.symbol.clone(),
            source,
        }
    })?;
    let recommendation = Recommendation::evaluate(&indicators, rules);
    let name = display_name(provider, &resolved.symbol).await;

    let as_of = resolved.bars[resolved.bars.len() - 1].date;
    let chart = chart_points(&resolved.bars);

    tracing::info!(
        code = %query.code(),
        symbol = %resolved.symbol,
        %as_of,
        close = indicators.close,
        ma20 = indicators.ma20,
        bias_pct = indicators.bias_pct,
        "diagnosis complete"
    );

    Ok(Diagnosis {
        code: query.code().to_string(),
        symbol: resolved.symbol,
        name,
        as_of,
        indicators,
        recommendation,
        chart,
    })
}

/// Close and MA20 per bar; MA20 is `None` until enough history has accumulated.
pub fn chart_points(bars: &[Bar]) -> Vec<ChartPoint> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ma20 = rolling_mean(&closes, MA_LONG_WINDOW);
    bars.iter()
        .zip(ma20)
        .map(|(b, ma20)| ChartPoint {
            date: b.date,
            close: b.close,
            ma20,
        })
        .collect()
}
