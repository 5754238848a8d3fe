use crate::config::Settings;
use crate::ingest::provider::MarketDataProvider;
use crate::ingest::types::Bar;
use crate::time::lookback::LookbackWindow;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const MAX_BACKOFF_SECS: u64 = 32;
const SEARCH_QUOTES_COUNT: &str = "5";

// The chart endpoint answers 429 to clients without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
    attempts: u32,
}

impl YahooClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .yahoo_base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.data_provider_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build yahoo http client")?;

        Ok(Self {
            http,
            base_url,
            attempts: settings.data_provider_attempts.max(1),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("invalid yahoo base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("yahoo base url cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET with bounded retries on transport errors, 429 and 5xx.
    /// Any other status is handed back to the caller together with the body.
    async fn get_text(
        &self,
        url: reqwest::Url,
        query: &[(&str, String)],
    ) -> Result<(StatusCode, String)> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let res = match self.http.get(url.clone()).query(query).send().await {
                Ok(r) => r,
                Err(err) => {
                    if attempt >= self.attempts {
                        return Err(err).with_context(|| format!("yahoo request failed: {url}"));
                    }
                    let backoff = backoff_delay(attempt);
                    tracing::warn!(attempt, ?backoff, %url, error = %err, "yahoo request failed; retrying");
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            };

            let status = res.status();
            let text = res
                .text()
                .await
                .context("failed to read yahoo response")?;

            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable && attempt < self.attempts {
                let backoff = backoff_delay(attempt);
                tracing::warn!(attempt, ?backoff, %url, http_status = %status, "yahoo HTTP error; retrying");
                tokio::time::sleep(backoff).await;
                continue;
            }

            return Ok((status, text));
        }
    }
}

/// Exponential delay after the given failed attempt (1-based), capped.
fn backoff_delay(attempt: u32) -> Duration {
    let secs = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(MAX_BACKOFF_SECS)
        .min(MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_finance"
    }

    async fn fetch_daily_history(&self, symbol: &str, window: LookbackWindow) -> Result<Vec<Bar>> {
        let (start, end) = window.bounds(Utc::now())?;
        let url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        let query = [
            ("period1", start.timestamp().to_string()),
            ("period2", end.timestamp().to_string()),
            ("interval", "1d".to_string()),
            ("events", "div,splits".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];

        let (status, text) = self.get_text(url, &query).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            anyhow::bail!("yahoo chart HTTP {status} for {symbol}: {text}");
        }

        let bars = parse_chart(&text).with_context(|| format!("yahoo chart for {symbol}"))?;
        tracing::debug!(%symbol, bars = bars.len(), "yahoo chart fetched");
        Ok(bars)
    }

    async fn lookup_name(&self, symbol: &str) -> Result<Option<String>> {
        let url = self.endpoint(&["v1", "finance", "search"])?;
        let query = [
            ("q", symbol.to_string()),
            ("quotesCount", SEARCH_QUOTES_COUNT.to_string()),
            ("newsCount", "0".to_string()),
        ];

        let (status, text) = self.get_text(url, &query).await?;
        if !status.is_success() {
            anyhow::bail!("yahoo search HTTP {status} for {symbol}: {text}");
        }
        parse_search_name(&text, symbol)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchQuote {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    shortname: Option<String>,
    #[serde(default)]
    longname: Option<String>,
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten().filter(|v| v.is_finite())
}

/// Parses a v8 chart payload into adjusted daily bars, oldest first.
/// A "Not Found" chart error or a missing result is an empty series.
fn parse_chart(text: &str) -> Result<Vec<Bar>> {
    let resp = serde_json::from_str::<ChartResponse>(text)
        .context("failed to parse yahoo chart response")?;

    if let Some(err) = resp.chart.error {
        if err.code.eq_ignore_ascii_case("Not Found") {
            return Ok(Vec::new());
        }
        anyhow::bail!("yahoo chart error {}: {}", err.code, err.description);
    }

    let Some(result) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };
    let adj = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        // Rows without a close are holidays or halted sessions.
        let Some(raw_close) = at(&quote.close, i) else {
            continue;
        };

        let date = DateTime::from_timestamp(ts + offset, 0)
            .with_context(|| format!("invalid bar timestamp {ts}"))?
            .date_naive();

        let (ratio, close) = match at(&adj, i) {
            Some(a) if raw_close != 0.0 => (a / raw_close, a),
            _ => (1.0, raw_close),
        };

        bars.push(Bar {
            date,
            open: at(&quote.open, i).unwrap_or(raw_close) * ratio,
            high: at(&quote.high, i).unwrap_or(raw_close) * ratio,
            low: at(&quote.low, i).unwrap_or(raw_close) * ratio,
            close,
            volume: at(&quote.volume, i).unwrap_or(0.0),
        });
    }

    // A live session can repeat the last date; keep the latest row per date.
    bars.sort_by_key(|b| b.date);
    bars.dedup_by(|later, earlier| {
        if later.date == earlier.date {
            *earlier = *later;
            true
        } else {
            false
        }
    });

    Ok(bars)
}

fn parse_search_name(text: &str, symbol: &str) -> Result<Option<String>> {
    let resp = serde_json::from_str::<SearchResponse>(text)
        .context("failed to parse yahoo search response")?;

    let Some(quote) = resp
        .quotes
        .into_iter()
        .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
    else {
        return Ok(None);
    };

    let non_blank = |s: Option<String>| {
        s.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    Ok(non_blank(quote.shortname).or_else(|| non_blank(quote.longname)))
}
