use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV record, already price-adjusted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A non-empty daily series plus the symbol that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
}
