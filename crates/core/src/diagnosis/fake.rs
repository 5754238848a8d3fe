use crate::ingest::provider::MarketDataProvider;
use crate::ingest::types::Bar;
use crate::time::lookback::LookbackWindow;
use chrono::{Duration, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory provider recording which symbols were requested.
#[derive(Default)]
pub struct FakeProvider {
    series: HashMap<String, Vec<Bar>>,
    names: HashMap<String, String>,
    failing: HashSet<String>,
    history_calls: Mutex<Vec<String>>,
    name_calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn with_series(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.series.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_name(mut self, symbol: &str, name: &str) -> Self {
        self.names.insert(symbol.to_string(), name.to_string());
        self
    }

    pub fn failing_history(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn history_calls(&self) -> Vec<String> {
        self.history_calls.lock().unwrap().clone()
    }

    pub fn name_calls(&self) -> Vec<String> {
        self.name_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for FakeProvider {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_daily_history(
        &self,
        symbol: &str,
        _window: LookbackWindow,
    ) -> anyhow::Result<Vec<Bar>> {
        self.history_calls.lock().unwrap().push(symbol.to_string());
        if self.failing.contains(symbol) {
            anyhow::bail!("connection reset by peer");
        }
        Ok(self.series.get(symbol).cloned().unwrap_or_default())
    }

    async fn lookup_name(&self, symbol: &str) -> anyhow::Result<Option<String>> {
        self.name_calls.lock().unwrap().push(symbol.to_string());
        Ok(self.names.get(symbol).cloned())
    }
}

pub fn bars_from(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| Bar {
            date: start + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        })
        .collect()
}

pub fn flat_bars(n: usize, close: f64, volume: f64) -> Vec<Bar> {
    bars_from(&vec![close; n], &vec![volume; n])
}
