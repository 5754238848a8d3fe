use crate::ingest::types::Bar;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MA_SHORT_WINDOW: usize = 5;
pub const MA_LONG_WINDOW: usize = 20;
pub const VOLUME_MA_WINDOW: usize = 5;

/// Trailing simple moving average.
///
/// Position `i` holds the mean of `values[i + 1 - window..=i]`; positions with
/// fewer than `window` values behind them are `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || window > values.len() {
        return out;
    }

    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out[i] = Some(sum / window as f64);
    }
    out
}

/// Latest-bar indicator snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub close: f64,
    pub ma5: Option<f64>,
    pub ma20: f64,
    pub vol_ma5: f64,
    pub volume: f64,
    pub bias_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorError {
    InsufficientHistory { bars: usize, required: usize },
    DegenerateAverage { ma20: f64 },
}

impl fmt::Display for IndicatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientHistory { bars, required } => write!(
                f,
                "need at least {required} daily bars to compute MA{MA_LONG_WINDOW} (got {bars})"
            ),
            Self::DegenerateAverage { ma20 } => {
                write!(f, "MA{MA_LONG_WINDOW} is {ma20}; bias is undefined")
            }
        }
    }
}

impl std::error::Error for IndicatorError {}

impl IndicatorSet {
    pub fn from_bars(bars: &[Bar]) -> Result<Self, IndicatorError> {
        let required = MA_LONG_WINDOW.max(VOLUME_MA_WINDOW);
        if bars.len() < required {
            return Err(IndicatorError::InsufficientHistory {
                bars: bars.len(),
                required,
            });
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        let last = |series: Vec<Option<f64>>| series.last().copied().flatten();
        let ma5 = last(rolling_mean(&closes, MA_SHORT_WINDOW));
        let ma20 = last(rolling_mean(&closes, MA_LONG_WINDOW)).unwrap_or(f64::NAN);
        let vol_ma5 = last(rolling_mean(&volumes, VOLUME_MA_WINDOW)).unwrap_or(f64::NAN);

        if ma20 == 0.0 || !ma20.is_finite() {
            return Err(IndicatorError::DegenerateAverage { ma20 });
        }

        let latest = bars[bars.len() - 1];
        let bias_pct = (latest.close - ma20) / ma20 * 100.0;

        Ok(Self {
            close: latest.close,
            ma5,
            ma20,
            vol_ma5,
            volume: latest.volume,
            bias_pct,
        })
    }
}
