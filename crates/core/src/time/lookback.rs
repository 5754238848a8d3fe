use anyhow::Context;
use chrono::{DateTime, Months, Utc};

// Matches the provider's "4mo" period.
const DEFAULT_LOOKBACK_MONTHS: u32 = 4;

/// Trailing calendar window of daily history to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub months: u32,
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self {
            months: DEFAULT_LOOKBACK_MONTHS,
        }
    }
}

impl LookbackWindow {
    /// Returns `(start, end)` where `end == now` and `start` is `months` calendar months earlier.
    /// A start day past the end of its month is clamped to the month's last day.
    pub fn bounds(&self, now: DateTime<Utc>) -> anyhow::Result<(DateTime<Utc>, DateTime<Utc>)> {
        let start = now
            .checked_sub_months(Months::new(self.months))
            .with_context(|| format!("lookback of {} months underflows {now}", self.months))?;
        Ok((start, now))
    }
}
