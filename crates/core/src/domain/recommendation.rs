use crate::domain::indicators::IndicatorSet;
use serde::{Deserialize, Serialize};

pub const BUY_CEILING_RATIO: f64 = 1.02;
pub const PROFIT_TARGET_RATIO: f64 = 1.10;
pub const STOP_LOSS_RATIO: f64 = 1.0;
pub const VOLUME_SPIKE_RATIO: f64 = 1.5;
pub const VOLUME_CONTRACTION_RATIO: f64 = 0.7;
pub const OVERHEATED_BIAS_PCT: f64 = 10.0;

/// Which optional rules run. Thresholds are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    pub trend_verdict: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            trend_verdict: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuyAdvice {
    /// Price is above the buy ceiling; wait for a pullback into `[low, high]`.
    WaitForPullback { low: f64, high: f64 },
    BuyNearPrice { price: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VolumeState {
    Spike { ratio: f64 },
    Contraction,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendVerdict {
    BrokenBelowTrend,
    Overheated,
    Bullish,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub buy: BuyAdvice,
    pub buy_ceiling: f64,
    pub profit_target: f64,
    pub stop_loss: f64,
    pub volume: VolumeState,
    pub trend: Option<TrendVerdict>,
}

impl Recommendation {
    pub fn evaluate(ind: &IndicatorSet, rules: RuleSet) -> Self {
        let buy_ceiling = ind.ma20 * BUY_CEILING_RATIO;
        let buy = if ind.close > buy_ceiling {
            BuyAdvice::WaitForPullback {
                low: ind.ma20,
                high: buy_ceiling,
            }
        } else {
            BuyAdvice::BuyNearPrice { price: ind.close }
        };

        Self {
            buy,
            buy_ceiling,
            profit_target: ind.ma20 * PROFIT_TARGET_RATIO,
            stop_loss: ind.ma20 * STOP_LOSS_RATIO,
            volume: VolumeState::evaluate(ind.volume, ind.vol_ma5),
            trend: rules
                .trend_verdict
                .then(|| TrendVerdict::evaluate(ind.close, ind.ma20, ind.bias_pct)),
        }
    }
}

impl BuyAdvice {
    pub fn severity(&self) -> Severity {
        match self {
            Self::WaitForPullback { .. } => Severity::Warning,
            Self::BuyNearPrice { .. } => Severity::Success,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::WaitForPullback { .. } => "Price is elevated; wait for a pullback",
            Self::BuyNearPrice { .. } => "Within a reasonable buy zone",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::WaitForPullback { low, high } => {
                format!("💡 Ideal entry: {low:.2} ~ {high:.2}")
            }
            Self::BuyNearPrice { price } => format!("💡 Suggested entry: near {price:.2}"),
        }
    }
}

impl VolumeState {
    /// `vol_ma5 <= 0` (no trading in the window) never produces a comment.
    pub fn evaluate(volume: f64, vol_ma5: f64) -> Self {
        if vol_ma5.is_nan() || vol_ma5 <= 0.0 {
            return Self::Normal;
        }
        if volume > vol_ma5 * VOLUME_SPIKE_RATIO {
            Self::Spike {
                ratio: volume / vol_ma5,
            }
        } else if volume < vol_ma5 * VOLUME_CONTRACTION_RATIO {
            Self::Contraction
        } else {
            Self::Normal
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::Spike { .. } => Some(Severity::Warning),
            Self::Contraction => Some(Severity::Info),
            Self::Normal => None,
        }
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Self::Spike { ratio } => Some(format!(
                "⚠️ Volume spike: today's volume is {ratio:.1}x the 5-day average."
            )),
            Self::Contraction => {
                Some("📉 Volume contraction: the market is hesitant.".to_string())
            }
            Self::Normal => None,
        }
    }
}

impl TrendVerdict {
    pub fn evaluate(close: f64, ma20: f64, bias_pct: f64) -> Self {
        if close < ma20 {
            Self::BrokenBelowTrend
        } else if bias_pct > OVERHEATED_BIAS_PCT {
            Self::Overheated
        } else {
            Self::Bullish
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::BrokenBelowTrend => Severity::Warning,
            Self::Overheated => Severity::Info,
            Self::Bullish => Severity::Success,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::BrokenBelowTrend => {
                "🚨 Broken below the MA20 trend line; avoid holding unless price reclaims MA20."
            }
            Self::Overheated => {
                "🔥 Overheated and at the profit-target zone; consider scaling out."
            }
            Self::Bullish => "✅ Bullish structure; an MA20 pullback remains a buy opportunity.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(close: f64, ma20: f64, volume: f64, vol_ma5: f64) -> IndicatorSet {
        IndicatorSet {
            close,
            ma5: Some(close),
            ma20,
            vol_ma5,
            volume,
            bias_pct: (close - ma20) / ma20 * 100.0,
        }
    }

    #[test]
    fn price_bands_are_fixed_multiples_of_ma20() {
        for ma20 in [0.5, 12.34, 100.0, 987.65] {
            let rec = Recommendation::evaluate(&indicators(ma20, ma20, 1.0, 1.0), RuleSet::default());
            assert_eq!(rec.buy_ceiling, ma20 * 1.02);
            assert_eq!(rec.profit_target, ma20 * 1.10);
            assert_eq!(rec.stop_loss, ma20);
        }
    }

    #[test]
    fn elevated_price_waits_for_pullback() {
        let rec = Recommendation::evaluate(&indicators(103.0, 100.0, 1.0, 1.0), RuleSet::default());
        assert_eq!(
            rec.buy,
            BuyAdvice::WaitForPullback {
                low: 100.0,
                high: 100.0 * 1.02
            }
        );
        assert_eq!(rec.buy.severity(), Severity::Warning);
        assert_eq!(rec.buy.detail(), "💡 Ideal entry: 100.00 ~ 102.00");
    }

    #[test]
    fn price_at_ceiling_is_still_a_buy_zone() {
        let ma20 = 100.0;
        let rec = Recommendation::evaluate(
            &indicators(ma20 * 1.02, ma20, 1.0, 1.0),
            RuleSet::default(),
        );
        assert!(matches!(rec.buy, BuyAdvice::BuyNearPrice { .. }));
        assert_eq!(rec.buy.severity(), Severity::Success);
    }

    #[test]
    fn double_volume_reports_spike_ratio() {
        let state = VolumeState::evaluate(2000.0, 1000.0);
        assert_eq!(state, VolumeState::Spike { ratio: 2.0 });
        assert!(state.message().unwrap().contains("2.0x"));
        assert_eq!(state.severity(), Some(Severity::Warning));
    }

    #[test]
    fn volume_bands() {
        assert_eq!(VolumeState::evaluate(1500.0, 1000.0), VolumeState::Normal);
        assert_eq!(VolumeState::evaluate(700.0, 1000.0), VolumeState::Normal);
        assert_eq!(VolumeState::evaluate(699.0, 1000.0), VolumeState::Contraction);
        assert_eq!(VolumeState::Normal.message(), None);
    }

    #[test]
    fn zero_volume_average_has_no_comment() {
        assert_eq!(VolumeState::evaluate(10.0, 0.0), VolumeState::Normal);
        assert_eq!(VolumeState::evaluate(10.0, f64::NAN), VolumeState::Normal);
    }

    #[test]
    fn below_ma20_is_broken_trend_regardless_of_bias() {
        assert_eq!(
            TrendVerdict::evaluate(99.0, 100.0, 50.0),
            TrendVerdict::BrokenBelowTrend
        );
        assert_eq!(
            TrendVerdict::evaluate(50.0, 100.0, -50.0),
            TrendVerdict::BrokenBelowTrend
        );
    }

    #[test]
    fn trend_overheated_above_ten_percent_bias() {
        assert_eq!(TrendVerdict::evaluate(111.0, 100.0, 11.0), TrendVerdict::Overheated);
        assert_eq!(TrendVerdict::evaluate(110.0, 100.0, 10.0), TrendVerdict::Bullish);
        assert_eq!(TrendVerdict::evaluate(100.0, 100.0, 0.0), TrendVerdict::Bullish);
    }

    #[test]
    fn trend_verdict_can_be_disabled() {
        let ind = indicators(90.0, 100.0, 1.0, 1.0);
        let on = Recommendation::evaluate(&ind, RuleSet { trend_verdict: true });
        let off = Recommendation::evaluate(&ind, RuleSet { trend_verdict: false });
        assert_eq!(on.trend, Some(TrendVerdict::BrokenBelowTrend));
        assert_eq!(off.trend, None);
        assert_eq!(on.buy, off.buy);
    }
}
