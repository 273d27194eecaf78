use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

fn bp_tr(prior_close: f64, bar: &Bar) -> (f64, f64) {
    let true_low = bar.low.min(prior_close);
    let true_high = bar.high.max(prior_close);
    (bar.close - true_low, true_high - true_low)
}

fn average_bp_tr(bars: &[Bar], period: usize) -> Option<f64> {
    if bars.len() < period + 1 {
        return None;
    }
    let window = &bars[bars.len() - period..];
    let mut bp_sum = 0.0;
    let mut tr_sum = 0.0;
    for (i, bar) in window.iter().enumerate() {
        let idx = bars.len() - period + i;
        let prior_close = bars[idx - 1].close;
        let (bp, tr) = bp_tr(prior_close, bar);
        bp_sum += bp;
        tr_sum += tr;
    }
    if tr_sum == 0.0 {
        Some(0.0)
    } else {
        Some(bp_sum / tr_sum)
    }
}

/// Ultimate oscillator: weighted blend of buying-pressure/true-range
/// averages over three periods (defaults 7/14/28, weights 4/2/1), per
/// Larry Williams' original formula.
#[derive(Debug, Default)]
pub struct UltimateOscillator;

impl Indicator for UltimateOscillator {
    fn name(&self) -> &'static str {
        "ultimate_oscillator"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn calculate(
        &self,
        bars: &[Bar],
        config: &IndicatorConfig,
        _symbol: &str,
        _previous: Option<&IndicatorResult>,
    ) -> IndicatorResult {
        let short = config.param("short_period", 7.0) as usize;
        let mid = config.param("mid_period", 14.0) as usize;
        let long = config.param("long_period", 28.0) as usize;

        let (Some(avg_short), Some(avg_mid), Some(avg_long)) = (
            average_bp_tr(bars, short),
            average_bp_tr(bars, mid),
            average_bp_tr(bars, long),
        ) else {
            return IndicatorResult::not_ready();
        };

        let value = 100.0 * (4.0 * avg_short + 2.0 * avg_mid + avg_long) / 7.0;
        IndicatorResult::scalar(value, true)
    }

    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        let long = config.param("long_period", 28.0) as usize;
        ((long + 1) as f64 * warmup_multiplier).ceil() as usize
    }
}
