use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

fn lookback_pair(bars: &[Bar], period: usize) -> Option<(f64, f64)> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }
    let now = bars.last()?.close;
    let then = bars[bars.len() - 1 - period].close;
    Some((now, then))
}

/// Rate of change: `(close - close[n periods ago]) / close[n periods ago] * 100`.
#[derive(Debug, Default)]
pub struct Roc;

impl Indicator for Roc {
    fn name(&self) -> &'static str {
        "roc"
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
        match lookback_pair(bars, config.period) {
            Some((now, then)) if then != 0.0 => {
                IndicatorResult::scalar((now - then) / then * 100.0, true)
            }
            _ => IndicatorResult::not_ready(),
        }
    }
}

/// Momentum: plain `close - close[n periods ago]`, unnormalized.
#[derive(Debug, Default)]
pub struct Mom;

impl Indicator for Mom {
    fn name(&self) -> &'static str {
        "mom"
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
        match lookback_pair(bars, config.period) {
            Some((now, then)) => IndicatorResult::scalar(now - then, true),
            None => IndicatorResult::not_ready(),
        }
    }
}
