use std::collections::BTreeMap;

use session_data::Bar;

use crate::indicators::volatility::average_true_range;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Keltner channels: SMA middle band, upper/lower at
/// `middle +/- config.params["multiplier"] * ATR(period)` (default multiplier 2).
#[derive(Debug, Default)]
pub struct Keltner;

impl Indicator for Keltner {
    fn name(&self) -> &'static str {
        "keltner"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volatility
    }

    fn calculate(
        &self,
        bars: &[Bar],
        config: &IndicatorConfig,
        _symbol: &str,
        _previous: Option<&IndicatorResult>,
    ) -> IndicatorResult {
        let period = config.period;
        if period == 0 || bars.len() < period {
            return IndicatorResult::not_ready();
        }
        let Some(atr) = average_true_range(bars, period) else {
            return IndicatorResult::not_ready();
        };
        let window = &bars[bars.len() - period..];
        let middle = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        let multiplier = config.param("multiplier", 2.0);

        let mut fields = BTreeMap::new();
        fields.insert("middle".to_string(), middle);
        fields.insert("upper".to_string(), middle + multiplier * atr);
        fields.insert("lower".to_string(), middle - multiplier * atr);
        IndicatorResult::fields(fields, true)
    }

    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        ((config.period + 1) as f64 * warmup_multiplier).ceil() as usize
    }
}
