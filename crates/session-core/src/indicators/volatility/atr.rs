use session_data::Bar;

use crate::indicators::volatility::average_true_range;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

#[derive(Debug, Default)]
pub struct Atr;

impl Indicator for Atr {
    fn name(&self) -> &'static str {
        "atr"
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
        match average_true_range(bars, config.period) {
            Some(atr) => IndicatorResult::scalar(atr, true),
            None => IndicatorResult::not_ready(),
        }
    }

    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        ((config.period + 1) as f64 * warmup_multiplier).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn bar(ts: &str, high: f64, low: f64, close: f64) -> Bar {
        let timestamp = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap();
        Bar::new(timestamp, close, high, low, close, 100)
    }

    #[test]
    fn averages_true_range_over_the_window() {
        let bars = vec![
            bar("2024-01-02 09:30:00", 10.0, 8.0, 9.0),
            bar("2024-01-02 09:31:00", 11.0, 9.0, 10.0),
            bar("2024-01-02 09:32:00", 12.0, 10.0, 11.0),
        ];
        let result = Atr.calculate(&bars, &IndicatorConfig::new(2), "AAPL", None);
        assert!(result.valid);
        // TR(bar2)=max(2,2,1)=2, TR(bar3)=max(2,2,1)=2 -> avg 2
        assert_eq!(result.value.field(None), Some(2.0));
    }
}
