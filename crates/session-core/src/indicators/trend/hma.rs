use session_data::Bar;

use crate::indicators::trend::wma::wma;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Hull moving average: `WMA(2*WMA(n/2) - WMA(n), sqrt(n))`. Needs
/// `period + sqrt(period) - 1` closes, the extra tail feeding the outer
/// WMA's own window of raw values.
#[derive(Debug, Default)]
pub struct Hma;

impl Indicator for Hma {
    fn name(&self) -> &'static str {
        "hma"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn calculate(
        &self,
        bars: &[Bar],
        config: &IndicatorConfig,
        _symbol: &str,
        _previous: Option<&IndicatorResult>,
    ) -> IndicatorResult {
        let period = config.period.max(2);
        let half = ((period as f64) / 2.0).round() as usize;
        let sqrt_n = ((period as f64).sqrt().round() as usize).max(1);
        let needed = period + sqrt_n - 1;
        if bars.len() < needed {
            return IndicatorResult::not_ready();
        }

        let mut raw_series = Vec::with_capacity(sqrt_n);
        for offset in 0..sqrt_n {
            // end index (exclusive) of the sub-window this raw value covers,
            // sliding from oldest to most recent across the last `sqrt_n` bars.
            let end = bars.len() - (sqrt_n - 1 - offset);
            let full: Vec<f64> = bars[end - period..end].iter().map(|b| b.close).collect();
            let half_window: Vec<f64> = bars[end - half..end].iter().map(|b| b.close).collect();
            raw_series.push(2.0 * wma(&half_window) - wma(&full));
        }

        IndicatorResult::scalar(wma(&raw_series), true)
    }

    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        let period = config.period.max(2);
        let sqrt_n = ((period as f64).sqrt().round() as usize).max(1);
        (((period + sqrt_n - 1) as f64) * warmup_multiplier).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn bar(close: f64) -> Bar {
        let ts = NaiveDateTime::parse_from_str("2024-01-02 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Bar::new(ts, close, close, close, close, 100)
    }

    #[test]
    fn not_ready_until_warmup_window_is_full() {
        let config = IndicatorConfig::new(4);
        let bars: Vec<Bar> = (1..=4).map(|c| bar(c as f64)).collect();
        let result = Hma.calculate(&bars, &config, "AAPL", None);
        assert!(!result.valid);
    }

    #[test]
    fn ready_once_the_extended_window_is_available() {
        let config = IndicatorConfig::new(4);
        // needs period(4) + sqrt(4)(2) - 1 = 5 bars
        let bars: Vec<Bar> = (1..=5).map(|c| bar(c as f64)).collect();
        let result = Hma.calculate(&bars, &config, "AAPL", None);
        assert!(result.valid);
    }
}
