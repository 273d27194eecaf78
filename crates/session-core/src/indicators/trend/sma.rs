use session_data::Bar;

use crate::indicators::{trend::closes, Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Simple moving average over `config.period` closes.
#[derive(Debug, Default)]
pub struct Sma;

impl Indicator for Sma {
    fn name(&self) -> &'static str {
        "sma"
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
        match closes(bars, config.period) {
            Some(window) => {
                let avg = window.iter().sum::<f64>() / window.len() as f64;
                IndicatorResult::scalar(avg, true)
            }
            None => IndicatorResult::not_ready(),
        }
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
    fn averages_the_trailing_window() {
        let bars: Vec<Bar> = [1.0, 2.0, 3.0, 4.0].iter().map(|c| bar(*c)).collect();
        let config = IndicatorConfig::new(3);
        let result = Sma.calculate(&bars, &config, "AAPL", None);
        assert!(result.valid);
        assert_eq!(result.value.field(None), Some(3.0));
    }

    #[test]
    fn not_ready_until_period_bars_seen() {
        let bars = vec![bar(1.0), bar(2.0)];
        let result = Sma.calculate(&bars, &IndicatorConfig::new(3), "AAPL", None);
        assert!(!result.valid);
    }
}
