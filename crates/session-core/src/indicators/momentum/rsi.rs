use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Relative strength index over `config.period` bar-to-bar changes.
/// Recomputed from the trailing window each call (not carried) — RSI isn't
/// in the carry-state set, so a plain average of gains/losses over the
/// window is used rather than Wilder's recursive smoothing.
#[derive(Debug, Default)]
pub struct Rsi;

impl Indicator for Rsi {
    fn name(&self) -> &'static str {
        "rsi"
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
        let period = config.period;
        if period == 0 || bars.len() < period + 1 {
            return IndicatorResult::not_ready();
        }
        let window = &bars[bars.len() - period - 1..];
        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;
        for pair in window.windows(2) {
            let change = pair[1].close - pair[0].close;
            if change >= 0.0 {
                gain_sum += change;
            } else {
                loss_sum -= change;
            }
        }
        let avg_gain = gain_sum / period as f64;
        let avg_loss = loss_sum / period as f64;

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - (100.0 / (1.0 + rs))
        };
        IndicatorResult::scalar(rsi, true)
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
    fn all_gains_saturates_at_100() {
        let bars: Vec<Bar> = (1..=5).map(|c| bar(c as f64)).collect();
        let result = Rsi.calculate(&bars, &IndicatorConfig::new(4), "AAPL", None);
        assert_eq!(result.value.field(None), Some(100.0));
    }

    #[test]
    fn not_ready_without_period_plus_one_bars() {
        let bars: Vec<Bar> = (1..=3).map(|c| bar(c as f64)).collect();
        let result = Rsi.calculate(&bars, &IndicatorConfig::new(4), "AAPL", None);
        assert!(!result.valid);
    }
}
