use std::collections::BTreeMap;

use session_data::Bar;

use crate::indicators::momentum::high_low_window;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Stochastic oscillator: `%K` over `config.period`, `%D` the 3-bar SMA of
/// the trailing `%K` values.
#[derive(Debug, Default)]
pub struct Stochastic;

impl Indicator for Stochastic {
    fn name(&self) -> &'static str {
        "stochastic"
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
        let d_period = config.param("d_period", 3.0) as usize;
        let needed = period + d_period - 1;
        if bars.len() < needed {
            return IndicatorResult::not_ready();
        }

        let mut k_values = Vec::with_capacity(d_period);
        for i in 0..d_period {
            let end = bars.len() - (d_period - 1 - i);
            let Some((high, low)) = high_low_window(&bars[..end], period) else {
                return IndicatorResult::not_ready();
            };
            let close = bars[end - 1].close;
            let k = if high > low {
                (close - low) / (high - low) * 100.0
            } else {
                50.0
            };
            k_values.push(k);
        }

        let k = *k_values.last().unwrap();
        let d = k_values.iter().sum::<f64>() / k_values.len() as f64;
        let mut fields = BTreeMap::new();
        fields.insert("k".to_string(), k);
        fields.insert("d".to_string(), d);
        IndicatorResult::fields(fields, true)
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
    fn k_is_100_at_the_top_of_the_range() {
        let bars = vec![
            bar("2024-01-02 09:30:00", 100.0, 90.0, 95.0),
            bar("2024-01-02 09:31:00", 105.0, 92.0, 95.0),
            bar("2024-01-02 09:32:00", 110.0, 94.0, 110.0),
        ];
        let config = IndicatorConfig::new(3).with_param("d_period", 1.0);
        let result = Stochastic.calculate(&bars, &config, "AAPL", None);
        assert!(result.valid);
        assert_eq!(result.value.field(Some("k")), Some(100.0));
    }
}
