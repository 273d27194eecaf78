use std::collections::BTreeMap;

use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// SMA-seeded EMA series over `closes`, one value per input from index
/// `period - 1` onward. `None` if there aren't `period` closes yet.
fn ema_series(closes: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let seed = closes[..period].iter().sum::<f64>() / period as f64;
    let mut series = vec![seed];
    for close in &closes[period..] {
        let prev = *series.last().unwrap();
        series.push(prev + k * (close - prev));
    }
    Some(series)
}

/// Moving average convergence/divergence: `EMA(fast) - EMA(slow)`, plus an
/// EMA(signal) of that line. `config.period` is unused; fast/slow/signal
/// come from `config.params` (defaults 12/26/9).
#[derive(Debug, Default)]
pub struct Macd;

impl Indicator for Macd {
    fn name(&self) -> &'static str {
        "macd"
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
        let fast = config.param("fast", 12.0) as usize;
        let slow = config.param("slow", 26.0) as usize;
        let signal = config.param("signal", 9.0) as usize;

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let Some(fast_series) = ema_series(&closes, fast) else {
            return IndicatorResult::not_ready();
        };
        let Some(slow_series) = ema_series(&closes, slow) else {
            return IndicatorResult::not_ready();
        };

        let offset = fast_series.len() - slow_series.len();
        let macd_series: Vec<f64> = slow_series
            .iter()
            .enumerate()
            .map(|(i, slow_v)| fast_series[i + offset] - slow_v)
            .collect();

        let Some(signal_series) = ema_series(&macd_series, signal) else {
            return IndicatorResult::not_ready();
        };

        let macd_value = *macd_series.last().unwrap();
        let signal_value = *signal_series.last().unwrap();
        let mut fields = BTreeMap::new();
        fields.insert("macd".to_string(), macd_value);
        fields.insert("signal".to_string(), signal_value);
        fields.insert("histogram".to_string(), macd_value - signal_value);
        IndicatorResult::fields(fields, true)
    }

    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        let slow = config.param("slow", 26.0) as usize;
        let signal = config.param("signal", 9.0) as usize;
        (((slow + signal) as f64) * warmup_multiplier).ceil() as usize
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
    fn not_ready_until_slow_plus_signal_bars() {
        let config = IndicatorConfig::new(0).with_param("fast", 3.0).with_param("slow", 6.0).with_param("signal", 2.0);
        let bars: Vec<Bar> = (1..=6).map(|c| bar(c as f64)).collect();
        let result = Macd.calculate(&bars, &config, "AAPL", None);
        assert!(!result.valid);
    }

    #[test]
    fn ready_once_enough_history_is_available() {
        let config = IndicatorConfig::new(0).with_param("fast", 3.0).with_param("slow", 6.0).with_param("signal", 2.0);
        let bars: Vec<Bar> = (1..=10).map(|c| bar(c as f64)).collect();
        let result = Macd.calculate(&bars, &config, "AAPL", None);
        assert!(result.valid);
        assert!(result.value.field(Some("histogram")).is_some());
    }
}
