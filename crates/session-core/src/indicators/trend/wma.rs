use session_data::Bar;

use crate::indicators::{trend::closes, Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Linearly weighted moving average — the most recent close carries the
/// largest weight (`period`), the oldest carries weight `1`.
pub(super) fn wma(window: &[f64]) -> f64 {
    let mut weighted = 0.0;
    let mut weight_total = 0.0;
    for (i, price) in window.iter().enumerate() {
        let weight = (i + 1) as f64;
        weighted += price * weight;
        weight_total += weight;
    }
    weighted / weight_total
}

#[derive(Debug, Default)]
pub struct Wma;

impl Indicator for Wma {
    fn name(&self) -> &'static str {
        "wma"
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
            Some(window) => IndicatorResult::scalar(wma(&window), true),
            None => IndicatorResult::not_ready(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_the_most_recent_price_highest() {
        // window [1, 2, 3]: (1*1 + 2*2 + 3*3) / (1+2+3) = 14/6
        assert!((wma(&[1.0, 2.0, 3.0]) - 14.0 / 6.0).abs() < 1e-9);
    }
}
