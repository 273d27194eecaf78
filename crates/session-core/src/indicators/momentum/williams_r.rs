use session_data::Bar;

use crate::indicators::momentum::high_low_window;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Williams %R: `(highest high - close) / (highest high - lowest low) * -100`.
#[derive(Debug, Default)]
pub struct WilliamsR;

impl Indicator for WilliamsR {
    fn name(&self) -> &'static str {
        "williams_r"
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
        let Some((high, low)) = high_low_window(bars, config.period) else {
            return IndicatorResult::not_ready();
        };
        let close = bars.last().unwrap().close;
        let value = if high > low {
            (high - close) / (high - low) * -100.0
        } else {
            -50.0
        };
        IndicatorResult::scalar(value, true)
    }
}
