use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Average `high - low` range over `config.period` historical bars.
#[derive(Debug, Default)]
pub struct AvgRange;

impl Indicator for AvgRange {
    fn name(&self) -> &'static str {
        "avg_range"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Historical
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
        let window = &bars[bars.len() - period..];
        let avg = window.iter().map(|b| b.high - b.low).sum::<f64>() / period as f64;
        IndicatorResult::scalar(avg, true)
    }
}
