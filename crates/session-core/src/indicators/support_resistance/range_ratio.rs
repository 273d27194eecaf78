use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// The latest bar's `high - low` range relative to its `config.period`-bar
/// average — flags unusually wide or narrow bars the way `VolumeRatio`
/// flags unusual participation.
#[derive(Debug, Default)]
pub struct RangeRatio;

impl Indicator for RangeRatio {
    fn name(&self) -> &'static str {
        "range_ratio"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::SupportResistance
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
        let avg_range = window.iter().map(|b| b.high - b.low).sum::<f64>() / period as f64;
        if avg_range == 0.0 {
            return IndicatorResult::not_ready();
        }
        let current_range = bars.last().unwrap().high - bars.last().unwrap().low;
        IndicatorResult::scalar(current_range / avg_range, true)
    }
}
