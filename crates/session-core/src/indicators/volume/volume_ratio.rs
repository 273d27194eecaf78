use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Current bar's volume divided by its `config.period`-bar average —
/// flags unusually heavy or light participation.
#[derive(Debug, Default)]
pub struct VolumeRatio;

impl Indicator for VolumeRatio {
    fn name(&self) -> &'static str {
        "volume_ratio"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volume
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
        let avg = window.iter().map(|b| b.volume as f64).sum::<f64>() / period as f64;
        if avg == 0.0 {
            return IndicatorResult::not_ready();
        }
        let current = bars.last().unwrap().volume as f64;
        IndicatorResult::scalar(current / avg, true)
    }
}
