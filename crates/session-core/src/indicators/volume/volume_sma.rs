use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Simple moving average of bar volume over `config.period`.
#[derive(Debug, Default)]
pub struct VolumeSma;

impl Indicator for VolumeSma {
    fn name(&self) -> &'static str {
        "volume_sma"
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
        IndicatorResult::scalar(avg, true)
    }
}
