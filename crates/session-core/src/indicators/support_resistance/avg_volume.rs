use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Average volume over `config.period` historical bars. Distinct from
/// [`crate::indicators::volume::VolumeSma`] only in the category it's
/// filed under — the historical-window flavor used by the requirement
/// analyzer's lookback calculations, not a streaming trend signal.
#[derive(Debug, Default)]
pub struct AvgVolume;

impl Indicator for AvgVolume {
    fn name(&self) -> &'static str {
        "avg_volume"
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
        let avg = window.iter().map(|b| b.volume as f64).sum::<f64>() / period as f64;
        IndicatorResult::scalar(avg, true)
    }
}
