use session_data::Bar;

use crate::indicators::momentum::typical_price;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Commodity channel index: `(typical - SMA(typical)) / (0.015 * mean abs deviation)`.
#[derive(Debug, Default)]
pub struct Cci;

const CONSTANT: f64 = 0.015;

impl Indicator for Cci {
    fn name(&self) -> &'static str {
        "cci"
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
        if period == 0 || bars.len() < period {
            return IndicatorResult::not_ready();
        }
        let window = &bars[bars.len() - period..];
        let typicals: Vec<f64> = window.iter().map(typical_price).collect();
        let mean = typicals.iter().sum::<f64>() / period as f64;
        let mean_deviation = typicals.iter().map(|t| (t - mean).abs()).sum::<f64>() / period as f64;

        let latest = *typicals.last().unwrap();
        let cci = if mean_deviation == 0.0 {
            0.0
        } else {
            (latest - mean) / (CONSTANT * mean_deviation)
        };
        IndicatorResult::scalar(cci, true)
    }
}
