use std::collections::BTreeMap;

use session_data::Bar;

use crate::indicators::volatility::population_stddev;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Bollinger bands: SMA middle band, upper/lower at
/// `middle +/- config.params["multiplier"] * stddev` (default multiplier 2).
#[derive(Debug, Default)]
pub struct Bollinger;

impl Indicator for Bollinger {
    fn name(&self) -> &'static str {
        "bollinger"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volatility
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
        let window: Vec<f64> = bars[bars.len() - period..].iter().map(|b| b.close).collect();
        let middle = window.iter().sum::<f64>() / period as f64;
        let stddev = population_stddev(&window);
        let multiplier = config.param("multiplier", 2.0);

        let mut fields = BTreeMap::new();
        fields.insert("middle".to_string(), middle);
        fields.insert("upper".to_string(), middle + multiplier * stddev);
        fields.insert("lower".to_string(), middle - multiplier * stddev);
        IndicatorResult::fields(fields, true)
    }
}
