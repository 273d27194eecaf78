use session_data::Bar;

use crate::indicators::volatility::population_stddev;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Population standard deviation of closes over `config.period`.
#[derive(Debug, Default)]
pub struct StdDev;

impl Indicator for StdDev {
    fn name(&self) -> &'static str {
        "std_dev"
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
        IndicatorResult::scalar(population_stddev(&window), true)
    }
}
