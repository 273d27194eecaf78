use session_data::Bar;

use crate::indicators::volatility::average_true_range;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Average true range computed over daily bars, filed as a historical
/// indicator rather than a streaming volatility one — callers feed it the
/// symbol's daily history, not its base-interval bars.
#[derive(Debug, Default)]
pub struct AtrDaily;

impl Indicator for AtrDaily {
    fn name(&self) -> &'static str {
        "atr_daily"
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
        match average_true_range(bars, config.period) {
            Some(atr) => IndicatorResult::scalar(atr, true),
            None => IndicatorResult::not_ready(),
        }
    }

    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        ((config.period + 1) as f64 * warmup_multiplier).ceil() as usize
    }
}
