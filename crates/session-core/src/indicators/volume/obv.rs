use session_data::Bar;

use crate::indicators::{CarryState, Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// On-balance volume: a running total that adds the bar's volume on an up
/// close, subtracts it on a down close, and leaves it unchanged on a flat
/// close. Carries the running total and the last close seen.
#[derive(Debug, Default)]
pub struct Obv;

impl Indicator for Obv {
    fn name(&self) -> &'static str {
        "obv"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Volume
    }

    fn calculate(
        &self,
        bars: &[Bar],
        _config: &IndicatorConfig,
        _symbol: &str,
        previous: Option<&IndicatorResult>,
    ) -> IndicatorResult {
        let Some(bar) = bars.last() else {
            return IndicatorResult::not_ready();
        };
        let carry = previous.and_then(|p| p.carry.clone()).unwrap_or_default();

        let running = carry.get("obv").unwrap_or(0.0);
        let obv = match carry.get("prev_close") {
            Some(prev_close) if bar.close > prev_close => running + bar.volume as f64,
            Some(prev_close) if bar.close < prev_close => running - bar.volume as f64,
            Some(_) => running,
            None => running,
        };

        let next = CarryState::default().with("obv", obv).with("prev_close", bar.close);
        IndicatorResult::scalar(obv, true).with_carry(next)
    }
}
