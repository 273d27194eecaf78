use session_data::Bar;

use crate::indicators::{CarryState, Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Price volume trend: running total of `volume * (close - prev_close) / prev_close`.
#[derive(Debug, Default)]
pub struct Pvt;

impl Indicator for Pvt {
    fn name(&self) -> &'static str {
        "pvt"
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
        let running = carry.get("pvt").unwrap_or(0.0);

        let pvt = match carry.get("prev_close") {
            Some(prev_close) if prev_close != 0.0 => {
                running + bar.volume as f64 * (bar.close - prev_close) / prev_close
            }
            _ => running,
        };

        let next = CarryState::default().with("pvt", pvt).with("prev_close", bar.close);
        IndicatorResult::scalar(pvt, true).with_carry(next)
    }
}
