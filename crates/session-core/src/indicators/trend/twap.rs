use chrono::Datelike;
use session_data::Bar;

use crate::indicators::{CarryState, Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Session-cumulative time weighted average price: the plain mean of
/// typical prices since session start, each bar weighted equally
/// regardless of volume. Resets on date rollover, same as [`super::Vwap`].
#[derive(Debug, Default)]
pub struct Twap;

impl Indicator for Twap {
    fn name(&self) -> &'static str {
        "twap"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn uses_period(&self) -> bool {
        false
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
        let typical = (bar.high + bar.low + bar.close) / 3.0;
        let date = bar.timestamp.date();

        let carry = previous.and_then(|p| p.carry.clone()).unwrap_or_default();
        let same_session = carry
            .get("anchor_date")
            .map(|d| d as i64 == date.num_days_from_ce() as i64)
            .unwrap_or(false);

        let (sum, count) = if same_session {
            (
                carry.get("price_sum").unwrap_or(0.0) + typical,
                carry.get("count").unwrap_or(0.0) + 1.0,
            )
        } else {
            (typical, 1.0)
        };

        let next = CarryState::default()
            .with("anchor_date", date.num_days_from_ce() as f64)
            .with("price_sum", sum)
            .with("count", count);
        IndicatorResult::scalar(sum / count, true).with_carry(next)
    }
}
