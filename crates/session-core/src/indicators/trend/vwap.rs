use chrono::Datelike;
use session_data::Bar;

use crate::indicators::{CarryState, Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Session-cumulative volume weighted average price. Resets when the
/// trailing bar's date changes from the carried anchor date — there is no
/// separate "new session" signal, the date rollover is the signal.
#[derive(Debug, Default)]
pub struct Vwap;

impl Indicator for Vwap {
    fn name(&self) -> &'static str {
        "vwap"
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

        let (pv, vol) = if same_session {
            (
                carry.get("pv_sum").unwrap_or(0.0) + typical * bar.volume as f64,
                carry.get("vol_sum").unwrap_or(0.0) + bar.volume as f64,
            )
        } else {
            (typical * bar.volume as f64, bar.volume as f64)
        };

        let value = if vol > 0.0 { pv / vol } else { typical };
        let next = CarryState::default()
            .with("anchor_date", date.num_days_from_ce() as f64)
            .with("pv_sum", pv)
            .with("vol_sum", vol);
        IndicatorResult::scalar(value, true).with_carry(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn bar_at(ts: &str, high: f64, low: f64, close: f64, volume: i64) -> Bar {
        let timestamp = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap();
        Bar::new(timestamp, close, high, low, close, volume)
    }

    #[test]
    fn accumulates_within_a_session_and_resets_on_new_date() {
        let config = IndicatorConfig::default();
        let b1 = bar_at("2024-01-02 09:30:00", 101.0, 99.0, 100.0, 100);
        let r1 = Vwap.calculate(&[b1.clone()], &config, "AAPL", None);
        assert!(r1.valid);

        let b2 = bar_at("2024-01-02 09:31:00", 103.0, 101.0, 102.0, 300);
        let r2 = Vwap.calculate(&[b1, b2.clone()], &config, "AAPL", Some(&r1));
        // typical1=100*100=10000 vol100; typical2=102*300=30600 vol300 -> (10000+30600)/400
        assert!((r2.value.field(None).unwrap() - 40600.0 / 400.0).abs() < 1e-9);

        let b3 = bar_at("2024-01-03 09:30:00", 111.0, 109.0, 110.0, 50);
        let r3 = Vwap.calculate(&[b3.clone()], &config, "AAPL", Some(&r2));
        assert!((r3.value.field(None).unwrap() - 110.0).abs() < 1e-9);
    }
}
