use std::collections::BTreeMap;

use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Confirmed swing high/low: the bar `config.period` positions back is a
/// swing point if it's the extreme among the `period` bars on either side
/// of it. Confirmation lags by `period` bars, same tradeoff as any
/// fractal-based swing detector — a swing can't be confirmed until enough
/// bars have formed after it.
#[derive(Debug, Default)]
pub struct SwingPoints;

impl Indicator for SwingPoints {
    fn name(&self) -> &'static str {
        "swing_points"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::SupportResistance
    }

    fn calculate(
        &self,
        bars: &[Bar],
        config: &IndicatorConfig,
        _symbol: &str,
        _previous: Option<&IndicatorResult>,
    ) -> IndicatorResult {
        let lag = config.period.max(1);
        let needed = 2 * lag + 1;
        if bars.len() < needed {
            return IndicatorResult::not_ready();
        }
        let center = bars.len() - 1 - lag;
        let candidate = &bars[center];
        let window = &bars[center - lag..=center + lag];

        let is_swing_high = window.iter().all(|b| b.high <= candidate.high);
        let is_swing_low = window.iter().all(|b| b.low >= candidate.low);

        let mut fields = BTreeMap::new();
        fields.insert("swing_high".to_string(), if is_swing_high { candidate.high } else { f64::NAN });
        fields.insert("swing_low".to_string(), if is_swing_low { candidate.low } else { f64::NAN });
        IndicatorResult::fields(fields, is_swing_high || is_swing_low)
    }

    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        ((2 * config.period.max(1) + 1) as f64 * warmup_multiplier).ceil() as usize
    }
}
