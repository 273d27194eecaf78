use std::collections::BTreeMap;

use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Classic floor-trader pivot points, computed from the prior completed
/// bar (the second-to-last entry in `bars`) and applied to the current
/// one. `config.period` is unused.
#[derive(Debug, Default)]
pub struct PivotPoints;

impl Indicator for PivotPoints {
    fn name(&self) -> &'static str {
        "pivot_points"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::SupportResistance
    }

    fn calculate(
        &self,
        bars: &[Bar],
        _config: &IndicatorConfig,
        _symbol: &str,
        _previous: Option<&IndicatorResult>,
    ) -> IndicatorResult {
        if bars.len() < 2 {
            return IndicatorResult::not_ready();
        }
        let prior = &bars[bars.len() - 2];
        let pivot = (prior.high + prior.low + prior.close) / 3.0;
        let range = prior.high - prior.low;

        let mut fields = BTreeMap::new();
        fields.insert("pivot".to_string(), pivot);
        fields.insert("r1".to_string(), 2.0 * pivot - prior.low);
        fields.insert("s1".to_string(), 2.0 * pivot - prior.high);
        fields.insert("r2".to_string(), pivot + range);
        fields.insert("s2".to_string(), pivot - range);
        IndicatorResult::fields(fields, true)
    }

    fn warmup_bars(&self, _config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        (2.0 * warmup_multiplier).ceil() as usize
    }
}
