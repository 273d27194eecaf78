use std::collections::BTreeMap;

use session_data::Bar;

use crate::indicators::momentum::high_low_window;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Highest high / lowest low over the trailing `config.period` bars — the
/// one parameterized implementation backing both "N-day high/low" and
/// "52-week high/low" style requests; callers choose the window by
/// picking `period` and feeding it the matching bar interval.
#[derive(Debug, Default)]
pub struct HighLowN;

impl Indicator for HighLowN {
    fn name(&self) -> &'static str {
        "high_low_n"
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
        match high_low_window(bars, config.period) {
            Some((high, low)) => {
                let mut fields = BTreeMap::new();
                fields.insert("high".to_string(), high);
                fields.insert("low".to_string(), low);
                IndicatorResult::fields(fields, true)
            }
            None => IndicatorResult::not_ready(),
        }
    }
}
