use std::collections::BTreeMap;

use session_data::Bar;

use crate::indicators::momentum::high_low_window;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Donchian channels: highest high / lowest low over `config.period`, and
/// their midpoint.
#[derive(Debug, Default)]
pub struct Donchian;

impl Indicator for Donchian {
    fn name(&self) -> &'static str {
        "donchian"
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
        let Some((high, low)) = high_low_window(bars, config.period) else {
            return IndicatorResult::not_ready();
        };
        let mut fields = BTreeMap::new();
        fields.insert("upper".to_string(), high);
        fields.insert("lower".to_string(), low);
        fields.insert("middle".to_string(), (high + low) / 2.0);
        IndicatorResult::fields(fields, true)
    }
}
