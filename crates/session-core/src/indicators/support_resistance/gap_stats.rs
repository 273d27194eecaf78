use std::collections::BTreeMap;

use session_data::Bar;

use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// Overnight gap statistics over `config.period` daily bars: average gap
/// (today's open vs yesterday's close) and the fraction of gaps that were
/// up.
#[derive(Debug, Default)]
pub struct GapStats;

impl Indicator for GapStats {
    fn name(&self) -> &'static str {
        "gap_stats"
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
        let period = config.period;
        if period == 0 || bars.len() < period + 1 {
            return IndicatorResult::not_ready();
        }
        let window = &bars[bars.len() - period - 1..];
        let gaps: Vec<f64> = window.windows(2).map(|pair| pair[1].open - pair[0].close).collect();

        let avg_gap = gaps.iter().sum::<f64>() / gaps.len() as f64;
        let up_ratio = gaps.iter().filter(|g| **g > 0.0).count() as f64 / gaps.len() as f64;

        let mut fields = BTreeMap::new();
        fields.insert("avg_gap".to_string(), avg_gap);
        fields.insert("up_ratio".to_string(), up_ratio);
        IndicatorResult::fields(fields, true)
    }

    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        ((config.period + 1) as f64 * warmup_multiplier).ceil() as usize
    }
}
