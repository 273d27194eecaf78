use session_data::Bar;

use crate::indicators::volatility::population_stddev;
use crate::indicators::{Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized historical volatility: stddev of log returns over
/// `config.period` bars, scaled by `sqrt(252)`.
#[derive(Debug, Default)]
pub struct HistoricalVol;

impl Indicator for HistoricalVol {
    fn name(&self) -> &'static str {
        "historical_vol"
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
        let period = config.period;
        if period == 0 || bars.len() < period + 1 {
            return IndicatorResult::not_ready();
        }
        let window = &bars[bars.len() - period - 1..];
        let log_returns: Vec<f64> = window
            .windows(2)
            .filter_map(|pair| {
                if pair[0].close > 0.0 && pair[1].close > 0.0 {
                    Some((pair[1].close / pair[0].close).ln())
                } else {
                    None
                }
            })
            .collect();
        if log_returns.len() < period {
            return IndicatorResult::not_ready();
        }
        let vol = population_stddev(&log_returns) * TRADING_DAYS_PER_YEAR.sqrt();
        IndicatorResult::scalar(vol, true)
    }
}
