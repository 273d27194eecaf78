//! Range and dispersion indicators.

mod atr;
mod bollinger;
mod donchian;
mod historical_vol;
mod keltner;
mod std_dev;

pub use atr::Atr;
pub use bollinger::Bollinger;
pub use donchian::Donchian;
pub use historical_vol::HistoricalVol;
pub use keltner::Keltner;
pub use std_dev::StdDev;

use session_data::Bar;

pub(crate) fn true_range(prior_close: f64, bar: &Bar) -> f64 {
    let a = bar.high - bar.low;
    let b = (bar.high - prior_close).abs();
    let c = (bar.low - prior_close).abs();
    a.max(b).max(c)
}

/// Plain average true range over the trailing `period` bars (needs
/// `period + 1` bars for the leading prior-close). Shared by [`Atr`] and
/// [`Keltner`]'s band width.
pub(crate) fn average_true_range(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }
    let start = bars.len() - period;
    let sum: f64 = (start..bars.len())
        .map(|i| true_range(bars[i - 1].close, &bars[i]))
        .sum();
    Some(sum / period as f64)
}

pub(crate) fn population_stddev(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
