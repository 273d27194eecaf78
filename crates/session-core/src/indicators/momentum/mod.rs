//! Momentum oscillators: rate-of-change and overbought/oversold indicators.

mod cci;
mod macd;
mod rsi;
mod roc_mom;
mod stochastic;
mod ultimate_oscillator;
mod williams_r;

pub use cci::Cci;
pub use macd::Macd;
pub use roc_mom::{Mom, Roc};
pub use rsi::Rsi;
pub use stochastic::Stochastic;
pub use ultimate_oscillator::UltimateOscillator;
pub use williams_r::WilliamsR;

use session_data::Bar;

/// `(highest high, lowest low)` over the trailing `period` bars, or `None`
/// if there aren't enough yet. Shared by Stochastic, Williams %R, Donchian.
pub(crate) fn high_low_window(bars: &[Bar], period: usize) -> Option<(f64, f64)> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let window = &bars[bars.len() - period..];
    let high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    Some((high, low))
}

pub(crate) fn typical_price(bar: &Bar) -> f64 {
    (bar.high + bar.low + bar.close) / 3.0
}
