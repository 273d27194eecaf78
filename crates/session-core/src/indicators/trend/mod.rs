//! Trend-following indicators: moving averages and anchored-average prices.

mod ema;
mod hma;
mod sma;
mod twap;
mod vwap;
mod wma;

pub use ema::{Dema, Ema, Tema};
pub use hma::Hma;
pub use sma::Sma;
pub use twap::Twap;
pub use vwap::Vwap;
pub use wma::Wma;

/// Trailing `period` closing prices, oldest first, or `None` if `bars`
/// doesn't yet hold enough history. Shared by the windowed (non-carry-state)
/// trend indicators below.
pub(super) fn closes(bars: &[session_data::Bar], period: usize) -> Option<Vec<f64>> {
    if period == 0 || bars.len() < period {
        return None;
    }
    Some(bars[bars.len() - period..].iter().map(|b| b.close).collect())
}
