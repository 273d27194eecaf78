//! Support/resistance levels and historical-range statistics — the
//! teacher's `indicators/other` category, renamed since every indicator
//! here keys off a price level or a historical range rather than a single
//! trend/momentum/volatility/volume family.

mod atr_daily;
mod avg_range;
mod avg_volume;
mod gap_stats;
mod high_low_n;
mod pivot;
mod range_ratio;
mod swing;

pub use atr_daily::AtrDaily;
pub use avg_range::AvgRange;
pub use avg_volume::AvgVolume;
pub use gap_stats::GapStats;
pub use high_low_n::HighLowN;
pub use pivot::PivotPoints;
pub use range_ratio::RangeRatio;
pub use swing::SwingPoints;
