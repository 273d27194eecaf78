//! Volume-derived indicators.

mod obv;
mod pvt;
mod volume_ratio;
mod volume_sma;

pub use obv::Obv;
pub use pvt::Pvt;
pub use volume_ratio::VolumeRatio;
pub use volume_sma::VolumeSma;
