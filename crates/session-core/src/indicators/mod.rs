//! The indicator library: one pure contract (`indicator_trait`) plus five
//! category modules, generalized from the teacher's `indicators/{trend,
//! momentum,volatility,volume,other}` split — `other` becomes
//! `support_resistance` here since every indicator left in it is keyed off
//! support/resistance or historical-range levels rather than a single
//! trend/momentum/volatility/volume family.

mod indicator_trait;
pub mod manager;
pub mod momentum;
pub mod registry;
pub mod support_resistance;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use indicator_trait::{
    indicator_key, CarryState, Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult,
    IndicatorValue,
};
pub use registry::IndicatorRegistry;
