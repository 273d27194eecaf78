pub mod aggregator;
pub mod calendar;
pub mod import;
pub mod interval;
pub mod models;
pub mod provider;
pub mod store;

pub use aggregator::{aggregate_bars, aggregate_ticks_to_seconds, AggregationDiagnostics, AggregationOptions};
pub use calendar::{SimpleCalendar, TimeService, TradingSession};
pub use interval::{by_duration, can_derive, derivation_source_priority, Interval, IntervalError, IntervalUnit};
pub use models::{Bar, Quote, Tick};
pub use provider::{LiveDataProvider, ProviderError, Subscription};
pub use store::{FileStore, StoreError};
