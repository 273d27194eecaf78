//! The shared session data store: one record per active symbol, gated
//! behind a `session_active` flag so external readers never observe a
//! symbol mid-provisioning. Generalizes the teacher's `MTFStateManager`
//! (`mtf/state_manager.rs`), which held one `SymbolMTFState` per symbol
//! behind a single `RwLock` — the same shape, widened to the full record
//! `SymbolSessionData` describes.

mod data_store;
mod types;

pub use data_store::{DataStoreError, SessionDataStore};
pub use types::{
    BarIntervalData, Gap, HistoricalData, IndicatorData, ProvisioningMetadata, ProvisioningSource,
    SessionData, SessionMetrics, SessionMode, SymbolSessionData,
};
