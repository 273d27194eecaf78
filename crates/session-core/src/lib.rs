//! Session lifecycle engine: a shared data store, derived-bar generation,
//! a quality/gap engine, a requirement analyzer, a provisioning pipeline,
//! and the coordinator that drives a trading day through them.

pub mod coordinator;
pub mod derived;
pub mod events;
pub mod indicators;
pub mod provisioning;
pub mod quality;
pub mod requirement;
pub mod store;

pub use coordinator::SessionCoordinator;
pub use store::SessionDataStore;
