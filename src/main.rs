mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use session_core::coordinator::StreamingDriver;
use session_core::indicators::IndicatorRegistry;
use session_core::provisioning::ProvisioningRequest;
use session_core::store::{ProvisioningSource, SessionDataStore, SessionMode};
use session_core::SessionCoordinator;
use session_data::Interval;
use tracing::{info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting session engine...");

    let config = config::Config::load()?;
    info!(environment = ?config.environment, mode = ?config.mode, "configuration loaded");

    let store = Arc::new(SessionDataStore::new());
    let registry = Arc::new(IndicatorRegistry::with_defaults());
    let mode = match config.mode {
        config::RunMode::Backtest => SessionMode::Backtest,
        config::RunMode::Live => SessionMode::Live,
    };
    let coordinator = SessionCoordinator::new(store, registry, mode);

    let intervals = config
        .session
        .intervals
        .iter()
        .map(|token| Interval::parse(token).with_context(|| format!("invalid interval token '{token}'")))
        .collect::<Result<Vec<_>>>()?;

    let requests: Vec<ProvisioningRequest> = config
        .session
        .symbols
        .iter()
        .map(|symbol| ProvisioningRequest {
            symbol: symbol.clone(),
            intervals: intervals.clone(),
            indicators: Vec::new(),
            source: ProvisioningSource::Config,
            ad_hoc: false,
        })
        .collect();

    let date = config
        .backtest
        .as_ref()
        .map(|b| b.start_date)
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let driver = match &config.backtest {
        Some(backtest) => StreamingDriver::ClockDriven { speed_multiplier: backtest.speed_multiplier },
        None => StreamingDriver::DataDriven,
    };

    let outcomes = coordinator.begin_day(date, requests, config.warmup_multiplier, driver);
    for outcome in &outcomes {
        if outcome.ok {
            info!(symbol = %outcome.symbol, "symbol provisioned");
        } else {
            warn!(symbol = %outcome.symbol, error = ?outcome.error, "symbol provisioning failed");
        }
    }

    info!(phase = ?coordinator.phase(), "session ready");
    Ok(())
}
