//! Three-phase provisioning pipeline: analyze (requirement analysis, pure),
//! validate (graceful degradation — one bad symbol in a batch never stops
//! the rest), execute (idempotent store writes). Every entry point that
//! adds a symbol or an indicator — session config at startup, a strategy's
//! runtime request, a scanner's ad-hoc probe, a scanner result upgraded to
//! full tracking — goes through the same three phases.

use std::collections::BTreeMap;

use session_data::{Bar, Interval};

use crate::indicators::{manager as indicator_manager, IndicatorCategory, IndicatorRegistry};
use crate::requirement::{self, IndicatorRequest, RequirementAnalysis, RequirementError};
use crate::store::{DataStoreError, IndicatorData, ProvisioningMetadata, ProvisioningSource, SessionDataStore};

/// Historical bars available per interval at provisioning time, keyed by
/// interval — what the columnar store (out of scope here, spec.md §6)
/// would hand back for the symbol's warmup window. An empty map just
/// means every indicator starts unwarmed, same as before this existed.
pub type HistoricalBars = BTreeMap<Interval, Vec<Bar>>;

#[derive(Debug, Clone)]
pub struct ProvisioningRequest {
    pub symbol: String,
    pub intervals: Vec<Interval>,
    pub indicators: Vec<IndicatorRequest>,
    pub source: ProvisioningSource,
    pub ad_hoc: bool,
}

#[derive(Debug, Clone)]
pub struct ProvisioningPlan {
    pub request: ProvisioningRequest,
    pub analysis: RequirementAnalysis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningOutcome {
    pub symbol: String,
    pub ok: bool,
    pub error: Option<String>,
}

impl ProvisioningOutcome {
    fn ok(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), ok: true, error: None }
    }

    fn failed(symbol: impl Into<String>, error: impl ToString) -> Self {
        Self { symbol: symbol.into(), ok: false, error: Some(error.to_string()) }
    }
}

/// Phase 1: pure requirement analysis per request, independent of every
/// other request in the batch.
pub fn analyze(
    requests: Vec<ProvisioningRequest>,
    registry: &IndicatorRegistry,
    warmup_multiplier: f64,
) -> Vec<Result<ProvisioningPlan, (ProvisioningRequest, RequirementError)>> {
    requests
        .into_iter()
        .map(|request| {
            match requirement::analyze(&request.intervals, &request.indicators, registry, warmup_multiplier) {
                Ok(analysis) => Ok(ProvisioningPlan { request, analysis }),
                Err(err) => Err((request, err)),
            }
        })
        .collect()
}

/// Phase 2: separates the plans that can proceed from the ones that
/// can't, turning every failure into an outcome instead of aborting the
/// batch — one symbol's bad config never blocks its neighbors.
pub fn validate(
    analyzed: Vec<Result<ProvisioningPlan, (ProvisioningRequest, RequirementError)>>,
) -> (Vec<ProvisioningPlan>, Vec<ProvisioningOutcome>) {
    let mut plans = Vec::new();
    let mut failures = Vec::new();
    for result in analyzed {
        match result {
            Ok(plan) => plans.push(plan),
            Err((request, err)) => failures.push(ProvisioningOutcome::failed(request.symbol, err)),
        }
    }
    (plans, failures)
}

/// Phase 3: writes a validated plan into the store. Idempotent —
/// registering an already-registered symbol or interval is a no-op, so
/// replaying a plan (a retry, a mid-session upgrade) is always safe.
/// `historical_bars` drives the warmup step: every registered indicator
/// whose interval has an entry there is replayed through
/// [`indicator_manager::warmup`] before this returns, so it's already
/// valid when the session starts streaming.
pub fn execute(
    store: &SessionDataStore,
    registry: &IndicatorRegistry,
    plan: &ProvisioningPlan,
    historical_bars: &HistoricalBars,
) -> Result<(), DataStoreError> {
    let symbol = &plan.request.symbol;
    let provisioning = if plan.request.ad_hoc {
        ProvisioningMetadata::ad_hoc(plan.request.source)
    } else {
        ProvisioningMetadata::full(plan.request.source)
    };
    store.register_symbol(symbol, plan.analysis.base_interval, provisioning);

    for interval in &plan.analysis.derived_intervals {
        store.register_derived_interval(symbol, *interval, plan.analysis.base_interval)?;
    }

    for request in &plan.analysis.indicators {
        register_indicator(store, registry, symbol, request)?;
    }

    let mut warmed = std::collections::BTreeSet::new();
    for request in &plan.analysis.indicators {
        if !warmed.insert(request.interval) {
            continue;
        }
        if let Some(bars) = historical_bars.get(&request.interval) {
            indicator_manager::warmup(store, registry, symbol, request.interval, bars)?;
        }
    }

    Ok(())
}

/// Registers one indicator on an already-provisioned symbol, keyed
/// `{name}_{period}_{interval}` or `{name}_{interval}` depending on
/// whether the indicator actually uses `period` (spec.md §3) —
/// period-irrelevant indicators like VWAP/TWAP never get a period baked
/// into their key. Idempotent: re-registering the same key is a no-op.
fn register_indicator(
    store: &SessionDataStore,
    registry: &IndicatorRegistry,
    symbol: &str,
    request: &IndicatorRequest,
) -> Result<(), DataStoreError> {
    let calc = registry.get(&request.name);
    let category = calc.map(|ind| ind.category()).unwrap_or(IndicatorCategory::Trend);
    let uses_period = calc.map(|ind| ind.uses_period()).unwrap_or(true);
    let period = uses_period.then_some(request.period);
    store.with_symbol_mut(symbol, |data| {
        data.indicators
            .entry(crate::indicators::indicator_key(&request.name, period, request.interval))
            .or_insert_with(|| IndicatorData::new(request.name.clone(), category, request.interval, period));
    })
}

/// Thin orchestrator: runs one symbol through all three phases and
/// reports a single outcome. The batch entry points (session config at
/// startup, a scanner's symbol list) call `analyze`/`validate`/`execute`
/// directly so one symbol's failure doesn't short-circuit the others.
pub fn add_symbol(
    store: &SessionDataStore,
    registry: &IndicatorRegistry,
    request: ProvisioningRequest,
    warmup_multiplier: f64,
) -> ProvisioningOutcome {
    add_symbol_with_history(store, registry, request, warmup_multiplier, &HistoricalBars::new())
}

/// Same as [`add_symbol`] but with a historical-bars warmup source — the
/// scanner ad-hoc path (spec.md §4.8's "minimal warmup window") and a
/// full config load both go through this.
pub fn add_symbol_with_history(
    store: &SessionDataStore,
    registry: &IndicatorRegistry,
    request: ProvisioningRequest,
    warmup_multiplier: f64,
    historical_bars: &HistoricalBars,
) -> ProvisioningOutcome {
    let symbol = request.symbol.clone();
    match requirement::analyze(&request.intervals, &request.indicators, registry, warmup_multiplier) {
        Ok(analysis) => {
            let plan = ProvisioningPlan { request, analysis };
            match execute(store, registry, &plan, historical_bars) {
                Ok(()) => ProvisioningOutcome::ok(symbol),
                Err(err) => ProvisioningOutcome::failed(symbol, err),
            }
        }
        Err(err) => ProvisioningOutcome::failed(symbol, err),
    }
}

/// Upgrades an ad-hoc (scanner-probed) symbol to full session-config
/// tracking once it meets the session's criteria, without re-running
/// provisioning from scratch.
pub fn upgrade_to_full(store: &SessionDataStore, symbol: &str) -> Result<(), DataStoreError> {
    store.with_symbol_mut(symbol, |data| data.provisioning.upgrade_to_full())
}

/// Attaches one more indicator to a symbol — the ad-hoc "scanner wants
/// RSI_14 on AAPL right now" path. If the symbol is already provisioned
/// this just registers the indicator, without re-deriving the symbol's
/// whole requirement set. If it isn't (spec.md §4.8 Phase 1, scenario 3:
/// `add_indicator_unified("NVDA", sma_20_5m, "scanner")` when NVDA isn't
/// present), it's routed through the full three-phase pipeline instead —
/// `create_symbol`, `add_interval(base)`, `add_interval(derived...)`,
/// `register_indicator` — as an auto-provisioned ad-hoc symbol.
pub fn add_indicator_unified(
    store: &SessionDataStore,
    registry: &IndicatorRegistry,
    symbol: &str,
    request: IndicatorRequest,
) -> Result<(), DataStoreError> {
    if store.get_symbol_data(symbol, true).is_some() {
        return register_indicator(store, registry, symbol, &request);
    }

    let provisioning_request = ProvisioningRequest {
        symbol: symbol.to_string(),
        intervals: vec![request.interval],
        indicators: vec![request],
        source: ProvisioningSource::Scanner,
        ad_hoc: true,
    };
    let outcome = add_symbol(store, registry, provisioning_request, 2.0);
    match outcome.error {
        None => Ok(()),
        Some(reason) => Err(DataStoreError::ProvisioningFailed { symbol: symbol.to_string(), reason }),
    }
}

/// Appends one base bar through the unified path every provisioning
/// source shares, so a bar from a backtest replay and a bar from a live
/// feed land the same way.
pub fn add_bar_unified(store: &SessionDataStore, symbol: &str, bar: session_data::Bar) -> Result<(), DataStoreError> {
    store.append_base_bar(symbol, bar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ProvisioningSource;

    fn request(symbol: &str, intervals: Vec<Interval>) -> ProvisioningRequest {
        ProvisioningRequest {
            symbol: symbol.to_string(),
            intervals,
            indicators: Vec::new(),
            source: ProvisioningSource::Config,
            ad_hoc: false,
        }
    }

    #[test]
    fn one_bad_request_does_not_block_the_rest_of_the_batch() {
        let registry = IndicatorRegistry::with_defaults();
        let m1 = Interval::parse("1m").unwrap();
        let requests = vec![request("AAPL", vec![m1]), request("MSFT", vec![])];

        let (plans, failures) = validate(analyze(requests, &registry, 2.0));
        assert_eq!(plans.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].symbol, "MSFT");
    }

    #[test]
    fn execute_is_idempotent() {
        let store = SessionDataStore::new();
        let registry = IndicatorRegistry::with_defaults();
        let m1 = Interval::parse("1m").unwrap();
        let req = request("AAPL", vec![m1]);
        let (plans, _) = validate(analyze(vec![req.clone()], &registry, 2.0));
        let historical = HistoricalBars::new();
        execute(&store, &registry, &plans[0], &historical).unwrap();
        execute(&store, &registry, &plans[0], &historical).unwrap();
        assert_eq!(store.registered_symbols(), vec!["AAPL".to_string()]);
    }

    #[test]
    fn execute_warms_up_indicators_from_supplied_historical_bars() {
        use crate::requirement::IndicatorRequest;
        use chrono::NaiveDateTime;
        use session_data::Bar;

        let store = SessionDataStore::new();
        let registry = IndicatorRegistry::with_defaults();
        let m1 = Interval::parse("1m").unwrap();
        let mut req = request("AAPL", vec![m1]);
        req.indicators.push(IndicatorRequest { name: "sma".to_string(), interval: m1, period: 3 });
        let (plans, _) = validate(analyze(vec![req], &registry, 2.0));

        let bar = |s: &str, close: f64| {
            let ts = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
            Bar::new(ts, close, close + 1.0, close - 1.0, close, 100)
        };
        let mut historical = HistoricalBars::new();
        historical.insert(
            m1,
            vec![
                bar("2024-01-02 09:25:00", 100.0),
                bar("2024-01-02 09:26:00", 101.0),
                bar("2024-01-02 09:27:00", 102.0),
            ],
        );

        execute(&store, &registry, &plans[0], &historical).unwrap();
        let data = store.get_symbol_data("AAPL", true).unwrap();
        let key = crate::indicators::indicator_key("sma", Some(3), m1);
        assert!(data.indicators[&key].valid);
    }

    #[test]
    fn add_indicator_unified_auto_provisions_a_missing_symbol() {
        let store = SessionDataStore::new();
        let registry = IndicatorRegistry::with_defaults();
        let m5 = Interval::parse("5m").unwrap();
        let sma_5m = IndicatorRequest { name: "sma".to_string(), interval: m5, period: 20 };

        add_indicator_unified(&store, &registry, "NVDA", sma_5m).unwrap();

        let data = store.get_symbol_data("NVDA", true).unwrap();
        assert!(data.provisioning.auto_provisioned);
        assert!(!data.provisioning.meets_session_config_requirements);
        assert_eq!(data.base_interval, m5);
        let key = crate::indicators::indicator_key("sma", Some(20), m5);
        assert!(data.indicators.contains_key(&key));
    }

    #[test]
    fn add_indicator_unified_attaches_to_an_existing_symbol_without_reprovisioning() {
        let store = SessionDataStore::new();
        let registry = IndicatorRegistry::with_defaults();
        let m1 = Interval::parse("1m").unwrap();
        let req = request("AAPL", vec![m1]);
        add_symbol(&store, &registry, req, 2.0);

        let rsi = IndicatorRequest { name: "rsi".to_string(), interval: m1, period: 14 };
        add_indicator_unified(&store, &registry, "AAPL", rsi).unwrap();

        let data = store.get_symbol_data("AAPL", true).unwrap();
        assert!(!data.provisioning.auto_provisioned, "pre-existing symbol's provisioning metadata is untouched");
        let key = crate::indicators::indicator_key("rsi", Some(14), m1);
        assert!(data.indicators.contains_key(&key));
    }

    #[test]
    fn period_irrelevant_indicators_key_without_a_period() {
        let store = SessionDataStore::new();
        let registry = IndicatorRegistry::with_defaults();
        let m1 = Interval::parse("1m").unwrap();
        let mut req = request("AAPL", vec![m1]);
        req.indicators.push(IndicatorRequest { name: "vwap".to_string(), interval: m1, period: 0 });
        let (plans, _) = validate(analyze(vec![req], &registry, 2.0));
        let historical = HistoricalBars::new();
        execute(&store, &registry, &plans[0], &historical).unwrap();

        let data = store.get_symbol_data("AAPL", true).unwrap();
        assert!(data.indicators.contains_key("vwap_1m"));
        assert!(!data.indicators.keys().any(|k| k.starts_with("vwap_0")));
    }
}
