//! Session coordinator: the seven-phase state machine that drives one
//! trading day from cleanup through to close, plus mid-session symbol
//! insertion and the live-mode lag watchdog. Generalizes the teacher's
//! `engine::MTFEngine` (the driver that owned `MTFStateManager` and fed it
//! ticks) into a phase machine that owns `SessionDataStore` the same way.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use parking_lot::{Condvar, Mutex, RwLock};
use session_data::{Bar, Interval, TimeService};
use tracing::{info, warn};

use crate::derived;
use crate::indicators::{manager as indicator_manager, IndicatorRegistry};
use crate::provisioning::{self, ProvisioningOutcome, ProvisioningRequest};
use crate::quality;
use crate::store::{SessionDataStore, SessionMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    PreSessionCleanup,
    Initialization,
    Provisioning,
    QueuePriming,
    Activation,
    Streaming,
    PostSession,
}

/// Streaming proceeds either on a simulated clock (backtest replay, paced
/// by `speed_multiplier`) or purely in response to arriving data (live, or
/// a backtest run with `speed_multiplier = 0`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamingDriver {
    ClockDriven { speed_multiplier: f64 },
    DataDriven,
}

/// The single pause/resume event spec.md §4.9 describes: the streaming
/// loop blocks on it between ticks, and both mid-session insertion and
/// scanner hooks acquire it to serialize their store mutations against
/// whatever the stream is doing.
pub struct PauseGate {
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl PauseGate {
    pub fn new() -> Self {
        Self {
            paused: Mutex::new(false),
            resumed: Condvar::new(),
        }
    }

    pub fn pause(&self) {
        *self.paused.lock() = true;
    }

    pub fn resume(&self) {
        *self.paused.lock() = false;
        self.resumed.notify_all();
    }

    /// Blocks the calling thread while the gate is held paused.
    pub fn wait_if_paused(&self) {
        let mut guard = self.paused.lock();
        while *guard {
            self.resumed.wait(&mut guard);
        }
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

/// What one call to [`SessionCoordinator::stream_day`] accomplished —
/// tested against directly in scenario 5 (clock-driven bar counts) and
/// scenario 6 (lag watchdog trips).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamingSummary {
    pub bars_delivered: usize,
    pub lag_trips: u32,
    pub final_time: Option<NaiveDateTime>,
}

/// Drives one trading day through [`SessionPhase`]s. Holds the store and
/// indicator registry every phase needs; provisioning logic itself lives
/// in [`crate::provisioning`] — the coordinator only sequences it.
pub struct SessionCoordinator {
    store: Arc<SessionDataStore>,
    registry: Arc<IndicatorRegistry>,
    mode: SessionMode,
    phase: RwLock<SessionPhase>,
}

impl SessionCoordinator {
    pub fn new(store: Arc<SessionDataStore>, registry: Arc<IndicatorRegistry>, mode: SessionMode) -> Self {
        Self {
            store,
            registry,
            mode,
            phase: RwLock::new(SessionPhase::PreSessionCleanup),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.read()
    }

    fn set_phase(&self, phase: SessionPhase) {
        *self.phase.write() = phase;
        info!(?phase, "session phase transition");
    }

    pub fn store(&self) -> &SessionDataStore {
        &self.store
    }

    /// Phases 0 through 4: clear yesterday's state, provision every
    /// requested symbol (continuing past individual failures), prime the
    /// queues, then flip the store's activation gate.
    pub fn begin_day(
        &self,
        date: NaiveDate,
        requests: Vec<ProvisioningRequest>,
        warmup_multiplier: f64,
        driver: StreamingDriver,
    ) -> Vec<ProvisioningOutcome> {
        self.set_phase(SessionPhase::PreSessionCleanup);
        self.store.clear_all();

        self.set_phase(SessionPhase::Initialization);
        info!(%date, mode = ?self.mode, "session initializing");

        self.set_phase(SessionPhase::Provisioning);
        let analyzed = provisioning::analyze(requests, &self.registry, warmup_multiplier);
        let (plans, mut outcomes) = provisioning::validate(analyzed);
        let no_history = provisioning::HistoricalBars::new();
        for plan in &plans {
            let symbol = plan.request.symbol.clone();
            let outcome = match provisioning::execute(&self.store, &self.registry, plan, &no_history) {
                Ok(()) => ProvisioningOutcome { symbol, ok: true, error: None },
                Err(err) => ProvisioningOutcome { symbol, ok: false, error: Some(err.to_string()) },
            };
            outcomes.push(outcome);
        }
        for outcome in outcomes.iter().filter(|o| !o.ok) {
            warn!(symbol = %outcome.symbol, error = ?outcome.error, "symbol provisioning failed, continuing batch");
        }

        self.set_phase(SessionPhase::QueuePriming);

        self.set_phase(SessionPhase::Activation);
        self.store.activate_session(date);

        info!(?driver, "entering streaming phase");
        self.set_phase(SessionPhase::Streaming);
        outcomes
    }

    /// The data-flow spec.md §2 describes for one arriving base bar:
    /// append, derive, recompute indicators, assess quality. Every
    /// streaming path (clock-driven, data-driven, mid-session catch-up)
    /// funnels through this one function so none of them can drift from
    /// the others.
    fn deliver_base_bar(&self, symbol: &str, bar: Bar, calendar: &dyn TimeService, date: NaiveDate) {
        let base_interval = match self.store.get_symbol_data(symbol, true) {
            Some(data) => data.base_interval,
            None => return,
        };
        if self.store.append_base_bar(symbol, bar).is_err() {
            return;
        }
        self.refresh_interval(symbol, base_interval, calendar, date);

        match derived::refresh_derived_bars(&self.store, symbol, Some(calendar)) {
            Ok(touched) => {
                for interval in touched {
                    self.refresh_interval(symbol, interval, calendar, date);
                }
            }
            Err(err) => warn!(symbol, %err, "derived bar generation failed"),
        }
    }

    fn refresh_interval(&self, symbol: &str, interval: Interval, calendar: &dyn TimeService, date: NaiveDate) {
        if let Err(err) = indicator_manager::refresh_indicators(&self.store, &self.registry, symbol, interval) {
            warn!(symbol, %interval, %err, "indicator refresh failed");
        }
        if let Err(err) = quality::assess_quality(&self.store, symbol, interval, calendar, date) {
            warn!(symbol, %interval, %err, "quality assessment failed");
        }
    }

    /// Phase 5: delivers every queued bar across all symbols in timestamp
    /// order, either paced by a simulated clock (one tick per market
    /// second, `speed_multiplier` real-time scaling, never exceeding
    /// market close) or as fast as the queues allow (data-driven: jump to
    /// the next bar's timestamp). Checks `pause` between every tick so
    /// mid-session insertion and scanner hooks can serialize against it,
    /// and `stop` at every suspension point for clean cancellation.
    pub fn stream_day(
        &self,
        mut queues: BTreeMap<String, VecDeque<Bar>>,
        calendar: &dyn TimeService,
        date: NaiveDate,
        driver: StreamingDriver,
        pause: &PauseGate,
        stop: &AtomicBool,
    ) -> StreamingSummary {
        let session = calendar.get_trading_session(date);
        let market_close = date.and_time(session.close);
        let mut sim_time = date.and_time(session.open);
        let mut summary = StreamingSummary::default();

        loop {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            pause.wait_if_paused();
            if stop.load(Ordering::SeqCst) {
                break;
            }

            let next_ts = queues.values().filter_map(|q| q.front().map(|b| b.timestamp)).min();
            let Some(next_ts) = next_ts else { break };
            if next_ts > market_close {
                break;
            }

            match driver {
                StreamingDriver::ClockDriven { speed_multiplier } if speed_multiplier > 0.0 => {
                    sim_time = (sim_time + ChronoDuration::seconds(1)).min(market_close);
                    thread::sleep(StdDuration::from_secs_f64(1.0 / speed_multiplier));
                }
                _ => sim_time = next_ts,
            }

            for (symbol, queue) in queues.iter_mut() {
                while let Some(front_ts) = queue.front().map(|b| b.timestamp) {
                    if front_ts > sim_time {
                        break;
                    }
                    let bar = queue.pop_front().expect("front just checked Some");
                    self.deliver_base_bar(symbol, bar, calendar, date);
                    summary.bars_delivered += 1;
                }
            }

            if sim_time >= market_close {
                break;
            }
        }

        summary.final_time = Some(sim_time);
        summary
    }

    /// Mid-session symbol insertion. Live mode just provisions and starts
    /// streaming — there's no history to catch up on beyond what the
    /// provider backfills. Backtest mode must deactivate the store around
    /// provisioning and the catch-up replay (so readers never observe the
    /// half-built symbol), replay `catch_up_bars` — the day's bars up to
    /// the current simulated time — through the normal bar-delivery
    /// pipeline, then reactivate. The clock itself never advances during
    /// this; the caller doesn't pass one in.
    pub fn insert_symbol_mid_session(
        &self,
        request: ProvisioningRequest,
        warmup_multiplier: f64,
        catch_up_bars: Vec<Bar>,
        calendar: &dyn TimeService,
        date: NaiveDate,
    ) -> ProvisioningOutcome {
        match self.mode {
            SessionMode::Live => provisioning::add_symbol(&self.store, &self.registry, request, warmup_multiplier),
            SessionMode::Backtest => {
                let symbol = request.symbol.clone();
                let was_active = self.store.is_active();
                if was_active {
                    self.store.deactivate_session();
                }
                let outcome = provisioning::add_symbol(&self.store, &self.registry, request, warmup_multiplier);
                if outcome.ok {
                    for bar in catch_up_bars {
                        self.deliver_base_bar(&symbol, bar, calendar, date);
                    }
                }
                if was_active {
                    if let Some(date) = self.store.session_date() {
                        self.store.activate_session(date);
                    }
                }
                outcome
            }
        }
    }

    /// Phase 6: deactivates the store and marks the day closed.
    pub fn end_day(&self) {
        self.store.deactivate_session();
        self.set_phase(SessionPhase::PostSession);
    }

    /// Live-mode lag watchdog: `true` once the gap between wall-clock
    /// `now` and the latest data timestamp exceeds `threshold_secs`. A
    /// no-op in backtest — there's no wall clock to fall behind, the
    /// simulated clock only ever advances on data the engine already has.
    pub fn check_lag(&self, now: chrono::NaiveDateTime, latest_data_at: chrono::NaiveDateTime, threshold_secs: i64) -> bool {
        match self.mode {
            SessionMode::Backtest => false,
            SessionMode::Live => (now - latest_data_at).num_seconds() > threshold_secs,
        }
    }
}
