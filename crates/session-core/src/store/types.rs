//! The session data model: the record types held by the session data store.
//! Generalized from the teacher's `SymbolMTFState` (one MTF state per
//! symbol) into the full per-symbol record spec.md describes — bars per
//! interval, indicators, metrics, historical window, and provisioning
//! metadata all live on one `SymbolSessionData`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use session_data::{Bar, Interval, Quote};

use crate::indicators::{IndicatorCategory, IndicatorResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub missing_count: u32,
}

/// Bars for one (symbol, interval) pair, plus the bookkeeping the quality
/// engine and derived-bar generator need. `derived`/`base`/`quality`/`gaps`
/// all live here and nowhere else, per the store's invariants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarIntervalData {
    pub bars: Vec<Bar>,
    pub derived: bool,
    pub base: Option<Interval>,
    pub quality: f64,
    pub gaps: Vec<Gap>,
    pub updated: bool,
}

impl BarIntervalData {
    pub fn new_base() -> Self {
        Self {
            derived: false,
            base: None,
            quality: 0.0,
            ..Default::default()
        }
    }

    pub fn new_derived(base: Interval) -> Self {
        Self {
            derived: true,
            base: Some(base),
            quality: 0.0,
            ..Default::default()
        }
    }

    /// Reads and clears the `updated` flag in one step, the pattern
    /// observers use to avoid missing a notification between read and clear.
    pub fn take_updated(&mut self) -> bool {
        std::mem::take(&mut self.updated)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub volume: i64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub last_update_time: Option<NaiveDateTime>,
}

impl SessionMetrics {
    pub fn observe_base_bar(&mut self, bar: &Bar) {
        self.volume += bar.volume;
        self.high = Some(self.high.map_or(bar.high, |h| h.max(bar.high)));
        self.low = Some(self.low.map_or(bar.low, |l| l.min(bar.low)));
        self.last_update_time = Some(bar.timestamp);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorData {
    pub name: String,
    pub category: IndicatorCategory,
    pub interval: Interval,
    /// `None` for indicators keyed without a period (e.g. `vwap_1m`);
    /// the manager rebuilds the indicator's `IndicatorConfig` from this
    /// on every bar, so it has to survive past registration.
    pub period: Option<usize>,
    pub result: Option<IndicatorResult>,
    pub last_updated: Option<NaiveDateTime>,
    pub valid: bool,
}

impl IndicatorData {
    pub fn new(name: impl Into<String>, category: IndicatorCategory, interval: Interval, period: Option<usize>) -> Self {
        Self {
            name: name.into(),
            category,
            interval,
            period,
            result: None,
            last_updated: None,
            valid: false,
        }
    }

    pub fn apply(&mut self, result: IndicatorResult, at: NaiveDateTime) {
        self.valid = result.valid;
        self.last_updated = Some(at);
        self.result = Some(result);
    }
}

/// Per-symbol rolling window of prior trading days, plus indicators computed
/// over that window (avg volume, avg range, etc).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalData {
    pub bars: BTreeMap<Interval, BTreeMap<NaiveDate, Vec<Bar>>>,
    pub indicators: BTreeMap<String, IndicatorData>,
}

impl HistoricalData {
    pub fn trading_days(&self, interval: Interval) -> usize {
        self.bars.get(&interval).map(|d| d.len()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisioningSource {
    Config,
    Strategy,
    Scanner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningMetadata {
    pub meets_session_config_requirements: bool,
    pub auto_provisioned: bool,
    pub upgraded_from_adhoc: bool,
    pub added_by: ProvisioningSource,
}

impl ProvisioningMetadata {
    pub fn full(added_by: ProvisioningSource) -> Self {
        Self {
            meets_session_config_requirements: true,
            auto_provisioned: false,
            upgraded_from_adhoc: false,
            added_by,
        }
    }

    pub fn ad_hoc(added_by: ProvisioningSource) -> Self {
        Self {
            meets_session_config_requirements: false,
            auto_provisioned: true,
            upgraded_from_adhoc: false,
            added_by,
        }
    }

    pub fn upgrade_to_full(&mut self) {
        self.meets_session_config_requirements = true;
        self.upgraded_from_adhoc = true;
    }
}

/// The hub record per symbol — `SessionDataStore` holds one of these per
/// active symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSessionData {
    pub symbol: String,
    pub base_interval: Interval,
    pub bars: BTreeMap<Interval, BarIntervalData>,
    pub indicators: BTreeMap<String, IndicatorData>,
    pub metrics: SessionMetrics,
    pub historical: HistoricalData,
    pub latest_quote: Option<Quote>,
    pub provisioning: ProvisioningMetadata,
}

impl SymbolSessionData {
    pub fn new(symbol: impl Into<String>, base_interval: Interval, provisioning: ProvisioningMetadata) -> Self {
        let symbol = symbol.into();
        let mut bars = BTreeMap::new();
        bars.insert(base_interval, BarIntervalData::new_base());
        Self {
            symbol,
            base_interval,
            bars,
            indicators: BTreeMap::new(),
            metrics: SessionMetrics::default(),
            historical: HistoricalData::default(),
            latest_quote: None,
            provisioning,
        }
    }

    /// Appends a base bar, updating metrics and setting the `updated` flag.
    /// Panics if `interval` is not this symbol's base — an invariant
    /// violation, not a recoverable error (spec.md §7).
    pub fn append_base_bar(&mut self, bar: Bar) {
        self.metrics.observe_base_bar(&bar);
        let data = self
            .bars
            .get_mut(&self.base_interval)
            .expect("base interval entry must exist for every symbol");
        data.bars.push(bar);
        data.updated = true;
    }

    pub fn append_derived_bars(&mut self, interval: Interval, bars: impl IntoIterator<Item = Bar>) {
        if let Some(data) = self.bars.get_mut(&interval) {
            let mut any = false;
            for bar in bars {
                data.bars.push(bar);
                any = true;
            }
            if any {
                data.updated = true;
            }
        }
    }

    pub fn derived_intervals(&self) -> Vec<Interval> {
        self.bars
            .iter()
            .filter(|(_, data)| data.derived)
            .map(|(interval, _)| *interval)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    Backtest,
    Live,
}

/// Top-level session record: every active symbol, plus the deactivation
/// gate external readers must honor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub symbols: BTreeMap<String, SymbolSessionData>,
    pub session_active: bool,
    pub session_date: Option<NaiveDate>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            symbols: BTreeMap::new(),
            session_active: false,
            session_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn metrics_track_running_extrema_and_volume() {
        let mut metrics = SessionMetrics::default();
        metrics.observe_base_bar(&Bar::new(ts("2024-01-02 09:30:00"), 100.0, 101.0, 99.0, 100.5, 1000));
        metrics.observe_base_bar(&Bar::new(ts("2024-01-02 09:31:00"), 100.5, 102.0, 98.0, 99.0, 500));
        assert_eq!(metrics.volume, 1500);
        assert_eq!(metrics.high, Some(102.0));
        assert_eq!(metrics.low, Some(98.0));
    }

    #[test]
    fn append_base_bar_sets_updated_flag() {
        let base = Interval::parse("1m").unwrap();
        let mut symbol = SymbolSessionData::new("AAPL", base, ProvisioningMetadata::full(ProvisioningSource::Config));
        symbol.append_base_bar(Bar::new(ts("2024-01-02 09:30:00"), 100.0, 101.0, 99.0, 100.5, 1000));
        assert!(symbol.bars[&base].updated);
        assert_eq!(symbol.bars[&base].bars.len(), 1);
    }

    #[test]
    fn derived_intervals_lists_only_derived_entries() {
        let base = Interval::parse("1m").unwrap();
        let m5 = Interval::parse("5m").unwrap();
        let mut symbol = SymbolSessionData::new("AAPL", base, ProvisioningMetadata::full(ProvisioningSource::Config));
        symbol.bars.insert(m5, BarIntervalData::new_derived(base));
        assert_eq!(symbol.derived_intervals(), vec![m5]);
    }
}
