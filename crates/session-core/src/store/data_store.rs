use std::collections::BTreeMap;

use chrono::NaiveDate;
use parking_lot::RwLock;
use session_data::{Bar, Interval};
use tracing::{debug, info};

use crate::indicators::IndicatorCategory;

use super::types::{BarIntervalData, Gap, IndicatorData, ProvisioningMetadata, SessionData, SymbolSessionData};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataStoreError {
    #[error("symbol '{0}' is not registered in the session data store")]
    UnknownSymbol(String),
    #[error("symbol '{symbol}' has no '{interval}' bar series")]
    UnknownInterval { symbol: String, interval: String },
    #[error("provisioning symbol '{symbol}' failed: {reason}")]
    ProvisioningFailed { symbol: String, reason: String },
}

/// The store every component shares: coordinator, derived-bar generator,
/// and quality engine mutate it directly (`internal = true` reads,
/// unconditional writes); anything outside that trio must go through the
/// gated read path, which returns nothing while `session_active` is false.
pub struct SessionDataStore {
    inner: RwLock<SessionData>,
}

impl SessionDataStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SessionData::default()),
        }
    }

    pub fn activate_session(&self, date: NaiveDate) {
        let mut guard = self.inner.write();
        guard.session_active = true;
        guard.session_date = Some(date);
        info!(%date, "session activated");
    }

    pub fn deactivate_session(&self) {
        let mut guard = self.inner.write();
        guard.session_active = false;
        debug!("session deactivated");
    }

    pub fn is_active(&self) -> bool {
        self.inner.read().session_active
    }

    pub fn session_date(&self) -> Option<NaiveDate> {
        self.inner.read().session_date
    }

    pub fn register_symbol(&self, symbol: &str, base_interval: Interval, provisioning: ProvisioningMetadata) {
        let mut guard = self.inner.write();
        guard
            .symbols
            .entry(symbol.to_string())
            .or_insert_with(|| SymbolSessionData::new(symbol, base_interval, provisioning));
        debug!(symbol, %base_interval, "symbol registered");
    }

    pub fn remove_symbol(&self, symbol: &str) -> bool {
        let mut guard = self.inner.write();
        let removed = guard.symbols.remove(symbol).is_some();
        if removed {
            debug!(symbol, "symbol removed");
        }
        removed
    }

    /// Every provisioned symbol, regardless of the session-active gate.
    /// `pub(crate)` on purpose — this is the escape hatch the coordinator
    /// and provisioning pipeline need before activation; an external reader
    /// must go through `get_active_symbols` instead.
    pub(crate) fn registered_symbols(&self) -> Vec<String> {
        self.inner.read().symbols.keys().cloned().collect()
    }

    /// Spec's gated external-reader accessor: every symbol while the
    /// session is active, nothing while it isn't.
    pub fn get_active_symbols(&self) -> Vec<String> {
        let guard = self.inner.read();
        if !guard.session_active {
            return Vec::new();
        }
        guard.symbols.keys().cloned().collect()
    }

    pub fn symbols_with_derived(&self, interval: Interval) -> Vec<String> {
        self.inner
            .read()
            .symbols
            .iter()
            .filter(|(_, data)| data.bars.get(&interval).is_some_and(|d| d.derived))
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    /// Gated read: returns `None` while the session is inactive unless
    /// `internal` is set, per the store's deactivation-gate invariant.
    pub fn get_symbol_data(&self, symbol: &str, internal: bool) -> Option<SymbolSessionData> {
        let guard = self.inner.read();
        if !internal && !guard.session_active {
            return None;
        }
        guard.symbols.get(symbol).cloned()
    }

    /// Strategy-facing read: the named field of `key`'s current value, or
    /// `None` if the symbol/key is absent, the session is inactive, the
    /// indicator hasn't warmed up yet, or `field` doesn't resolve against
    /// the stored value (a scalar queried by name, a multi-valued result
    /// queried without one).
    pub fn get_indicator_value(&self, symbol: &str, key: &str, field: Option<&str>) -> Option<f64> {
        let guard = self.inner.read();
        if !guard.session_active {
            return None;
        }
        let indicator = guard.symbols.get(symbol)?.indicators.get(key)?;
        if !indicator.valid {
            return None;
        }
        indicator.result.as_ref()?.value.field(field)
    }

    /// Strategy-facing read: whether `key` has produced a valid result yet.
    /// `false` for an absent symbol/key or while the session is inactive.
    pub fn is_indicator_ready(&self, symbol: &str, key: &str) -> bool {
        let guard = self.inner.read();
        if !guard.session_active {
            return false;
        }
        guard
            .symbols
            .get(symbol)
            .and_then(|data| data.indicators.get(key))
            .is_some_and(|ind| ind.valid)
    }

    /// Strategy-facing read: every indicator registered on `symbol`,
    /// optionally narrowed to one `category`. Empty while the session is
    /// inactive or the symbol is unknown.
    pub fn get_all_indicators(&self, symbol: &str, category: Option<IndicatorCategory>) -> BTreeMap<String, IndicatorData> {
        let guard = self.inner.read();
        if !guard.session_active {
            return BTreeMap::new();
        }
        let Some(data) = guard.symbols.get(symbol) else {
            return BTreeMap::new();
        };
        data.indicators
            .iter()
            .filter(|(_, ind)| category.map_or(true, |c| ind.category == c))
            .map(|(key, ind)| (key.clone(), ind.clone()))
            .collect()
    }

    /// Escape hatch for callers (the provisioning pipeline, the indicator
    /// manager) that need to mutate fields `SessionDataStore` doesn't
    /// expose a dedicated method for — always an internal, ungated write.
    pub fn with_symbol_mut<R>(&self, symbol: &str, f: impl FnOnce(&mut SymbolSessionData) -> R) -> Result<R, DataStoreError> {
        let mut guard = self.inner.write();
        let data = guard
            .symbols
            .get_mut(symbol)
            .ok_or_else(|| DataStoreError::UnknownSymbol(symbol.to_string()))?;
        Ok(f(data))
    }

    pub fn append_base_bar(&self, symbol: &str, bar: Bar) -> Result<(), DataStoreError> {
        let mut guard = self.inner.write();
        let data = guard
            .symbols
            .get_mut(symbol)
            .ok_or_else(|| DataStoreError::UnknownSymbol(symbol.to_string()))?;
        data.append_base_bar(bar);
        Ok(())
    }

    pub fn register_derived_interval(&self, symbol: &str, interval: Interval, base: Interval) -> Result<(), DataStoreError> {
        let mut guard = self.inner.write();
        let data = guard
            .symbols
            .get_mut(symbol)
            .ok_or_else(|| DataStoreError::UnknownSymbol(symbol.to_string()))?;
        data.bars.entry(interval).or_insert_with(|| BarIntervalData::new_derived(base));
        Ok(())
    }

    pub fn append_derived_bars(
        &self,
        symbol: &str,
        interval: Interval,
        bars: impl IntoIterator<Item = Bar>,
    ) -> Result<(), DataStoreError> {
        let mut guard = self.inner.write();
        let data = guard
            .symbols
            .get_mut(symbol)
            .ok_or_else(|| DataStoreError::UnknownSymbol(symbol.to_string()))?;
        data.append_derived_bars(interval, bars);
        Ok(())
    }

    pub fn set_quality(&self, symbol: &str, interval: Interval, quality: f64) -> Result<(), DataStoreError> {
        self.with_interval_mut(symbol, interval, |data| data.quality = quality)
    }

    pub fn add_gap(&self, symbol: &str, interval: Interval, gap: Gap) -> Result<(), DataStoreError> {
        self.with_interval_mut(symbol, interval, |data| data.gaps.push(gap))
    }

    /// Replaces an interval's whole gap list in one step. The quality
    /// engine re-derives gaps from scratch on every assessment, so it
    /// always calls this rather than `add_gap` — otherwise a repeat
    /// assessment would duplicate every gap it already recorded.
    pub fn set_gaps(&self, symbol: &str, interval: Interval, gaps: Vec<Gap>) -> Result<(), DataStoreError> {
        self.with_interval_mut(symbol, interval, |data| data.gaps = gaps)
    }

    /// Reads and clears an interval's `updated` flag in one step.
    pub fn take_updated(&self, symbol: &str, interval: Interval) -> Result<bool, DataStoreError> {
        let mut guard = self.inner.write();
        let data = guard
            .symbols
            .get_mut(symbol)
            .ok_or_else(|| DataStoreError::UnknownSymbol(symbol.to_string()))?;
        let interval_data = data
            .bars
            .get_mut(&interval)
            .ok_or_else(|| DataStoreError::UnknownInterval {
                symbol: symbol.to_string(),
                interval: interval.as_token(),
            })?;
        Ok(interval_data.take_updated())
    }

    fn with_interval_mut(
        &self,
        symbol: &str,
        interval: Interval,
        f: impl FnOnce(&mut BarIntervalData),
    ) -> Result<(), DataStoreError> {
        let mut guard = self.inner.write();
        let data = guard
            .symbols
            .get_mut(symbol)
            .ok_or_else(|| DataStoreError::UnknownSymbol(symbol.to_string()))?;
        let interval_data = data
            .bars
            .get_mut(&interval)
            .ok_or_else(|| DataStoreError::UnknownInterval {
                symbol: symbol.to_string(),
                interval: interval.as_token(),
            })?;
        f(interval_data);
        Ok(())
    }

    pub fn clear_all(&self) {
        let mut guard = self.inner.write();
        *guard = SessionData::default();
        debug!("session data store cleared");
    }
}

impl Default for SessionDataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ProvisioningSource;
    use chrono::NaiveDateTime;

    fn bar(ts: &str, close: f64) -> Bar {
        let timestamp = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap();
        Bar::new(timestamp, close, close, close, close, 100)
    }

    #[test]
    fn gate_hides_data_until_session_is_active() {
        let store = SessionDataStore::new();
        let base = Interval::parse("1m").unwrap();
        store.register_symbol("AAPL", base, ProvisioningMetadata::full(ProvisioningSource::Config));

        assert!(store.get_symbol_data("AAPL", false).is_none());
        assert!(store.get_symbol_data("AAPL", true).is_some());

        store.activate_session(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!(store.get_symbol_data("AAPL", false).is_some());
    }

    #[test]
    fn append_base_bar_rejects_unknown_symbol() {
        let store = SessionDataStore::new();
        let err = store.append_base_bar("MSFT", bar("2024-01-02 09:30:00", 1.0));
        assert_eq!(err, Err(DataStoreError::UnknownSymbol("MSFT".to_string())));
    }

    #[test]
    fn derived_interval_tracking_and_updated_flag_round_trip() {
        let store = SessionDataStore::new();
        let base = Interval::parse("1m").unwrap();
        let m5 = Interval::parse("5m").unwrap();
        store.register_symbol("AAPL", base, ProvisioningMetadata::full(ProvisioningSource::Config));
        store.register_derived_interval("AAPL", m5, base).unwrap();

        assert_eq!(store.symbols_with_derived(m5), vec!["AAPL".to_string()]);

        store.append_derived_bars("AAPL", m5, vec![bar("2024-01-02 09:35:00", 2.0)]).unwrap();
        assert!(store.take_updated("AAPL", m5).unwrap());
        assert!(!store.take_updated("AAPL", m5).unwrap());
    }

    #[test]
    fn strategy_accessors_are_gated_by_session_active_and_indicator_validity() {
        use crate::indicators::{indicator_key, IndicatorCategory, IndicatorResult};

        let store = SessionDataStore::new();
        let base = Interval::parse("1m").unwrap();
        store.register_symbol("AAPL", base, ProvisioningMetadata::full(ProvisioningSource::Config));
        let key = indicator_key("sma", Some(20), base);
        store
            .with_symbol_mut("AAPL", |data| {
                data.indicators.insert(key.clone(), IndicatorData::new("sma", IndicatorCategory::Trend, base, Some(20)));
            })
            .unwrap();

        // Inactive session: every accessor reads as absent.
        assert_eq!(store.get_indicator_value("AAPL", &key, None), None);
        assert!(!store.is_indicator_ready("AAPL", &key));
        assert!(store.get_all_indicators("AAPL", None).is_empty());

        store.activate_session(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        // Registered but not yet warmed up.
        assert_eq!(store.get_indicator_value("AAPL", &key, None), None);
        assert!(!store.is_indicator_ready("AAPL", &key));
        assert_eq!(store.get_all_indicators("AAPL", None).len(), 1);
        assert!(store.get_all_indicators("AAPL", Some(IndicatorCategory::Momentum)).is_empty());

        store
            .with_symbol_mut("AAPL", |data| {
                data.indicators.get_mut(&key).unwrap().apply(
                    IndicatorResult::scalar(101.5, true),
                    NaiveDateTime::parse_from_str("2024-01-02 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap(),
                );
            })
            .unwrap();

        assert_eq!(store.get_indicator_value("AAPL", &key, None), Some(101.5));
        assert!(store.is_indicator_ready("AAPL", &key));
        assert_eq!(store.get_all_indicators("AAPL", Some(IndicatorCategory::Trend)).len(), 1);
    }
}
