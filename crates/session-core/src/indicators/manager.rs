//! Per-bar indicator refresh: the manager half of spec.md §4.4. The
//! registry resolves `name -> Indicator`; this module is what calls it on
//! bar arrival and warmup, and writes the result (plus any carry state)
//! back into the store. Self-describing like the derived-bar generator:
//! it discovers which indicators need recomputing by reading the keys
//! already registered on the symbol rather than a push-configured list.

use session_data::{Bar, Interval};

use crate::indicators::{IndicatorConfig, IndicatorRegistry};
use crate::store::{DataStoreError, SessionDataStore};

/// Recomputes every indicator registered on `interval` for `symbol` from
/// the bars currently in the store. Called after a new bar of that
/// interval lands, whether it's the base interval or a freshly-produced
/// derived one.
pub fn refresh_indicators(
    store: &SessionDataStore,
    registry: &IndicatorRegistry,
    symbol: &str,
    interval: Interval,
) -> Result<(), DataStoreError> {
    let data = store
        .get_symbol_data(symbol, true)
        .ok_or_else(|| DataStoreError::UnknownSymbol(symbol.to_string()))?;

    let bars = match data.bars.get(&interval) {
        Some(series) if !series.bars.is_empty() => series.bars.clone(),
        _ => return Ok(()),
    };
    refresh_from(store, registry, symbol, interval, &bars, true)
}

/// Warms up one symbol's indicators on `interval` from bars the caller
/// supplies (the columnar store that would source them is out of scope
/// here, per spec.md §6) so each is already valid before the session's
/// first streamed bar, per the `period * warmup_multiplier` rule baked
/// into [`crate::requirement::analyze`]'s lookback.
pub fn warmup(
    store: &SessionDataStore,
    registry: &IndicatorRegistry,
    symbol: &str,
    interval: Interval,
    historical_bars: &[Bar],
) -> Result<(), DataStoreError> {
    if historical_bars.is_empty() {
        return Ok(());
    }
    refresh_from(store, registry, symbol, interval, historical_bars, false)
}

/// `chain_previous` threads each indicator's last stored result (its
/// carry state) into the next call, which is what gives stateful
/// indicators (the EMA family, OBV, VWAP) their O(1) incremental update;
/// warmup instead recomputes fresh over the whole replay window.
fn refresh_from(
    store: &SessionDataStore,
    registry: &IndicatorRegistry,
    symbol: &str,
    interval: Interval,
    bars: &[Bar],
    chain_previous: bool,
) -> Result<(), DataStoreError> {
    let at = bars.last().expect("caller checked non-empty").timestamp;
    let data = store
        .get_symbol_data(symbol, true)
        .ok_or_else(|| DataStoreError::UnknownSymbol(symbol.to_string()))?;

    let keys: Vec<String> = data
        .indicators
        .iter()
        .filter(|(_, ind)| ind.interval == interval)
        .map(|(key, _)| key.clone())
        .collect();

    for key in keys {
        let existing = &data.indicators[&key];
        let Some(calc) = registry.get(&existing.name) else { continue };
        let config = IndicatorConfig::new(existing.period.unwrap_or(0));
        let previous = if chain_previous { existing.result.as_ref() } else { None };
        let result = calc.calculate(bars, &config, symbol, previous);
        store.with_symbol_mut(symbol, |s| {
            if let Some(ind) = s.indicators.get_mut(&key) {
                ind.apply(result, at);
            }
        })?;
    }
    Ok(())
}
