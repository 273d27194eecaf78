//! Derived-bar generator: self-describing, like the quality engine. It
//! never holds a rule table of "which intervals to derive for which
//! symbol" — it reads that straight off the store's `derived`/`base`
//! flags (`BarIntervalData`, set once at provisioning time) and recomputes
//! whichever derived series are due whenever a base bar lands.

use session_data::{aggregate_bars, AggregationOptions, Interval, TimeService};
use thiserror::Error;

use crate::store::{DataStoreError, SessionDataStore};

#[derive(Debug, Error)]
pub enum DerivedGenError {
    #[error(transparent)]
    Store(#[from] DataStoreError),
    #[error("aggregation failed for '{interval}': {source}")]
    Aggregation {
        interval: String,
        #[source]
        source: session_data::aggregator::AggregationError,
    },
}

/// Recomputes every derived interval for `symbol` from its base bars and
/// appends whatever is new. Full recomputation (rather than an
/// incremental fold) trades some wasted work for simplicity: aggregation
/// is pure and cheap relative to I/O, and this keeps the generator
/// stateless between calls.
pub fn refresh_derived_bars(
    store: &SessionDataStore,
    symbol: &str,
    calendar: Option<&dyn TimeService>,
) -> Result<Vec<Interval>, DerivedGenError> {
    let Some(data) = store.get_symbol_data(symbol, true) else {
        return Ok(Vec::new());
    };
    let base_interval = data.base_interval;
    let Some(base_data) = data.bars.get(&base_interval) else {
        return Ok(Vec::new());
    };

    let mut touched = Vec::new();
    for interval in data.derived_intervals() {
        // `require_complete` so a still-filling chunk never gets appended
        // as a one-bar fold and then frozen there — only closed windows
        // are emitted, so the append-tail below never rewrites a bar.
        let (derived_bars, _) = aggregate_bars(
            &base_data.bars,
            base_interval,
            interval,
            calendar,
            &AggregationOptions { require_complete: true, check_continuity: false },
        )
        .map_err(|source| DerivedGenError::Aggregation {
            interval: interval.as_token(),
            source,
        })?;

        let already = data.bars.get(&interval).map(|d| d.bars.len()).unwrap_or(0);
        if derived_bars.len() > already {
            let fresh = derived_bars[already..].to_vec();
            store.append_derived_bars(symbol, interval, fresh)?;
            touched.push(interval);
        }
    }
    Ok(touched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ProvisioningMetadata;
    use crate::store::ProvisioningSource;
    use chrono::NaiveDateTime;
    use session_data::Bar;

    fn bar(ts: &str, close: f64) -> Bar {
        let timestamp = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap();
        Bar::new(timestamp, close, close, close, close, 100)
    }

    #[test]
    fn derives_new_bars_and_reports_which_intervals_moved() {
        let store = SessionDataStore::new();
        let m1 = Interval::parse("1m").unwrap();
        let m5 = Interval::parse("5m").unwrap();
        store.register_symbol("AAPL", m1, ProvisioningMetadata::full(ProvisioningSource::Config));
        store.register_derived_interval("AAPL", m5, m1).unwrap();

        for i in 0..5 {
            let ts = format!("2024-01-02 09:{:02}:00", 30 + i);
            store.append_base_bar("AAPL", bar(&ts, 100.0 + i as f64)).unwrap();
        }

        let touched = refresh_derived_bars(&store, "AAPL", None).unwrap();
        assert_eq!(touched, vec![m5]);

        let data = store.get_symbol_data("AAPL", true).unwrap();
        assert_eq!(data.bars[&m5].bars.len(), 1);

        // No new base bars -> nothing touched on the second pass.
        let touched_again = refresh_derived_bars(&store, "AAPL", None).unwrap();
        assert!(touched_again.is_empty());
    }

    /// One base bar at a time, refreshing after each — the shape the
    /// streaming coordinator actually drives. The 5m bar must stay absent
    /// until its chunk is complete, then match the aggregator's fold over
    /// all five source bars, not just the first.
    #[test]
    fn refreshing_after_every_single_bar_never_freezes_a_partial_chunk() {
        let store = SessionDataStore::new();
        let m1 = Interval::parse("1m").unwrap();
        let m5 = Interval::parse("5m").unwrap();
        store.register_symbol("AAPL", m1, ProvisioningMetadata::full(ProvisioningSource::Config));
        store.register_derived_interval("AAPL", m5, m1).unwrap();

        for i in 0..4 {
            let ts = format!("2024-01-02 09:{:02}:00", 30 + i);
            store.append_base_bar("AAPL", bar(&ts, 100.0 + i as f64)).unwrap();
            let touched = refresh_derived_bars(&store, "AAPL", None).unwrap();
            assert!(touched.is_empty(), "chunk isn't complete yet at bar {i}");
        }

        store.append_base_bar("AAPL", bar("2024-01-02 09:34:00", 104.0)).unwrap();
        let touched = refresh_derived_bars(&store, "AAPL", None).unwrap();
        assert_eq!(touched, vec![m5]);

        let data = store.get_symbol_data("AAPL", true).unwrap();
        assert_eq!(data.bars[&m5].bars.len(), 1);
        let derived = &data.bars[&m5].bars[0];
        assert_eq!(derived.open, 100.0);
        assert_eq!(derived.close, 104.0);
        assert_eq!(derived.volume, 500);
    }
}
