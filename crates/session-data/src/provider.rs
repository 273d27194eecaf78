//! Narrow contract for a live market-data feed. No concrete network client
//! lives here — session-core drives retries against whatever implements
//! this trait, and tests use a channel-backed fake.

use thiserror::Error;

use crate::models::Bar;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("not subscribed to '{0}'")]
    NotSubscribed(String),

    #[error("retry budget exhausted for '{symbol}' after {attempts} attempts")]
    RetriesExhausted { symbol: String, attempts: u32 },

    #[error("transport error: {0}")]
    Transport(String),
}

/// A single subscription request: base interval only, matching spec.md's
/// rule that live feeds are always subscribed at the base interval and
/// everything else is derived downstream.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub symbol: String,
    pub base_interval: crate::interval::Interval,
}

pub trait LiveDataProvider: Send + Sync {
    fn subscribe(&self, subscription: Subscription) -> Result<(), ProviderError>;
    fn unsubscribe(&self, symbol: &str) -> Result<(), ProviderError>;

    /// Pulls whatever bars have arrived since the last call. Returns an
    /// empty vec, not an error, when nothing is new.
    fn poll(&self, symbol: &str) -> Result<Vec<Bar>, ProviderError>;

    /// Bounded retry used by the quality engine's live-mode gap backfill.
    /// Implementors should not retry internally — the caller owns the
    /// retry loop and its `max_retries`/`retry_interval` policy.
    fn request_backfill(&self, symbol: &str, missing: &[chrono::NaiveDateTime]) -> Result<Vec<Bar>, ProviderError>;
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory provider used by integration tests: pre-loaded bars keyed
    /// by symbol, served FIFO on each `poll`.
    #[derive(Default)]
    pub struct FakeProvider {
        queues: Mutex<HashMap<String, Vec<Bar>>>,
        subscriptions: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn enqueue(&self, symbol: &str, bars: Vec<Bar>) {
            self.queues
                .lock()
                .entry(symbol.to_string())
                .or_default()
                .extend(bars);
        }
    }

    impl LiveDataProvider for FakeProvider {
        fn subscribe(&self, subscription: Subscription) -> Result<(), ProviderError> {
            self.subscriptions.lock().push(subscription.symbol);
            Ok(())
        }

        fn unsubscribe(&self, symbol: &str) -> Result<(), ProviderError> {
            self.subscriptions.lock().retain(|s| s != symbol);
            Ok(())
        }

        fn poll(&self, symbol: &str) -> Result<Vec<Bar>, ProviderError> {
            Ok(self
                .queues
                .lock()
                .get_mut(symbol)
                .map(std::mem::take)
                .unwrap_or_default())
        }

        fn request_backfill(
            &self,
            _symbol: &str,
            _missing: &[chrono::NaiveDateTime],
        ) -> Result<Vec<Bar>, ProviderError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn fake_provider_round_trips_queued_bars() {
        let provider = FakeProvider::new();
        let interval = crate::interval::Interval::parse("1m").unwrap();
        provider
            .subscribe(Subscription {
                symbol: "AAPL".into(),
                base_interval: interval,
            })
            .unwrap();

        let ts = chrono::NaiveDateTime::parse_from_str("2024-01-02 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        provider.enqueue("AAPL", vec![Bar::new(ts, 1.0, 1.0, 1.0, 1.0, 10)]);

        let polled = provider.poll("AAPL").unwrap();
        assert_eq!(polled.len(), 1);
        assert!(provider.poll("AAPL").unwrap().is_empty());
    }
}
