use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single trade print. Optional — the core engine only requires a base
/// bar stream; ticks feed the `1s` TIME_WINDOW aggregation mode when present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub size: i64,
}

impl Tick {
    pub fn new(timestamp: NaiveDateTime, price: f64, size: i64) -> Self {
        Self {
            timestamp,
            price,
            size,
        }
    }
}

/// A top-of-book quote. Optional on input; in backtest mode the engine may
/// synthesize a zero-spread quote from the latest bar close (see
/// `SPEC_FULL.md` §4).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub timestamp: NaiveDateTime,
    pub bid: f64,
    pub ask: f64,
    pub bid_size: Option<i64>,
    pub ask_size: Option<i64>,
}

impl Quote {
    pub fn new(timestamp: NaiveDateTime, bid: f64, ask: f64) -> Self {
        Self {
            timestamp,
            bid,
            ask,
            bid_size: None,
            ask_size: None,
        }
    }

    pub fn with_sizes(mut self, bid_size: i64, ask_size: i64) -> Self {
        self.bid_size = Some(bid_size);
        self.ask_size = Some(ask_size);
        self
    }

    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// A zero-spread quote synthesized from a bar's close price, used in
    /// backtest mode when no real quote stream is configured.
    pub fn synthetic_from_close(timestamp: NaiveDateTime, close: f64) -> Self {
        Self {
            timestamp,
            bid: close,
            ask: close,
            bid_size: None,
            ask_size: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn quote_mid_and_sizes() {
        let q = Quote::new(ts("2024-01-02 09:30:00"), 1.0921, 1.0923).with_sizes(100, 200);
        assert!((q.mid() - 1.0922).abs() < 1e-9);
        assert_eq!(q.bid_size, Some(100));
    }

    #[test]
    fn synthetic_quote_is_zero_spread() {
        let q = Quote::synthetic_from_close(ts("2024-01-02 09:30:00"), 101.25);
        assert_eq!(q.bid, q.ask);
    }
}
