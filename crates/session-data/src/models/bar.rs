use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single OHLCV bar. Timestamps here are always in the exchange
/// timezone; the file store converts to/from UTC at the storage boundary.
/// The interval a `Bar` belongs to is contextual — it is the key of the
/// `BarIntervalData` map that holds it, not a field on the bar itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn bar_calculations() {
        let bar = Bar::new(ts("2024-01-02 09:30:00"), 100.0, 102.0, 99.0, 101.5, 12_000);
        assert_eq!(bar.midpoint(), 100.5);
        assert!((bar.range() - 3.0).abs() < 1e-9);
        assert!(bar.is_bullish());
        assert!(!bar.is_bearish());
    }

    #[test]
    fn bearish_bar() {
        let bar = Bar::new(ts("2024-01-02 09:31:00"), 101.0, 101.5, 99.0, 99.5, 500);
        assert!(bar.is_bearish());
        assert!(!bar.is_bullish());
    }
}
