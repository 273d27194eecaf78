//! The indicator contract: one pure signature every indicator implements,
//! generalized from the teacher's stateful `Indicator::update()` trait
//! (`indicators/indicator_trait.rs`) into the explicit
//! `calculate(bars, config, symbol, previous) -> IndicatorResult` form
//! required here. Carry state takes the place of `&mut self` — stateful
//! indicators (the EMA family, OBV, VWAP) thread it through `previous` and
//! `IndicatorResult::carry` for O(1) incremental update; the rest just
//! recompute over the trailing window they need.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use session_data::{Bar, Interval};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorCategory {
    Trend,
    Momentum,
    Volatility,
    Volume,
    SupportResistance,
    Historical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndicatorValue {
    Scalar(f64),
    Fields(BTreeMap<String, f64>),
}

impl IndicatorValue {
    /// `get_indicator_value`'s field-resolution rule: a scalar answers a
    /// fieldless query, a multi-valued result answers only a named field.
    pub fn field(&self, field: Option<&str>) -> Option<f64> {
        match (self, field) {
            (IndicatorValue::Scalar(v), None) => Some(*v),
            (IndicatorValue::Fields(map), Some(name)) => map.get(name).copied(),
            _ => None,
        }
    }
}

/// Extra parameters beyond `period` (MACD's fast/slow/signal, Bollinger's
/// std-dev multiplier, Keltner's ATR multiplier, ...). Keyed by parameter
/// name so one struct covers every indicator without per-indicator configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub period: usize,
    pub params: BTreeMap<String, f64>,
}

impl IndicatorConfig {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn param(&self, name: &str, default: f64) -> f64 {
        self.params.get(name).copied().unwrap_or(default)
    }
}

/// Opaque incremental state threaded between successive `calculate` calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarryState(pub BTreeMap<String, f64>);

impl CarryState {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.0.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub value: IndicatorValue,
    pub valid: bool,
    pub carry: Option<CarryState>,
}

impl IndicatorResult {
    pub fn scalar(value: f64, valid: bool) -> Self {
        Self {
            value: IndicatorValue::Scalar(value),
            valid,
            carry: None,
        }
    }

    pub fn not_ready() -> Self {
        Self {
            value: IndicatorValue::Scalar(f64::NAN),
            valid: false,
            carry: None,
        }
    }

    pub fn fields(fields: BTreeMap<String, f64>, valid: bool) -> Self {
        Self {
            value: IndicatorValue::Fields(fields),
            valid,
            carry: None,
        }
    }

    pub fn with_carry(mut self, carry: CarryState) -> Self {
        self.carry = Some(carry);
        self
    }
}

/// Every technical indicator implements this. `bars` is the trailing window
/// available for `interval`, oldest first, ending at the bar that triggered
/// this call; `symbol` is informational (logging, key construction by the
/// caller) and never changes the arithmetic.
pub trait Indicator: Send + Sync {
    fn name(&self) -> &'static str;
    fn category(&self) -> IndicatorCategory;

    fn calculate(
        &self,
        bars: &[Bar],
        config: &IndicatorConfig,
        symbol: &str,
        previous: Option<&IndicatorResult>,
    ) -> IndicatorResult;

    /// Bars of historical window needed to warm up before session start —
    /// `period * warmup_multiplier` per spec.md §4.4, rounded up.
    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        ((config.period.max(1) as f64) * warmup_multiplier).ceil() as usize
    }

    /// Whether `period` is part of this indicator's identity — false for
    /// the session-cumulative indicators (VWAP, TWAP) that ignore it
    /// entirely, so their store key is `{name}_{interval}` rather than
    /// `{name}_{period}_{interval}` (spec.md §3).
    fn uses_period(&self) -> bool {
        true
    }
}

pub fn indicator_key(name: &str, period: Option<usize>, interval: Interval) -> String {
    match period {
        Some(p) => format!("{name}_{p}_{}", interval.as_token()),
        None => format!("{name}_{}", interval.as_token()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_with_and_without_period() {
        let m5 = Interval::parse("5m").unwrap();
        assert_eq!(indicator_key("sma", Some(20), m5), "sma_20_5m");
        let m1 = Interval::parse("1m").unwrap();
        assert_eq!(indicator_key("vwap", None, m1), "vwap_1m");
    }

    #[test]
    fn scalar_field_lookup() {
        let v = IndicatorValue::Scalar(1.5);
        assert_eq!(v.field(None), Some(1.5));
        assert_eq!(v.field(Some("x")), None);
    }

    #[test]
    fn fields_value_lookup() {
        let mut map = BTreeMap::new();
        map.insert("upper".to_string(), 1.0);
        map.insert("lower".to_string(), 0.5);
        let v = IndicatorValue::Fields(map);
        assert_eq!(v.field(Some("upper")), Some(1.0));
        assert_eq!(v.field(None), None);
    }
}
