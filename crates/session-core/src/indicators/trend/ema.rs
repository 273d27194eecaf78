use std::collections::BTreeMap;

use session_data::Bar;

use crate::indicators::{CarryState, Indicator, IndicatorCategory, IndicatorConfig, IndicatorResult};

/// One exponential-average stage: seeds with a plain SMA over `period`
/// inputs, then updates incrementally. `prefix` namespaces this stage's
/// carry keys so DEMA/TEMA can chain several stages in one `CarryState`.
struct EmaStage<'a> {
    prefix: &'a str,
}

impl<'a> EmaStage<'a> {
    fn count_key(&self) -> String {
        format!("{}_count", self.prefix)
    }
    fn sum_key(&self) -> String {
        format!("{}_sum", self.prefix)
    }
    fn value_key(&self) -> String {
        format!("{}_value", self.prefix)
    }

    /// Feeds one more `input` through this stage. Returns `(value, ready)`;
    /// `value` is meaningless unless `ready`. Writes the updated state into
    /// `out`.
    fn step(&self, period: usize, carry: &CarryState, input: f64, out: &mut BTreeMap<String, f64>) -> (f64, bool) {
        let k = 2.0 / (period as f64 + 1.0);
        if let Some(prev) = carry.get(&self.value_key()) {
            let value = prev + k * (input - prev);
            out.insert(self.value_key(), value);
            (value, true)
        } else {
            let count = carry.get(&self.count_key()).unwrap_or(0.0) + 1.0;
            let sum = carry.get(&self.sum_key()).unwrap_or(0.0) + input;
            if count as usize >= period {
                let seed = sum / period as f64;
                out.insert(self.value_key(), seed);
                (seed, true)
            } else {
                out.insert(self.count_key(), count);
                out.insert(self.sum_key(), sum);
                (f64::NAN, false)
            }
        }
    }
}

fn last_close(bars: &[Bar]) -> Option<f64> {
    bars.last().map(|b| b.close)
}

fn carry_of(previous: Option<&IndicatorResult>) -> CarryState {
    previous.and_then(|p| p.carry.clone()).unwrap_or_default()
}

/// Exponential moving average, period `config.period`.
#[derive(Debug, Default)]
pub struct Ema;

impl Indicator for Ema {
    fn name(&self) -> &'static str {
        "ema"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn calculate(
        &self,
        bars: &[Bar],
        config: &IndicatorConfig,
        _symbol: &str,
        previous: Option<&IndicatorResult>,
    ) -> IndicatorResult {
        let Some(close) = last_close(bars) else {
            return IndicatorResult::not_ready();
        };
        let carry = carry_of(previous);
        let mut patch = BTreeMap::new();
        let (value, ready) = EmaStage { prefix: "e1" }.step(config.period, &carry, close, &mut patch);

        let mut next = carry;
        next.0.extend(patch);
        if ready {
            IndicatorResult::scalar(value, true).with_carry(next)
        } else {
            IndicatorResult::not_ready().with_carry(next)
        }
    }
}

/// Double exponential moving average: `2*EMA1 - EMA(EMA1)`, reduces the lag
/// of a plain EMA by subtracting its own smoothed error.
#[derive(Debug, Default)]
pub struct Dema;

impl Indicator for Dema {
    fn name(&self) -> &'static str {
        "dema"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn calculate(
        &self,
        bars: &[Bar],
        config: &IndicatorConfig,
        _symbol: &str,
        previous: Option<&IndicatorResult>,
    ) -> IndicatorResult {
        let Some(close) = last_close(bars) else {
            return IndicatorResult::not_ready();
        };
        let carry = carry_of(previous);
        let mut patch = BTreeMap::new();
        let (e1, e1_ready) = EmaStage { prefix: "e1" }.step(config.period, &carry, close, &mut patch);
        if !e1_ready {
            let mut next = carry;
            next.0.extend(patch);
            return IndicatorResult::not_ready().with_carry(next);
        }
        let (e2, e2_ready) = EmaStage { prefix: "e2" }.step(config.period, &carry, e1, &mut patch);

        let mut next = carry;
        next.0.extend(patch);
        if e2_ready {
            IndicatorResult::scalar(2.0 * e1 - e2, true).with_carry(next)
        } else {
            IndicatorResult::not_ready().with_carry(next)
        }
    }

    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        ((config.period.max(1) * 2) as f64 * warmup_multiplier).ceil() as usize
    }
}

/// Triple exponential moving average: `3*EMA1 - 3*EMA2 + EMA3`.
#[derive(Debug, Default)]
pub struct Tema;

impl Indicator for Tema {
    fn name(&self) -> &'static str {
        "tema"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn calculate(
        &self,
        bars: &[Bar],
        config: &IndicatorConfig,
        _symbol: &str,
        previous: Option<&IndicatorResult>,
    ) -> IndicatorResult {
        let Some(close) = last_close(bars) else {
            return IndicatorResult::not_ready();
        };
        let carry = carry_of(previous);
        let mut patch = BTreeMap::new();
        let (e1, e1_ready) = EmaStage { prefix: "e1" }.step(config.period, &carry, close, &mut patch);
        if !e1_ready {
            let mut next = carry;
            next.0.extend(patch);
            return IndicatorResult::not_ready().with_carry(next);
        }
        let (e2, e2_ready) = EmaStage { prefix: "e2" }.step(config.period, &carry, e1, &mut patch);
        if !e2_ready {
            let mut next = carry;
            next.0.extend(patch);
            return IndicatorResult::not_ready().with_carry(next);
        }
        let (e3, e3_ready) = EmaStage { prefix: "e3" }.step(config.period, &carry, e2, &mut patch);

        let mut next = carry;
        next.0.extend(patch);
        if e3_ready {
            IndicatorResult::scalar(3.0 * e1 - 3.0 * e2 + e3, true).with_carry(next)
        } else {
            IndicatorResult::not_ready().with_carry(next)
        }
    }

    fn warmup_bars(&self, config: &IndicatorConfig, warmup_multiplier: f64) -> usize {
        ((config.period.max(1) * 3) as f64 * warmup_multiplier).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn bar(close: f64) -> Bar {
        let ts = NaiveDateTime::parse_from_str("2024-01-02 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Bar::new(ts, close, close, close, close, 100)
    }

    #[test]
    fn ema_seeds_with_sma_then_updates_incrementally() {
        let config = IndicatorConfig::new(3);
        let closes = [1.0, 2.0, 3.0, 10.0];
        let mut previous: Option<IndicatorResult> = None;
        let mut history = Vec::new();
        let mut last_valid = None;
        for c in closes {
            history.push(bar(c));
            let result = Ema.calculate(&history, &config, "AAPL", previous.as_ref());
            if result.valid {
                last_valid = result.value.field(None);
            }
            previous = Some(result);
        }
        // seed = avg(1,2,3) = 2.0; k = 0.5; next = 2 + 0.5*(10-2) = 6.0
        assert_eq!(last_valid, Some(6.0));
    }

    #[test]
    fn dema_not_ready_before_chained_warmup() {
        let config = IndicatorConfig::new(2);
        let bars = vec![bar(1.0)];
        let result = Dema.calculate(&bars, &config, "AAPL", None);
        assert!(!result.valid);
    }
}
