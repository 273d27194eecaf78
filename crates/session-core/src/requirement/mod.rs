//! Requirement analyzer: turns a symbol's declarative wish list —
//! intervals it wants streamed, indicators it wants computed — into the
//! single base interval the store should ingest, the derivation plan for
//! everything else, and how much historical warmup to backfill before the
//! session opens.

use session_data::{by_duration, can_derive, derivation_source_priority, Interval};
use thiserror::Error;

use crate::indicators::IndicatorRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRequest {
    pub name: String,
    pub interval: Interval,
    pub period: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequirementError {
    #[error("no intervals requested")]
    Empty,
    #[error("'{interval}' has no base interval candidate it can derive from")]
    Unreachable { interval: String },
    #[error("unknown indicator '{0}'")]
    UnknownIndicator(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequirementAnalysis {
    pub base_interval: Interval,
    pub stream_intervals: Vec<Interval>,
    pub derived_intervals: Vec<Interval>,
    pub historical_lookback_bars: usize,
    pub indicators: Vec<IndicatorRequest>,
}

/// Step 1: every requested interval, plus the implicit interval each
/// indicator needs (an indicator asked for on an interval nobody else
/// requested still needs its own bar series) — that combined set is what
/// steps 2-4 actually work over. Every interval in it that is itself a
/// base interval is a candidate session base; every other one contributes
/// its *most preferred* derivation source as a candidate too. Step 2: the
/// session base is the shortest-duration candidate, since a shorter base
/// can always derive a longer target but never the reverse. Step 3: every
/// interval in the combined set must actually be derivable from that
/// chosen base (or be it). Step 4: lookback is the longest warmup any
/// requested indicator needs.
pub fn analyze(
    intervals: &[Interval],
    indicators: &[IndicatorRequest],
    registry: &IndicatorRegistry,
    warmup_multiplier: f64,
) -> Result<RequirementAnalysis, RequirementError> {
    let mut effective_intervals: Vec<Interval> = intervals.to_vec();
    for request in indicators {
        if !effective_intervals.contains(&request.interval) {
            effective_intervals.push(request.interval);
        }
    }

    if effective_intervals.is_empty() {
        return Err(RequirementError::Empty);
    }

    let mut candidates = Vec::new();
    for &interval in &effective_intervals {
        if interval.is_base() {
            candidates.push(interval);
        } else {
            match derivation_source_priority(interval).first() {
                Some(&source) => candidates.push(source),
                None => {
                    return Err(RequirementError::Unreachable {
                        interval: interval.as_token(),
                    })
                }
            }
        }
    }
    by_duration(&mut candidates);
    let base_interval = candidates[0];

    for &interval in &effective_intervals {
        if interval != base_interval {
            let (ok, reason) = can_derive(base_interval, interval);
            if !ok {
                return Err(RequirementError::Unreachable {
                    interval: reason.unwrap_or_else(|| interval.as_token()),
                });
            }
        }
    }

    let derived_intervals: Vec<Interval> = effective_intervals.iter().copied().filter(|i| *i != base_interval).collect();

    let mut historical_lookback_bars = 0usize;
    for request in indicators {
        let indicator = registry
            .get(&request.name)
            .ok_or_else(|| RequirementError::UnknownIndicator(request.name.clone()))?;
        let config = crate::indicators::IndicatorConfig::new(request.period);
        historical_lookback_bars = historical_lookback_bars.max(indicator.warmup_bars(&config, warmup_multiplier));
    }

    Ok(RequirementAnalysis {
        base_interval,
        stream_intervals: effective_intervals,
        derived_intervals,
        historical_lookback_bars,
        indicators: indicators.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_shortest_derivable_base() {
        let registry = IndicatorRegistry::with_defaults();
        let m1 = Interval::parse("1m").unwrap();
        let m5 = Interval::parse("5m").unwrap();
        let analysis = analyze(&[m1, m5], &[], &registry, 2.0).unwrap();
        assert_eq!(analysis.base_interval, m1);
        assert_eq!(analysis.derived_intervals, vec![m5]);
    }

    #[test]
    fn rejects_unknown_indicators() {
        let registry = IndicatorRegistry::with_defaults();
        let m1 = Interval::parse("1m").unwrap();
        let request = IndicatorRequest { name: "not_real".to_string(), interval: m1, period: 14 };
        let err = analyze(&[m1], &[request], &registry, 2.0).unwrap_err();
        assert_eq!(err, RequirementError::UnknownIndicator("not_real".to_string()));
    }

    #[test]
    fn lookback_tracks_the_hungriest_indicator() {
        let registry = IndicatorRegistry::with_defaults();
        let m1 = Interval::parse("1m").unwrap();
        let rsi = IndicatorRequest { name: "rsi".to_string(), interval: m1, period: 14 };
        let sma = IndicatorRequest { name: "sma".to_string(), interval: m1, period: 50 };
        let analysis = analyze(&[m1], &[rsi, sma], &registry, 2.0).unwrap();
        assert_eq!(analysis.historical_lookback_bars, 100);
    }

    #[test]
    fn an_indicator_interval_absent_from_the_requested_list_is_folded_in() {
        let registry = IndicatorRegistry::with_defaults();
        let m1 = Interval::parse("1m").unwrap();
        let m5 = Interval::parse("5m").unwrap();
        let sma_5m = IndicatorRequest { name: "sma".to_string(), interval: m5, period: 20 };
        // Only 1m is requested directly; the indicator's 5m interval must
        // still end up derived, or nothing would ever feed it bars.
        let analysis = analyze(&[m1], &[sma_5m], &registry, 2.0).unwrap();
        assert_eq!(analysis.base_interval, m1);
        assert_eq!(analysis.derived_intervals, vec![m5]);
    }
}
