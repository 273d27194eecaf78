//! Pure bar aggregation: folds a source bar (or tick) sequence into a
//! target sequence. Stateless — callers own the symbol/interval bookkeeping;
//! this module only knows how to fold and group.

use chrono::{Datelike, Duration, NaiveDateTime};

use crate::calendar::TimeService;
use crate::interval::{Interval, IntervalUnit};
use crate::models::{Bar, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    TimeWindow,
    FixedChunk,
    Calendar,
}

/// Picks the mode per spec.md's table. Cross-unit transitions into a day or
/// week target always go through the calendar; same-unit ladders (1s->Ns,
/// 1m->Nm) are fixed chunks.
pub fn select_mode(source: Interval, target: Interval) -> AggregationMode {
    use IntervalUnit::*;
    match (source.unit, target.unit) {
        (Day, Week) => AggregationMode::Calendar,
        (_, Day) if source.unit != Day || target.value > 1 => AggregationMode::Calendar,
        (a, b) if a == b => AggregationMode::FixedChunk,
        _ => AggregationMode::FixedChunk,
    }
}

#[derive(Debug, Clone, Default)]
pub struct AggregationOptions {
    pub require_complete: bool,
    pub check_continuity: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AggregationDiagnostics {
    pub groups_seen: usize,
    pub incomplete_dropped: usize,
    pub gaps: Vec<(NaiveDateTime, NaiveDateTime)>,
}

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("CALENDAR mode requires a time service")]
    MissingTimeService,
    #[error("'{0}' is not a valid source->target aggregation: {1}")]
    InvalidTransition(String, String),
}

fn fold(bars: &[Bar]) -> Bar {
    let first = bars.first().expect("fold called with empty group");
    let last = bars.last().expect("fold called with empty group");
    let high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let volume = bars.iter().map(|b| b.volume).sum();
    Bar::new(first.timestamp, first.open, high, low, last.close, volume)
}

/// TIME_WINDOW: groups ticks by timestamp truncated to the unit (1s here).
/// Any non-empty group is complete — a single print makes a valid bar.
pub fn aggregate_ticks_to_seconds(ticks: &[Tick]) -> Vec<Bar> {
    let mut groups: Vec<(NaiveDateTime, Vec<&Tick>)> = Vec::new();
    for tick in ticks {
        let bucket = tick.timestamp - Duration::nanoseconds(tick.timestamp.and_utc().timestamp_subsec_nanos() as i64);
        match groups.last_mut() {
            Some((ts, group)) if *ts == bucket => group.push(tick),
            _ => groups.push((bucket, vec![tick])),
        }
    }
    groups
        .into_iter()
        .map(|(ts, group)| {
            let open = group.first().unwrap().price;
            let close = group.last().unwrap().price;
            let high = group.iter().map(|t| t.price).fold(f64::MIN, f64::max);
            let low = group.iter().map(|t| t.price).fold(f64::MAX, f64::min);
            let volume = group.iter().map(|t| t.size).sum();
            Bar::new(ts, open, high, low, close, volume)
        })
        .collect()
}

/// FIXED_CHUNK / CALENDAR bar->bar aggregation. `ratio` is only consulted
/// for FIXED_CHUNK (how many source bars make one target bar); CALENDAR
/// groups by trading date or ISO week instead.
pub fn aggregate_bars(
    source_bars: &[Bar],
    source: Interval,
    target: Interval,
    calendar: Option<&dyn TimeService>,
    options: &AggregationOptions,
) -> Result<(Vec<Bar>, AggregationDiagnostics), AggregationError> {
    let (valid, reason) = crate::interval::can_derive(source, target);
    if !valid {
        return Err(AggregationError::InvalidTransition(
            source.as_token(),
            reason.unwrap_or_default(),
        ));
    }

    let mode = select_mode(source, target);
    let mut diagnostics = AggregationDiagnostics::default();

    match mode {
        AggregationMode::TimeWindow => {
            // Bars never aggregate via TIME_WINDOW in this entry point;
            // that path is `aggregate_ticks_to_seconds`.
            Ok((Vec::new(), diagnostics))
        }
        AggregationMode::FixedChunk => {
            let ratio = (target.nominal_seconds() / source.nominal_seconds()) as usize;
            if ratio == 0 {
                return Err(AggregationError::InvalidTransition(
                    source.as_token(),
                    target.as_token(),
                ));
            }
            let mut out = Vec::new();
            for chunk in source_bars.chunks(ratio) {
                diagnostics.groups_seen += 1;
                let complete = chunk.len() == ratio
                    && (!options.check_continuity || is_consecutive(chunk, source));
                if complete {
                    out.push(fold(chunk));
                } else {
                    diagnostics.incomplete_dropped += 1;
                    if let (Some(first), Some(last)) = (chunk.first(), chunk.last()) {
                        diagnostics.gaps.push((first.timestamp, last.timestamp));
                    }
                    if !options.require_complete {
                        out.push(fold(chunk));
                    }
                }
            }
            Ok((out, diagnostics))
        }
        AggregationMode::Calendar => {
            let calendar = calendar.ok_or(AggregationError::MissingTimeService)?;
            let mut out = Vec::new();
            if target.unit == IntervalUnit::Week {
                for group in group_by_iso_week(source_bars) {
                    diagnostics.groups_seen += 1;
                    out.push(fold(&group));
                }
            } else {
                for group in group_by_trading_date(source_bars, calendar) {
                    diagnostics.groups_seen += 1;
                    out.push(fold(&group));
                }
            }
            Ok((out, diagnostics))
        }
    }
}

fn is_consecutive(bars: &[Bar], source: Interval) -> bool {
    let step = Duration::seconds(source.nominal_seconds());
    bars.windows(2)
        .all(|w| w[1].timestamp - w[0].timestamp == step)
}

fn group_by_trading_date(bars: &[Bar], _calendar: &dyn TimeService) -> Vec<Vec<Bar>> {
    group_by_key(bars, |b| b.timestamp.date())
}

fn group_by_iso_week(bars: &[Bar]) -> Vec<Vec<Bar>> {
    group_by_key(bars, |b| {
        let iso = b.timestamp.date().iso_week();
        (iso.year(), iso.week())
    })
}

fn group_by_key<K: PartialEq + Copy>(bars: &[Bar], key_fn: impl Fn(&Bar) -> K) -> Vec<Vec<Bar>> {
    let mut groups: Vec<(K, Vec<Bar>)> = Vec::new();
    for bar in bars {
        let key = key_fn(bar);
        match groups.last_mut() {
            Some((k, group)) if *k == key => group.push(*bar),
            _ => groups.push((key, vec![*bar])),
        }
    }
    groups.into_iter().map(|(_, g)| g).collect()
}
