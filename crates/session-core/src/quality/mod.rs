//! Quality/gap engine: expected-bar-count against the calendar service,
//! gap enumeration over what actually landed, and a retry policy that's a
//! no-op in backtest (history either has the bar or it never will) but
//! bounded in live mode (the bar might just be late).

use chrono::{NaiveDate, NaiveDateTime};
use session_data::{Interval, IntervalUnit, TimeService};

use crate::store::{DataStoreError, Gap, SessionDataStore};

/// How the engine should react to a detected gap. Backtest data is fixed —
/// a missing bar there means the source never had it, so there's nothing
/// to retry. Live data can simply be late.
#[derive(Debug, Clone, Copy)]
pub enum GapPolicy {
    Backtest,
    Live { max_retries: u32, retry_interval_secs: u64 },
}

impl GapPolicy {
    pub fn should_retry(&self, attempt: u32) -> bool {
        match self {
            GapPolicy::Backtest => false,
            GapPolicy::Live { max_retries, .. } => attempt < *max_retries,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub expected: i64,
    pub actual: i64,
    pub quality: f64,
    pub gaps: Vec<Gap>,
}

/// Expected bar count for one trading date on a sub-day interval. Day and
/// week intervals aren't assessed per-date — a daily bar's "expected count
/// for today" is trivially 1 and says nothing about completeness.
pub fn expected_bar_count(interval: Interval, calendar: &dyn TimeService, date: NaiveDate) -> Option<i64> {
    let minutes = calendar.trading_minutes(date);
    match interval.unit {
        IntervalUnit::Second => Some(minutes * 60 / interval.value as i64),
        IntervalUnit::Minute => Some(minutes / interval.value as i64),
        IntervalUnit::Day | IntervalUnit::Week => None,
    }
}

/// Walks sorted `timestamps` and records every run of missing bars whose
/// spacing exceeds `bar_seconds`.
fn enumerate_gaps(timestamps: &[NaiveDateTime], bar_seconds: i64) -> Vec<Gap> {
    let mut gaps = Vec::new();
    for pair in timestamps.windows(2) {
        let elapsed = (pair[1] - pair[0]).num_seconds();
        if elapsed > bar_seconds {
            let missing = (elapsed / bar_seconds).saturating_sub(1);
            if missing > 0 {
                gaps.push(Gap {
                    start: pair[0],
                    end: pair[1],
                    missing_count: missing as u32,
                });
            }
        }
    }
    gaps
}

/// Assesses one (symbol, interval) series for `date` against the
/// calendar, records gaps and a quality score (`actual / expected`,
/// clamped to `[0, 1]`) onto the store.
pub fn assess_quality(
    store: &SessionDataStore,
    symbol: &str,
    interval: Interval,
    calendar: &dyn TimeService,
    date: NaiveDate,
) -> Result<Option<QualityReport>, DataStoreError> {
    let Some(expected) = expected_bar_count(interval, calendar, date) else {
        return Ok(None);
    };
    let data = store
        .get_symbol_data(symbol, true)
        .ok_or_else(|| DataStoreError::UnknownSymbol(symbol.to_string()))?;
    let Some(interval_data) = data.bars.get(&interval) else {
        return Ok(None);
    };

    let timestamps: Vec<NaiveDateTime> = interval_data
        .bars
        .iter()
        .filter(|b| b.timestamp.date() == date)
        .map(|b| b.timestamp)
        .collect();
    let actual = timestamps.len() as i64;
    let bar_seconds = interval.seconds_for_date(calendar, date) / interval.value.max(1) as i64;
    let gaps = enumerate_gaps(&timestamps, bar_seconds.max(1));

    let quality = if expected > 0 {
        (actual as f64 / expected as f64).min(1.0)
    } else {
        1.0
    };

    store.set_quality(symbol, interval, quality)?;
    store.set_gaps(symbol, interval, gaps.clone())?;

    Ok(Some(QualityReport {
        expected,
        actual,
        quality,
        gaps,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_data::SimpleCalendar;
    use chrono::NaiveTime;

    #[test]
    fn retry_policy_never_retries_in_backtest() {
        assert!(!GapPolicy::Backtest.should_retry(0));
    }

    #[test]
    fn retry_policy_bounds_live_retries() {
        let policy = GapPolicy::Live { max_retries: 3, retry_interval_secs: 1 };
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn gap_enumeration_finds_missing_runs() {
        let parse = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        let timestamps = vec![
            parse("2024-01-02 09:30:00"),
            parse("2024-01-02 09:31:00"),
            parse("2024-01-02 09:35:00"),
        ];
        let gaps = enumerate_gaps(&timestamps, 60);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].missing_count, 3);
    }

    #[test]
    fn day_and_week_intervals_are_not_assessed_per_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let calendar = SimpleCalendar::new(date.and_time(NaiveTime::from_hms_opt(9, 30, 0).unwrap()));
        assert!(expected_bar_count(Interval::parse("1d").unwrap(), &calendar, date).is_none());
    }
}
