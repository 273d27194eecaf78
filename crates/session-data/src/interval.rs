//! Interval tokens: parsing, classification, and derivation rules.
//!
//! A token is `<N><unit>` with unit in `{s, m, d, w}`. Hourly tokens are
//! rejected outright — callers must spell out `60m`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calendar::TimeService;

/// Nominal trading minutes used when no calendar is available (tests,
/// derivation-eligibility checks that don't need an exact count).
const DEFAULT_SESSION_MINUTES: i64 = 390;
const TRADING_DAYS_PER_WEEK: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntervalUnit {
    Second,
    Minute,
    Day,
    Week,
}

impl IntervalUnit {
    fn token_char(self) -> char {
        match self {
            IntervalUnit::Second => 's',
            IntervalUnit::Minute => 'm',
            IntervalUnit::Day => 'd',
            IntervalUnit::Week => 'w',
        }
    }
}

/// Structural order (unit, then value) — safe as a `BTreeMap` key since it
/// agrees with `Eq`. Two intervals with equal nominal duration but different
/// `(unit, value)` (e.g. `60s` vs `1m`) are NOT the same map key, so this
/// must not collapse them; use `by_duration` to sort a collection smallest
/// window first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub unit: IntervalUnit,
    pub value: u32,
}

/// Sorts intervals by nominal duration, shortest first. Use this instead of
/// `Interval`'s own `Ord` (which is structural, for map-key correctness)
/// whenever "smallest window" ordering is actually needed.
pub fn by_duration(intervals: &mut [Interval]) {
    intervals.sort_by_key(|i| i.nominal_seconds());
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("invalid interval token: '{0}'")]
    InvalidToken(String),
    #[error("hourly intervals are not supported, use minutes instead (e.g. '60m'): '{0}'")]
    HourlyRejected(String),
}

impl Interval {
    pub fn new(unit: IntervalUnit, value: u32) -> Self {
        Self { unit, value }
    }

    /// Parses a token such as `"5m"`, `"1d"`, `"1w"`. Rejects `h`/`hour`
    /// tokens with a dedicated error and anything else with a
    /// token-quoting parse error.
    pub fn parse(token: &str) -> Result<Self, IntervalError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(IntervalError::InvalidToken(token.to_string()));
        }
        let lower = trimmed.to_lowercase();
        if lower.ends_with('h') || lower == "1hour" || lower.ends_with("hour") {
            return Err(IntervalError::HourlyRejected(token.to_string()));
        }

        let split_at = lower
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| IntervalError::InvalidToken(token.to_string()))?;
        let (num_part, unit_part) = lower.split_at(split_at);
        let value: u32 = num_part
            .parse()
            .map_err(|_| IntervalError::InvalidToken(token.to_string()))?;
        if value == 0 {
            return Err(IntervalError::InvalidToken(token.to_string()));
        }

        let unit = match unit_part {
            "s" => IntervalUnit::Second,
            "m" => IntervalUnit::Minute,
            "d" => IntervalUnit::Day,
            "w" => IntervalUnit::Week,
            _ => return Err(IntervalError::InvalidToken(token.to_string())),
        };

        Ok(Self { unit, value })
    }

    pub fn as_token(&self) -> String {
        format!("{}{}", self.value, self.unit.token_char())
    }

    /// `is_base = (value == 1) AND unit in {second, minute, day}`. Weeks are
    /// never base.
    pub fn is_base(&self) -> bool {
        self.value == 1 && !matches!(self.unit, IntervalUnit::Week)
    }

    /// Nominal duration in seconds, using a default session length. Only
    /// suitable for ordering/eligibility checks, not for exact expected-bar
    /// counts (use `seconds_for_date` for that).
    pub fn nominal_seconds(&self) -> i64 {
        match self.unit {
            IntervalUnit::Second => self.value as i64,
            IntervalUnit::Minute => self.value as i64 * 60,
            IntervalUnit::Day => self.value as i64 * DEFAULT_SESSION_MINUTES * 60,
            IntervalUnit::Week => {
                self.value as i64 * TRADING_DAYS_PER_WEEK * DEFAULT_SESSION_MINUTES * 60
            }
        }
    }

    /// Exact duration in seconds for a specific trading date, using the
    /// calendar collaborator for session minutes (honors early closes).
    /// Week intervals multiply by the number of trading days the calendar
    /// reports for that ISO week.
    pub fn seconds_for_date(
        &self,
        calendar: &dyn TimeService,
        date: chrono::NaiveDate,
    ) -> i64 {
        match self.unit {
            IntervalUnit::Second => self.value as i64,
            IntervalUnit::Minute => self.value as i64 * 60,
            IntervalUnit::Day => self.value as i64 * calendar.trading_minutes(date) * 60,
            IntervalUnit::Week => {
                let days = calendar.trading_days_in_week(date).max(1);
                self.value as i64 * days * calendar.trading_minutes(date) * 60
            }
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::parse(s)
    }
}

/// Ordered list of acceptable source intervals for `target`, most-preferred
/// first, per spec.md's derivation rules.
pub fn derivation_source_priority(target: Interval) -> Vec<Interval> {
    match target.unit {
        IntervalUnit::Second => {
            // Sub-minute targets derive only from 1s (and 1s is itself base).
            if target.value == 1 {
                vec![]
            } else {
                vec![Interval::new(IntervalUnit::Second, 1)]
            }
        }
        IntervalUnit::Minute => {
            if target.is_base() {
                vec![]
            } else {
                vec![
                    Interval::new(IntervalUnit::Minute, 1),
                    Interval::new(IntervalUnit::Second, 1),
                ]
            }
        }
        IntervalUnit::Day => vec![
            Interval::new(IntervalUnit::Day, 1),
            Interval::new(IntervalUnit::Minute, 1),
            Interval::new(IntervalUnit::Second, 1),
        ],
        IntervalUnit::Week => vec![Interval::new(IntervalUnit::Day, 1)],
    }
}

/// Whether `source` can feed `target` through aggregation, and why not if
/// it can't.
pub fn can_derive(source: Interval, target: Interval) -> (bool, Option<String>) {
    if source.nominal_seconds() >= target.nominal_seconds() {
        return (
            false,
            Some(format!(
                "source '{source}' is not strictly shorter than target '{target}'"
            )),
        );
    }

    let allowed = derivation_source_priority(target);
    if allowed.is_empty() {
        return (
            false,
            Some(format!("'{target}' is a base interval, nothing derives it")),
        );
    }
    if !allowed.contains(&source) {
        return (
            false,
            Some(format!(
                "'{target}' cannot be derived from '{source}'; acceptable sources: {}",
                allowed
                    .iter()
                    .map(|i| i.as_token())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        );
    }
    (true, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_tokens() {
        assert_eq!(
            Interval::parse("5m").unwrap(),
            Interval::new(IntervalUnit::Minute, 5)
        );
        assert_eq!(
            Interval::parse("1d").unwrap(),
            Interval::new(IntervalUnit::Day, 1)
        );
        assert_eq!(
            Interval::parse("1w").unwrap(),
            Interval::new(IntervalUnit::Week, 1)
        );
        assert_eq!(
            Interval::parse("1s").unwrap(),
            Interval::new(IntervalUnit::Second, 1)
        );
    }

    #[test]
    fn rejects_hourly() {
        assert!(matches!(
            Interval::parse("60min"),
            Err(IntervalError::InvalidToken(_))
        ));
        assert!(matches!(
            Interval::parse("1h"),
            Err(IntervalError::HourlyRejected(_))
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Interval::parse("").is_err());
        assert!(Interval::parse("m5").is_err());
        assert!(Interval::parse("0m").is_err());
    }

    #[test]
    fn is_base_rules() {
        assert!(Interval::parse("1s").unwrap().is_base());
        assert!(Interval::parse("1m").unwrap().is_base());
        assert!(Interval::parse("1d").unwrap().is_base());
        assert!(!Interval::parse("1w").unwrap().is_base());
        assert!(!Interval::parse("5m").unwrap().is_base());
    }

    #[test]
    fn derivation_priority_rules() {
        let m5 = Interval::parse("5m").unwrap();
        assert_eq!(
            derivation_source_priority(m5),
            vec![
                Interval::parse("1m").unwrap(),
                Interval::parse("1s").unwrap()
            ]
        );

        let d1 = Interval::parse("1d").unwrap();
        assert_eq!(
            derivation_source_priority(d1),
            vec![
                Interval::parse("1d").unwrap(),
                Interval::parse("1m").unwrap(),
                Interval::parse("1s").unwrap()
            ]
        );

        let w1 = Interval::parse("1w").unwrap();
        assert_eq!(derivation_source_priority(w1), vec![Interval::parse("1d").unwrap()]);
    }

    #[test]
    fn can_derive_rules() {
        let m1 = Interval::parse("1m").unwrap();
        let m5 = Interval::parse("5m").unwrap();
        assert_eq!(can_derive(m1, m5), (true, None));

        let s1 = Interval::parse("1s").unwrap();
        let d1 = Interval::parse("1d").unwrap();
        assert!(can_derive(s1, m5).0);
        assert!(!can_derive(m5, s1).0);
        assert!(can_derive(m1, d1).0);

        // Weeks only derive from 1d.
        let w1 = Interval::parse("1w").unwrap();
        assert!(!can_derive(m1, w1).0);
        assert!(can_derive(d1, w1).0);
    }

    #[test]
    fn by_duration_sorts_shortest_first() {
        let mut intervals = vec![
            Interval::parse("1d").unwrap(),
            Interval::parse("1s").unwrap(),
            Interval::parse("5m").unwrap(),
        ];
        by_duration(&mut intervals);
        assert_eq!(
            intervals,
            vec![
                Interval::parse("1s").unwrap(),
                Interval::parse("5m").unwrap(),
                Interval::parse("1d").unwrap(),
            ]
        );
    }

    #[test]
    fn structural_ord_distinguishes_equal_duration_intervals() {
        // 60s and 1m have the same nominal duration but are different map
        // keys; structural Ord must not treat them as equal.
        let s60 = Interval::new(IntervalUnit::Second, 60);
        let m1 = Interval::parse("1m").unwrap();
        assert_ne!(s60, m1);
        assert_ne!(s60.cmp(&m1), std::cmp::Ordering::Equal);
    }
}
