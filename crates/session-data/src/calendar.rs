//! Narrow interface to the trading-calendar collaborator (`TimeManager` in
//! spec.md §6). The calendar is out of scope for this crate — only the
//! contract the rest of the engine calls through is defined here, plus a
//! simple reference implementation used by tests.

use chrono::{NaiveDate, NaiveTime, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingSession {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub is_holiday: bool,
}

/// Read-only after initialization; called from every thread.
pub trait TimeService: Send + Sync {
    fn current_time(&self) -> chrono::NaiveDateTime;
    fn set_simulated_time(&self, t: chrono::NaiveDateTime);
    fn get_trading_session(&self, date: NaiveDate) -> TradingSession;
    fn get_next_trading_date(&self, date: NaiveDate) -> Option<NaiveDate>;
    fn get_previous_trading_date(&self, date: NaiveDate, n: u32) -> Option<NaiveDate>;
    fn is_holiday(&self, date: NaiveDate) -> bool;
    fn market_timezone(&self) -> chrono_tz::Tz;

    /// Minutes in the regular trading session for `date` (honors early
    /// closes and holidays — a holiday reports 0).
    fn trading_minutes(&self, date: NaiveDate) -> i64 {
        let session = self.get_trading_session(date);
        if session.is_holiday {
            return 0;
        }
        (session.close - session.open).num_minutes().max(0)
    }

    /// How many trading days fall in the ISO week containing `date`.
    fn trading_days_in_week(&self, date: NaiveDate) -> i64 {
        let monday = date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64);
        (0..7)
            .filter_map(|offset| monday.checked_add_signed(chrono::Duration::days(offset)))
            .filter(|d| d.weekday() != Weekday::Sat && d.weekday() != Weekday::Sun)
            .filter(|d| !self.is_holiday(*d))
            .count() as i64
    }
}

/// A fixed 9:30-16:00 US-equity-style calendar with no holidays, used by
/// unit and integration tests that don't need real calendar data.
pub struct SimpleCalendar {
    simulated: parking_lot::RwLock<chrono::NaiveDateTime>,
    holidays: Vec<NaiveDate>,
}

impl SimpleCalendar {
    pub fn new(start: chrono::NaiveDateTime) -> Self {
        Self {
            simulated: parking_lot::RwLock::new(start),
            holidays: Vec::new(),
        }
    }

    pub fn with_holidays(start: chrono::NaiveDateTime, holidays: Vec<NaiveDate>) -> Self {
        Self {
            simulated: parking_lot::RwLock::new(start),
            holidays,
        }
    }

    fn is_weekend(date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl TimeService for SimpleCalendar {
    fn current_time(&self) -> chrono::NaiveDateTime {
        *self.simulated.read()
    }

    fn set_simulated_time(&self, t: chrono::NaiveDateTime) {
        *self.simulated.write() = t;
    }

    fn get_trading_session(&self, date: NaiveDate) -> TradingSession {
        let is_holiday = Self::is_weekend(date) || self.holidays.contains(&date);
        TradingSession {
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            is_holiday,
        }
    }

    fn get_next_trading_date(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut d = date.succ_opt()?;
        while Self::is_weekend(d) || self.holidays.contains(&d) {
            d = d.succ_opt()?;
        }
        Some(d)
    }

    fn get_previous_trading_date(&self, date: NaiveDate, n: u32) -> Option<NaiveDate> {
        let mut d = date;
        for _ in 0..n {
            d = d.pred_opt()?;
            while Self::is_weekend(d) || self.holidays.contains(&d) {
                d = d.pred_opt()?;
            }
        }
        Some(d)
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        Self::is_weekend(date) || self.holidays.contains(&date)
    }

    fn market_timezone(&self) -> chrono_tz::Tz {
        chrono_tz::America::New_York
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn trading_minutes_excludes_holidays() {
        let cal = SimpleCalendar::with_holidays(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()],
        );
        assert_eq!(cal.trading_minutes(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 0);
        assert_eq!(cal.trading_minutes(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()), 390);
    }

    #[test]
    fn week_excludes_weekends() {
        let cal = SimpleCalendar::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        );
        // Jan 1 2024 is a Monday.
        assert_eq!(
            cal.trading_days_in_week(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()),
            5
        );
    }

    #[test]
    fn next_trading_date_skips_weekend() {
        let cal = SimpleCalendar::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        );
        // Friday Jan 5 2024 -> next trading date should be Monday Jan 8.
        let friday = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(
            cal.get_next_trading_date(friday),
            Some(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap())
        );
    }
}
