use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_WINDOW_DAYS: i64 = 60;

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleError {
    #[error("{date} falls on a weekend")]
    Weekend { date: NaiveDate },
    #[error("{date} is in the past")]
    InPast { date: NaiveDate },
    #[error("{date} is beyond the last schedulable day {last_day}")]
    BeyondWindow { date: NaiveDate, last_day: NaiveDate },
}

/// The schedulable range `[today, today + window_days]`, weekends
/// excluded. `today` is injected so the rules stay testable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulingWindow {
    today: NaiveDate,
    window_days: i64,
}

impl SchedulingWindow {
    pub fn new(today: NaiveDate) -> Self {
        Self::with_window_days(today, DEFAULT_WINDOW_DAYS)
    }

    pub fn with_window_days(today: NaiveDate, window_days: i64) -> Self {
        Self { today, window_days: window_days.max(0) }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn last_day(&self) -> NaiveDate {
        self.today + Duration::days(self.window_days)
    }

    pub fn check(&self, date: NaiveDate) -> Result<(), ScheduleError> {
        if is_weekend(date) {
            return Err(ScheduleError::Weekend { date });
        }
        if date < self.today {
            return Err(ScheduleError::InPast { date });
        }
        if date > self.last_day() {
            return Err(ScheduleError::BeyondWindow { date, last_day: self.last_day() });
        }
        Ok(())
    }

    pub fn selectable(&self, date: NaiveDate) -> bool {
        self.check(date).is_ok()
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
