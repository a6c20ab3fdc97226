//! Clock capability for date-dependent checks and transformations.
//!
//! The analyzer, suggestion engine and several operations compare values
//! against "today". They read it through [`Clock`] so callers can pin the
//! date in tests.

use chrono::{Datelike, Local, NaiveDate};

/// Date format used when a date is written into a cell.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current date.
pub trait Clock: Send + Sync {
    /// Today's date.
    fn today(&self) -> NaiveDate;

    /// The current calendar year.
    fn current_year(&self) -> i32 {
        self.today().year()
    }

    /// Today's date formatted as `YYYY-MM-DD`.
    fn today_string(&self) -> String {
        self.today().format(DATE_FORMAT).to_string()
    }
}

/// Clock backed by the local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock that always reports the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    /// Create a clock fixed at the given date.
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Create a clock fixed at a `YYYY-MM-DD` date.
    pub fn parse(date: &str) -> Option<Self> {
        NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
            .ok()
            .map(Self::new)
    }

    /// Create a clock fixed at January 1st of the given year.
    pub fn year(year: i32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
        Self { date }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::parse("2025-06-30").unwrap();
        assert_eq!(clock.current_year(), 2025);
        assert_eq!(clock.today_string(), "2025-06-30");
    }

    #[test]
    fn test_fixed_year() {
        assert_eq!(FixedClock::year(2031).today_string(), "2031-01-01");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(FixedClock::parse("06/30/2025").is_none());
    }
}
