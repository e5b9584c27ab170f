//! Calendar date source for attendance rows

use chrono::{Local, NaiveDate};

/// Format used for the attendance date cell
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "today"
pub trait Clock {
    /// Current local calendar date
    fn today(&self) -> NaiveDate;

    /// Today formatted as `YYYY-MM-DD`
    fn today_iso(&self) -> String {
        self.today().format(DATE_FORMAT).to_string()
    }
}

/// Wall clock in the user's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
