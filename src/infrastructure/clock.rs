use crate::domain::ports::Clock;
use chrono::{Days, Local, NaiveDate};
use std::sync::{Arc, RwLock};

/// The local calendar date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A settable date, shared between clones.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Arc<RwLock<NaiveDate>>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(RwLock::new(date)),
        }
    }

    /// Panics on an impossible date; meant for tests and fixtures.
    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .unwrap_or_else(|| panic!("invalid date {year}-{month}-{day}"));
        Self::new(date)
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.write().unwrap_or_else(|e| e.into_inner()) = date;
    }

    pub fn advance_days(&self, days: u64) {
        let mut date = self.date.write().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = date.checked_add_days(Days::new(days)) {
            *date = next;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.read().unwrap_or_else(|e| e.into_inner())
    }
}
