//! Source of "today".
//!
//! Scheduling works in whole calendar days. Nothing in the core reads the
//! wall clock directly; callers hand in a [`Clock`] or a plain date.

use std::cell::Cell;

use chrono::{Local, NaiveDate};

pub trait Clock {
    /// Current calendar date. Time of day is ignored.
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a date that can be moved by hand.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Cell<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Cell::new(date),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        self.date.set(date);
    }

    /// Move forward by `days` (saturates at the last representable date).
    pub fn advance_days(&self, days: u64) {
        self.date.set(add_days(self.date.get(), days));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// `date + days`, saturating at `NaiveDate::MAX`.
pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(chrono::Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}
