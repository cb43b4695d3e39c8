//! Time sources
//!
//! Save stamps, report headers and alert blocks all need "now". Taking it from
//! a [`Clock`] keeps those paths deterministic under test:
//! - [`SystemClock`] reads local wall-clock time
//! - [`FixedClock`] returns whatever it was set to

use std::cell::Cell;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::constants::{HUMAN_TIMESTAMP_FORMAT, SNAPSHOT_TIMESTAMP_FORMAT};

/// Source of local wall-clock time
pub trait Clock {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;

    /// ISO-8601 form written into snapshots
    fn iso_timestamp(&self) -> String {
        iso(&self.now())
    }

    /// `YYYY-MM-DD HH:MM:SS` form used in reports and alert blocks
    fn human_timestamp(&self) -> String {
        human(&self.now())
    }
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Cell::new(now) }
    }

    /// Clock set to midnight of the given date; falls back to the epoch on an invalid date
    pub fn at_date(year: i32, month: u32, day: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self::new(now)
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.set(self.now.get() + chrono::Duration::seconds(secs));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

pub fn iso(at: &NaiveDateTime) -> String {
    at.format(SNAPSHOT_TIMESTAMP_FORMAT).to_string()
}

pub fn human(at: &NaiveDateTime) -> String {
    at.format(HUMAN_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::at_date(2025, 11, 5);
        assert_eq!(clock.human_timestamp(), "2025-11-05 00:00:00");

        clock.advance_secs(90);
        assert_eq!(clock.human_timestamp(), "2025-11-05 00:01:30");
    }

    #[test]
    fn fixed_clock_can_be_reset() {
        let clock = FixedClock::at_date(2025, 11, 5);
        let later = NaiveDate::from_ymd_opt(2026, 1, 2)
            .and_then(|date| date.and_hms_opt(8, 30, 0))
            .unwrap();

        clock.set(later);
        assert_eq!(clock.now(), later);
        assert_eq!(clock.human_timestamp(), "2026-01-02 08:30:00");
    }

    #[test]
    fn iso_format_matches_snapshot_layout() {
        let clock = FixedClock::at_date(2025, 11, 5);
        assert_eq!(clock.iso_timestamp(), "2025-11-05T00:00:00.000000");
    }

    #[test]
    fn borrowed_clock_delegates() {
        fn read<C: Clock>(clock: C) -> NaiveDateTime {
            clock.now()
        }

        let clock = FixedClock::at_date(2024, 2, 29);
        assert_eq!(read(&clock), clock.now());
    }
}
