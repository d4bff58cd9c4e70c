//! Reference time for age predicates.
//!
//! Age bounds are evaluated against "now" on every query. The clock is
//! a seam so a deployment can freeze the reference time and tests can
//! pin it.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use visitdb_core::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    /// Stop the clock at `at`.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// Stop the clock at `ts` epoch seconds. None if out of range.
    pub fn from_timestamp(ts: Timestamp) -> Option<Self> {
        Utc.timestamp_opt(ts, 0).single().map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}

/// Move `ts` forward by `years` calendar years, in UTC.
///
/// Feb 29 lands on Mar 1 when the target year is not a leap year.
/// Returns None when the result is not representable.
pub(crate) fn shift_years(ts: Timestamp, years: i32) -> Option<DateTime<Utc>> {
    let base = Utc.timestamp_opt(ts, 0).single()?;
    let date = base.date_naive();
    let year = date.year().checked_add(years)?;
    let shifted = date
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))?;
    Some(Utc.from_utc_datetime(&shifted.and_time(base.time())))
}
