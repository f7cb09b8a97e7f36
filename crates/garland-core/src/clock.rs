//! Clock source that pins "today" to one named time zone.
//!
//! Every viewer must see the same unlock schedule, so the calendar date is
//! always computed in the configured zone rather than the host's local zone.
//! Callers compute `today` once per render pass and reuse it for every gate
//! decision in that pass.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of the current calendar date used by gate decisions.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time projected into a fixed IANA time zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Project an arbitrary instant into the configured zone.
    ///
    /// `today()` is this applied to `Utc::now()`; keeping the projection
    /// separate makes the zone arithmetic testable.
    pub fn date_at(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.zone).date_naive()
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        self.date_at(Utc::now())
    }
}

/// Test clock that always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
