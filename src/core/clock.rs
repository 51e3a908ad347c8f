//! Session-start snapshot of "today" as a day-of-month.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// The day value the gating policy is evaluated against.
///
/// Taken once when a session starts and never re-sampled. Outside the event
/// month the value is [`CurrentDay::BEFORE_EVENT`], which sits below every
/// positive unlock threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrentDay(u32);

impl CurrentDay {
    /// Sentinel for "the event has not started".
    pub const BEFORE_EVENT: Self = Self(0);

    /// Wrap a raw day-of-month.
    #[must_use]
    pub const fn new(day: u32) -> Self {
        Self(day)
    }

    /// Raw day value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether this is the pre-event sentinel.
    #[must_use]
    pub const fn is_before_event(self) -> bool {
        self.0 == Self::BEFORE_EVENT.0
    }

    /// Day-of-month of `date` when it falls in `event_month`, else the sentinel.
    #[must_use]
    pub fn snapshot(date: NaiveDate, event_month: u32) -> Self {
        if date.month() == event_month {
            Self(date.day())
        } else {
            Self::BEFORE_EVENT
        }
    }

    /// Sample the local wall clock once.
    #[must_use]
    pub fn from_clock(event_month: u32) -> Self {
        Self::snapshot(Local::now().date_naive(), event_month)
    }
}

impl From<u32> for CurrentDay {
    fn from(day: u32) -> Self {
        Self(day)
    }
}

impl fmt::Display for CurrentDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_before_event() {
            f.write_str("before-event")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
