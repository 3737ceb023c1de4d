//! Clock collaborator for the "today" view.

use chrono::{Datelike, Local};

use crate::models::DayOfWeek;

/// Supplies the current weekday.
pub trait Clock: Send + Sync {
    /// Weekday of the current wall-clock time.
    fn today(&self) -> DayOfWeek;
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> DayOfWeek {
        Local::now().weekday().into()
    }
}

/// Always reports the same day. Useful for tests and previews.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DayOfWeek);

impl Clock for FixedClock {
    fn today(&self) -> DayOfWeek {
        self.0
    }
}
