//! Day-of-week and minute-of-day range models.
//!
//! # Time Model
//! A weekly timetable repeats every week, so times carry no date: a
//! [`DayOfWeek`] plus a [`TimeRange`] of minutes since midnight.
//!
//! Ranges are half-open: `[start, end)`. Two ranges that only touch
//! (`a.end == b.start`) do not overlap.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Minutes in a day. All minute values are strictly below this.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Day of the week, ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All seven days in week order.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Monday through Friday.
    pub const WEEKDAYS: [DayOfWeek; 5] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
    ];

    /// Three-letter English abbreviation.
    pub fn short_name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Mon",
            DayOfWeek::Tuesday => "Tue",
            DayOfWeek::Wednesday => "Wed",
            DayOfWeek::Thursday => "Thu",
            DayOfWeek::Friday => "Fri",
            DayOfWeek::Saturday => "Sat",
            DayOfWeek::Sunday => "Sun",
        }
    }

    /// Full English name.
    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl std::str::FromStr for DayOfWeek {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_day(s)
    }
}

/// A minute-of-day interval `[start, end)`.
///
/// Invariant: `start < end < 1440`. The only way to build one is
/// [`TimeRange::new`] (or deserialization, which goes through it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start: u16,
    end: u16,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: u16,
    end: u16,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = ParseError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        TimeRange::new(raw.start, raw.end)
    }
}

impl TimeRange {
    /// Creates a range, rejecting empty, inverted or out-of-day bounds.
    pub fn new(start: u16, end: u16) -> Result<Self, ParseError> {
        if end <= start || end >= MINUTES_PER_DAY {
            return Err(ParseError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Inclusive start minute.
    #[inline]
    pub fn start(&self) -> u16 {
        self.start
    }

    /// Exclusive end minute.
    #[inline]
    pub fn end(&self) -> u16 {
        self.end
    }

    /// Length in minutes (always positive).
    #[inline]
    pub fn duration_minutes(&self) -> u16 {
        self.end - self.start
    }

    /// Whether a minute falls within this range.
    #[inline]
    pub fn contains(&self, minute: u16) -> bool {
        minute >= self.start && minute < self.end
    }

    /// Whether two ranges overlap. Touching ranges do not.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start / 60,
            self.start % 60,
            self.end / 60,
            self.end % 60
        )
    }
}
