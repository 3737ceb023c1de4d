//! Time text parsing.
//!
//! Normalizes the time notations found in timetable input into a single
//! minute-of-day integer, so that `"09:00"` and `"9:00 AM"` compare equal.
//!
//! # Accepted Forms
//!
//! | Input | Minutes |
//! |-------|---------|
//! | `"09:00"`, `"9:00"` | 540 |
//! | `"9:00 AM"`, `"9am"`, `"9 a.m."` | 540 |
//! | `"12:00 AM"`, `"00:00"` | 0 |
//! | `"12:00 PM"`, `"12:00"` | 720 |
//! | `"14"` | 840 |
//!
//! Minutes default to zero when omitted; when present they must be two
//! digits. Anything else fails with [`ParseError::InvalidTimeFormat`].

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::models::{DayOfWeek, TimeRange};

/// How minute values are rendered as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockStyle {
    /// `"13:05"`.
    #[default]
    TwentyFourHour,
    /// `"1:05 PM"`.
    TwelveHour,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Parses a time of day into minutes since midnight.
///
/// # Examples
///
/// ```
/// use u_timetable::parser::parse_time;
///
/// assert_eq!(parse_time("09:00").unwrap(), 540);
/// assert_eq!(parse_time("9:00 AM").unwrap(), 540);
/// assert_eq!(parse_time("12:00 PM").unwrap(), 720);
/// assert!(parse_time("25:00").is_err());
/// ```
pub fn parse_time(raw: &str) -> Result<u16, ParseError> {
    let invalid = || ParseError::InvalidTimeFormat {
        input: raw.to_string(),
    };

    let (clock, meridiem) = split_meridiem(raw.trim());
    let clock = clock.trim_end();
    if clock.is_empty() {
        return Err(invalid());
    }

    let (hour_text, minute_text) = match clock.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (clock, None),
    };

    if hour_text.is_empty() || hour_text.len() > 2 || !hour_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hour: u16 = hour_text.parse().map_err(|_| invalid())?;

    let minute: u16 = match minute_text {
        None => 0,
        Some(m) if m.len() == 2 && m.bytes().all(|b| b.is_ascii_digit()) => {
            m.parse().map_err(|_| invalid())?
        }
        Some(_) => return Err(invalid()),
    };
    if minute > 59 {
        return Err(invalid());
    }

    let hour = match meridiem {
        None if hour <= 23 => hour,
        None => return Err(invalid()),
        Some(_) if !(1..=12).contains(&hour) => return Err(invalid()),
        Some(Meridiem::Am) => hour % 12,
        Some(Meridiem::Pm) => hour % 12 + 12,
    };

    Ok(hour * 60 + minute)
}

/// Parses a start/end pair into a [`TimeRange`].
///
/// Fails with [`ParseError::InvalidRange`] when `end <= start`.
pub fn parse_range(start_raw: &str, end_raw: &str) -> Result<TimeRange, ParseError> {
    let start = parse_time(start_raw)?;
    let end = parse_time(end_raw)?;
    TimeRange::new(start, end)
}

/// Parses a display range such as `"9:00 AM - 10:30 AM"`.
///
/// The separator is a hyphen or an en dash, with optional spaces.
pub fn parse_display_range(raw: &str) -> Result<TimeRange, ParseError> {
    let (start, end) = raw
        .split_once(['-', '\u{2013}'])
        .ok_or_else(|| ParseError::InvalidTimeFormat {
            input: raw.to_string(),
        })?;
    parse_range(start, end)
}

/// Parses an English day name, full or abbreviated, case-insensitive.
pub fn parse_day(raw: &str) -> Result<DayOfWeek, ParseError> {
    let day = match raw.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => DayOfWeek::Monday,
        "tuesday" | "tue" | "tues" => DayOfWeek::Tuesday,
        "wednesday" | "wed" => DayOfWeek::Wednesday,
        "thursday" | "thu" | "thur" | "thurs" => DayOfWeek::Thursday,
        "friday" | "fri" => DayOfWeek::Friday,
        "saturday" | "sat" => DayOfWeek::Saturday,
        "sunday" | "sun" => DayOfWeek::Sunday,
        _ => {
            return Err(ParseError::InvalidDay {
                input: raw.to_string(),
            })
        }
    };
    Ok(day)
}

/// Renders a minute-of-day value as text.
///
/// Values past the end of the day wrap around.
pub fn format_minute(minute: u16, style: ClockStyle) -> String {
    let minute = minute % crate::models::MINUTES_PER_DAY;
    let (h, m) = (minute / 60, minute % 60);
    match style {
        ClockStyle::TwentyFourHour => format!("{h:02}:{m:02}"),
        ClockStyle::TwelveHour => {
            let suffix = if h < 12 { "AM" } else { "PM" };
            let h12 = match h % 12 {
                0 => 12,
                x => x,
            };
            format!("{h12}:{m:02} {suffix}")
        }
    }
}

/// Splits a trailing AM/PM marker off the clock text.
fn split_meridiem(text: &str) -> (&str, Option<Meridiem>) {
    let lower = text.to_ascii_lowercase();
    for (suffix, meridiem) in [
        ("a.m.", Meridiem::Am),
        ("p.m.", Meridiem::Pm),
        ("am", Meridiem::Am),
        ("pm", Meridiem::Pm),
    ] {
        if lower.ends_with(suffix) {
            return (&text[..text.len() - suffix.len()], Some(meridiem));
        }
    }
    (text, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equivalent_encodings() {
        assert_eq!(parse_time("09:00").unwrap(), 540);
        assert_eq!(parse_time("9:00 AM").unwrap(), 540);
        assert_eq!(parse_time("9:00").unwrap(), 540);
        assert_eq!(parse_time("9am").unwrap(), 540);
        assert_eq!(parse_time("9 a.m.").unwrap(), 540);
    }

    #[test]
    fn test_midnight_and_noon() {
        assert_eq!(parse_time("00:00").unwrap(), 0);
        assert_eq!(parse_time("12:00 AM").unwrap(), 0);
        assert_eq!(parse_time("12:00 PM").unwrap(), 720);
        assert_eq!(parse_time("12:00").unwrap(), 720);
        assert_eq!(parse_time("12:30 am").unwrap(), 30);
        assert_eq!(parse_time("11:59 PM").unwrap(), 1439);
    }

    #[test]
    fn test_minutes_default_to_zero() {
        assert_eq!(parse_time("14").unwrap(), 840);
        assert_eq!(parse_time("2 PM").unwrap(), 840);
    }

    #[test]
    fn test_invalid_formats() {
        for bad in [
            "", "  ", "AM", "24:00", "9:60", "9:5", "13:00 PM", "0:30 AM", "abc", "9:00:00",
            "-1:00", "1:0a", "123:00",
        ] {
            assert_eq!(
                parse_time(bad),
                Err(ParseError::InvalidTimeFormat {
                    input: bad.to_string()
                }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_range() {
        let r = parse_range("09:00", "10:30 AM").unwrap();
        assert_eq!((r.start(), r.end()), (540, 630));

        assert_eq!(
            parse_range("14:00", "13:00"),
            Err(ParseError::InvalidRange { start: 840, end: 780 })
        );
        assert!(parse_range("10:00", "10:00").is_err());
        assert!(matches!(
            parse_range("x", "10:00"),
            Err(ParseError::InvalidTimeFormat { .. })
        ));
    }

    #[test]
    fn test_parse_display_range() {
        let r = parse_display_range("9:00 AM - 10:30 AM").unwrap();
        assert_eq!((r.start(), r.end()), (540, 630));

        let r = parse_display_range("13:00\u{2013}14:00").unwrap();
        assert_eq!((r.start(), r.end()), (780, 840));

        assert!(parse_display_range("9:00 AM").is_err());
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("Monday").unwrap(), DayOfWeek::Monday);
        assert_eq!(parse_day(" WED ").unwrap(), DayOfWeek::Wednesday);
        assert_eq!(parse_day("thurs").unwrap(), DayOfWeek::Thursday);
        assert!(matches!(parse_day("Funday"), Err(ParseError::InvalidDay { .. })));
    }

    #[test]
    fn test_format_minute() {
        assert_eq!(format_minute(540, ClockStyle::TwentyFourHour), "09:00");
        assert_eq!(format_minute(540, ClockStyle::TwelveHour), "9:00 AM");
        assert_eq!(format_minute(0, ClockStyle::TwelveHour), "12:00 AM");
        assert_eq!(format_minute(750, ClockStyle::TwelveHour), "12:30 PM");
        assert_eq!(format_minute(1439, ClockStyle::TwelveHour), "11:59 PM");
    }

    proptest! {
        #[test]
        fn prop_twelve_and_twenty_four_hour_agree(minute in 0u16..1440) {
            let h24 = format_minute(minute, ClockStyle::TwentyFourHour);
            let h12 = format_minute(minute, ClockStyle::TwelveHour);
            prop_assert_eq!(parse_time(&h24).unwrap(), minute);
            prop_assert_eq!(parse_time(&h12).unwrap(), minute);
        }

        #[test]
        fn prop_never_panics(s in "\\PC{0,12}") {
            let _ = parse_time(&s);
        }
    }
}
