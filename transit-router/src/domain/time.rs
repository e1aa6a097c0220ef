//! Cyclic time of day for timetabled services.
//!
//! Timetables repeat every day, so a departure at "00:05" follows one at
//! "23:55" without any notion of a calendar date. All arithmetic here wraps
//! modulo the length of a day.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Minutes in one hour.
pub const MINUTES_PER_HOUR: u32 = 60;

/// Hours in one day.
pub const HOURS_PER_DAY: u32 = 24;

/// Minutes in one (cyclic) day.
pub const MINUTES_PER_DAY: u32 = MINUTES_PER_HOUR * HOURS_PER_DAY;

/// Error returned when constructing or parsing an invalid time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day on a repeating 24-hour clock, with minute resolution.
///
/// The derived ordering is the absolute order within a day (00:00 first).
/// Use [`ClockTime::cmp_relative`] to order times as seen from a reference
/// point, where the earliest time at or after the reference sorts first.
///
/// # Examples
///
/// ```
/// use transit_router::domain::ClockTime;
///
/// let late = ClockTime::parse_hhmm("23:50").unwrap();
/// let early = ClockTime::parse_hhmm("00:10").unwrap();
/// assert_eq!(late.minutes_to(early), 20);
/// assert_eq!(early.minutes_to(late), 1420);
/// assert_eq!(late.later(30).to_string(), "00:20");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Midnight, the start of the day.
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    /// Create a time from hour (0-23) and minute (0-59).
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour >= HOURS_PER_DAY {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute >= MINUTES_PER_HOUR {
            return Err(TimeError::new("minute must be 0-59"));
        }
        Ok(Self((hour * MINUTES_PER_HOUR + minute) as u16))
    }

    /// Create a time from a minute count, wrapping into the day.
    ///
    /// Negative counts wrap backwards, so `-1` is 23:59.
    pub fn from_minutes(minutes: i64) -> Self {
        Self(minutes.rem_euclid(MINUTES_PER_DAY as i64) as u16)
    }

    /// Parse a time from "HH:MM" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_router::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse_hhmm("00:00").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    ///
    /// assert!(ClockTime::parse_hhmm("1430").is_err());
    /// assert!(ClockTime::parse_hhmm("14:3").is_err());
    /// assert!(ClockTime::parse_hhmm("24:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::new(hour, minute)
    }

    /// The current local wall-clock time, truncated to the minute.
    pub fn now() -> Self {
        Self::from(Local::now().time())
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        u32::from(self.0) / MINUTES_PER_HOUR
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        u32::from(self.0) % MINUTES_PER_HOUR
    }

    /// Minutes since midnight (0-1439).
    pub fn minutes_of_day(&self) -> u32 {
        u32::from(self.0)
    }

    /// Forward cyclic distance in minutes from this time to `other`.
    ///
    /// Always in `0..MINUTES_PER_DAY`; zero when both times are equal.
    pub fn minutes_to(&self, other: ClockTime) -> u32 {
        (u32::from(other.0) + MINUTES_PER_DAY - u32::from(self.0)) % MINUTES_PER_DAY
    }

    /// This time moved by `delta` minutes, which may be negative.
    pub fn later(&self, delta: i64) -> Self {
        Self::from_minutes(i64::from(self.0) + delta)
    }

    /// Compare two times on the day linearized at `reference`.
    ///
    /// The time closest at or after `reference` is the smallest.
    pub fn cmp_relative(a: ClockTime, b: ClockTime, reference: ClockTime) -> Ordering {
        reference.minutes_to(a).cmp(&reference.minutes_to(b))
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * MINUTES_PER_HOUR + time.minute()) as u16)
    }
}

impl From<ClockTime> for NaiveTime {
    fn from(time: ClockTime) -> Self {
        // hour and minute are always in range
        NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hhmm(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse_hhmm(&s)
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Render a duration in minutes for display, e.g. `"45min"` or `"1h 05min"`.
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / MINUTES_PER_HOUR;
    let rest = minutes % MINUTES_PER_HOUR;
    if hours == 0 {
        format!("{rest}min")
    } else {
        format!("{hours}h {rest:02}min")
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
