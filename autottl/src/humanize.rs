//! Human-readable durations for the statistics listing
//!
//! A duration is decomposed as the calendar difference between the Unix
//! epoch and `epoch + seconds`, so months and years follow real calendar
//! lengths instead of fixed multiples of days.

use std::fmt;

use chrono::{DateTime, Datelike, Timelike};

/// A duration broken into calendar components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarSpan {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CalendarSpan {
    /// Decompose a number of seconds; negative values use their magnitude
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn from_seconds(seconds: i64) -> Option<Self> {
        let end = DateTime::from_timestamp(seconds.saturating_abs(), 0)?;

        Some(Self {
            years: u32::try_from(end.year() - 1970).ok()?,
            months: end.month0(),
            days: end.day0(),
            hours: end.hour(),
            minutes: end.minute(),
            seconds: end.second(),
        })
    }
}

impl fmt::Display for CalendarSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(5);

        for (value, unit) in [
            (self.years, "year"),
            (self.months, "month"),
            (self.days, "day"),
            (self.hours, "hour"),
            (self.minutes, "minute"),
        ] {
            if value > 0 {
                parts.push(plural(value, unit));
            }
        }

        // seconds are only shown when there is no minute component
        if self.minutes == 0 && self.seconds > 0 {
            parts.push(plural(self.seconds, "second"));
        }

        f.write_str(&parts.join(" "))
    }
}

fn plural(value: u32, unit: &str) -> String {
    if value == 1 {
        format!("{} {}", value, unit)
    } else {
        format!("{} {}s", value, unit)
    }
}

/// Format seconds as e.g. `"1 day 1 hour 1 minute"`
///
/// Zero formats as an empty string.
pub fn human_interval(seconds: i64) -> String {
    match CalendarSpan::from_seconds(seconds) {
        Some(span) => span.to_string(),
        None => plural_seconds(seconds),
    }
}

fn plural_seconds(seconds: i64) -> String {
    if seconds.saturating_abs() == 1 {
        "1 second".to_string()
    } else {
        format!("{} seconds", seconds.saturating_abs())
    }
}
