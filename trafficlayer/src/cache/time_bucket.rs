//! Time buckets for congestion data.
//!
//! Congestion data is only meaningful for the 15-minute slot of the week in
//! which it was fetched. The bucket is part of every tile-store key, so a
//! lookup in a new slot is a miss by construction.

use std::fmt;

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Weekday};

/// Width of a bucket in minutes.
pub const BUCKET_MINUTES: u8 = 15;

/// A (day-of-week, hour, minute-slot) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBucket {
    pub day_of_week: Weekday,
    /// 0-23
    pub hour: u8,
    /// 0, 15, 30 or 45
    pub minute: u8,
}

impl TimeBucket {
    /// Bucket of an arbitrary timestamp, in that timestamp's own zone.
    pub fn from_datetime<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        Self {
            day_of_week: time.weekday(),
            hour: time.hour() as u8,
            minute: (time.minute() as u8 / BUCKET_MINUTES) * BUCKET_MINUTES,
        }
    }

    /// Bucket of the current local wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Full English day name, e.g. `Monday`.
    pub fn day_name(&self) -> &'static str {
        match self.day_of_week {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:{:02}", self.day_name(), self.hour, self.minute)
    }
}
