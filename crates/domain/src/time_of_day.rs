use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// A wall-clock time with minute resolution, as a `Reminder` is scheduled at
/// every day. Rendered and stored as zero-padded 24 hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTimeOfDayError {
    #[error("Time of day: `{0}` is not formatted as HH:MM")]
    Malformed(String),
    #[error("Time of day: `{0}` is out of range")]
    OutOfRange(String),
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, InvalidTimeOfDayError> {
        if hour > 23 || minute > 59 {
            return Err(InvalidTimeOfDayError::OutOfRange(format!(
                "{}:{}",
                hour, minute
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// The local time of day of `instant` in `tz`
    pub fn of(instant: &DateTime<Utc>, tz: &Tz) -> Self {
        let local = instant.with_timezone(tz);
        Self {
            hour: local.hour(),
            minute: local.minute(),
        }
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = InvalidTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidTimeOfDayError::Malformed(s.to_string());
        let (hour, minute) = s.split_once(':').ok_or_else(malformed)?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(malformed());
        }
        if !hour.chars().chain(minute.chars()).all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let hour = hour.parse::<u32>().map_err(|_| malformed())?;
        let minute = minute.parse::<u32>().map_err(|_| malformed())?;
        Self::new(hour, minute).map_err(|_| InvalidTimeOfDayError::OutOfRange(s.to_string()))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TimeOfDayVisitor;

        impl<'de> Visitor<'de> for TimeOfDayVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A time of day formatted as HH:MM")
            }

            fn visit_str<E>(self, value: &str) -> Result<TimeOfDay, E>
            where
                E: serde::de::Error,
            {
                value.parse::<TimeOfDay>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimeOfDayVisitor)
    }
}

/// The time of day a `Reminder` must be scheduled at for it to be due when
/// polling at `now`, i.e. `lead_minutes` after `now` in the local time of `tz`.
/// Date rollover is not tracked, 23:55 with a 20 minute lead gives 00:15.
/// Only the lead modulo a day matters, so any `lead_minutes` is accepted.
pub fn target_time_of_day(now: &DateTime<Utc>, lead_minutes: i64, tz: &Tz) -> TimeOfDay {
    let lead = Duration::minutes(lead_minutes.rem_euclid(MINUTES_PER_DAY));
    let target = now.checked_add_signed(lead).unwrap_or(*now);
    TimeOfDay::of(&target, tz)
}

const MINUTES_PER_DAY: i64 = 24 * 60;

/// The calendar date of `instant` in the local time of `tz`
pub fn local_date(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Whether a notification has already been delivered on `today`.
///
/// Grained by calendar date and not by interval: a notification delivered
/// late yesterday does not block one today. `today` must be derived with the
/// same `tz`, see [`local_date`].
pub fn is_already_notified_today(
    last_notified_at: Option<&DateTime<Utc>>,
    today: &NaiveDate,
    tz: &Tz,
) -> bool {
    match last_notified_at {
        Some(last_notified_at) => local_date(last_notified_at, tz) == *today,
        None => false,
    }
}
