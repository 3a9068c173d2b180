//! Calendar and clock handling
//!
//! Billing works on calendar dates (issue and due dates carry no time of day)
//! but is evaluated against an instant. This module provides:
//! - `Timezone`: the business timezone that decides when a date begins
//! - `Clock`: an injectable source of "now"
//! - anniversary arithmetic for annual billing periods

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Timezone wrapper for the business calendar
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Gets the instant a calendar date begins in this timezone, as UTC
    ///
    /// Where midnight does not exist locally (a DST gap) the date begins at
    /// the first instant after the gap.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        match midnight.and_local_timezone(self.0).earliest() {
            Some(local) => local.with_timezone(&Utc),
            None => {
                let shifted = midnight + chrono::Duration::hours(1);
                shifted
                    .and_local_timezone(self.0)
                    .earliest()
                    .map(|local| local.with_timezone(&Utc))
                    .unwrap_or_else(|| midnight.and_utc())
            }
        }
    }

    /// Gets the last instant of a calendar date in this timezone, as UTC
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        match date.succ_opt() {
            Some(next) => self.start_of_day(next) - chrono::Duration::nanoseconds(1),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }

    /// Returns the local calendar date at the given instant
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Returns true once `date` has begun at `now`
    pub fn has_begun(&self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        self.start_of_day(date) < now
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Date out of range: {0}")]
    OutOfRange(String),
}

/// Returns the `years`-th anniversary of `start`
///
/// Anniversaries are always measured from the original date, so a Feb 29
/// start lands on Feb 28 in common years and back on Feb 29 in leap years.
pub fn anniversary(start: NaiveDate, years: u32) -> Option<NaiveDate> {
    let months = years.checked_mul(12)?;
    start.checked_add_months(Months::new(months))
}

/// Adds whole days to a date
pub fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, TemporalError> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| TemporalError::OutOfRange(format!("{} + {} days", date, days)))
}

/// Serde adapter for calendar dates
///
/// Writes `YYYY-MM-DD`. Reads `YYYY-MM-DD` as well as full timestamps such
/// as `2022-01-10T00:00:00.000Z`, keeping only the date part.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Parses a date, tolerating a trailing time component
    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        let trimmed = raw.trim();
        let date_part = trimmed.get(..10).unwrap_or(trimmed);
        NaiveDate::parse_from_str(date_part, FORMAT)
            .map_err(|e| format!("invalid calendar date {:?}: {}", raw, e))
    }

    /// The same adapter for optional fields
    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw).map(Some).map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

/// Source of the current instant
///
/// Injected wherever "now" matters so tests can pin time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Arc::new(RwLock::new(instant)),
        }
    }

    /// Pins the clock to the start of `date` in UTC plus `hours`
    pub fn at_date(date: NaiveDate, hours: u32) -> Self {
        let instant = date.and_time(chrono::NaiveTime::MIN).and_utc()
            + chrono::Duration::hours(i64::from(hours));
        Self::new(instant)
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = match self.instant.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = instant;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let next = self.now() + by;
        self.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.instant.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
