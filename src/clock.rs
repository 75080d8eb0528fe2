//! Clock and day-key provider.
//!
//! Every "what day is it" question goes through a [`Clock`] so day rollover is
//! deterministic in tests. A [`DayKey`] is a calendar date in the local timezone,
//! rendered as `YYYY-MM-DD`.

use crate::errors::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Identifies one ledger bucket: a single calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Derives the key for an instant using the local timezone's calendar.
    #[must_use]
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self(instant.with_timezone(&Local).date_naive())
    }

    /// Parses a strict `YYYY-MM-DD` string.
    pub fn parse(value: &str) -> Result<Self> {
        NaiveDate::parse_from_str(value.trim(), DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|_| Error::InvalidDayKey {
                value: value.to_string(),
            })
    }

    /// The underlying calendar date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// The day before this one, or `None` at the start of the supported calendar.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// Midnight UTC on this date. Used as the timestamp of synthesized events.
    #[must_use]
    pub fn start_of_day_utc(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(NaiveTime::MIN))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Source of the current time.
pub trait Clock: fmt::Debug + Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// The key of the current calendar day.
    fn today(&self) -> DayKey {
        DayKey::from_instant(self.now())
    }
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant and one calendar day.
///
/// The day is stored explicitly rather than derived from the instant so that
/// tests do not depend on the host timezone.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    today: DayKey,
}

impl FixedClock {
    /// Pins the clock to noon UTC on `today`.
    #[must_use]
    pub fn on(today: DayKey) -> Self {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        Self {
            now: Utc.from_utc_datetime(&today.date().and_time(noon)),
            today,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> DayKey {
        self.today
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_day_key_round_trips_through_display() {
        let key = DayKey::parse("2024-01-31").unwrap();
        assert_eq!(key.to_string(), "2024-01-31");
        assert_eq!("2024-01-31".parse::<DayKey>().unwrap(), key);
    }

    #[test]
    fn test_day_key_rejects_garbage() {
        assert!(matches!(
            DayKey::parse("31/01/2024"),
            Err(Error::InvalidDayKey { .. })
        ));
        assert!(DayKey::parse("2024-02-30").is_err());
        assert!(DayKey::parse("").is_err());
    }

    #[test]
    fn test_previous_crosses_month_and_year() {
        let key = DayKey::parse("2024-01-01").unwrap();
        assert_eq!(key.previous().unwrap().to_string(), "2023-12-31");

        let leap = DayKey::parse("2024-03-01").unwrap();
        assert_eq!(leap.previous().unwrap().to_string(), "2024-02-29");
    }

    #[test]
    fn test_start_of_day_is_midnight_utc() {
        let key = DayKey::parse("2024-06-15").unwrap();
        assert_eq!(key.start_of_day_utc().to_rfc3339(), "2024-06-15T00:00:00+00:00");
    }

    #[test]
    fn test_day_key_serializes_as_plain_date() {
        let key = DayKey::parse("2024-06-15").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-06-15\"");
    }

    #[test]
    fn test_fixed_clock_reports_pinned_day() {
        let key = DayKey::parse("2025-12-31").unwrap();
        let clock = FixedClock::on(key);
        assert_eq!(clock.today(), key);
        assert_eq!(clock.now().to_rfc3339(), "2025-12-31T12:00:00+00:00");
    }
}
