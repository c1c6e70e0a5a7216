//! Time handling for availability slots.
//!
//! This module provides [`DisplayZone`], the calendar zone used to derive the
//! `date`/`time` of a slot, [`TimeWindow`] for defining query ranges, and the
//! millisecond `Z` formatting used on the wire.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced while parsing time configuration or query bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The zone name is neither `local`, `utc`, nor a known IANA identifier.
    #[error("unknown time zone: {0}")]
    UnknownZone(String),

    /// The instant could not be parsed as ISO-8601.
    #[error("invalid instant: {0}")]
    InvalidInstant(String),

    /// The window end is before its start.
    #[error("time window start {start} is after end {end}")]
    InvertedWindow { start: String, end: String },
}

/// The calendar zone in which slot dates and times are displayed.
///
/// `Local` follows the host's configured zone, which is how slots were
/// historically grouped. A named zone pins grouping to a business location
/// regardless of where the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The host's local zone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
    /// An IANA zone such as `Asia/Jerusalem`.
    Named(Tz),
}

impl DisplayZone {
    /// Converts a UTC instant to wall-clock time in this zone.
    pub fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Local => instant.with_timezone(&chrono::Local).naive_local(),
            Self::Utc => instant.naive_utc(),
            Self::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Returns the configuration name of this zone.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Utc => "UTC",
            Self::Named(tz) => tz.name(),
        }
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DisplayZone {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(Self::Utc);
        }
        trimmed
            .parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| TimeError::UnknownZone(trimmed.to_string()))
    }
}

impl Serialize for DisplayZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for DisplayZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an ISO-8601 instant.
///
/// Offsets are honoured; a timestamp without an offset is taken as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Serde adapter writing instants with millisecond precision and a `Z` suffix.
pub mod instant_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_instant(*dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_instant(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid instant: {raw}")))
    }
}

/// A time window for querying free slots.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    #[serde(with = "instant_millis")]
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    #[serde(with = "instant_millis")]
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a time window, rejecting inverted bounds.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeError> {
        if start > end {
            return Err(TimeError::InvertedWindow {
                start: format_instant(start),
                end: format_instant(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Creates a time window from a start time and duration.
    ///
    /// The end saturates at the latest representable instant.
    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> Self {
        let end = start
            .checked_add_signed(duration.max(Duration::zero()))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start, end }
    }

    /// Creates the window `[now, now + days)` with `now` truncated to the minute.
    ///
    /// Negative `days` give an empty window; ranges past the representable
    /// calendar end there.
    pub fn upcoming(now: DateTime<Utc>, days: i64) -> Self {
        let start = now
            .with_second(0)
            .and_then(|dt| dt.with_nanosecond(0))
            .unwrap_or(now);
        let duration = Duration::try_days(days.max(0)).unwrap_or(Duration::MAX);
        Self::from_duration(start, duration)
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    mod display_zone {
        use super::*;

        #[test]
        fn parses_known_names() {
            assert_eq!("local".parse::<DisplayZone>().unwrap(), DisplayZone::Local);
            assert_eq!("".parse::<DisplayZone>().unwrap(), DisplayZone::Local);
            assert_eq!("UTC".parse::<DisplayZone>().unwrap(), DisplayZone::Utc);
            assert_eq!(
                "Asia/Jerusalem".parse::<DisplayZone>().unwrap(),
                DisplayZone::Named(chrono_tz::Asia::Jerusalem)
            );
        }

        #[test]
        fn rejects_unknown_zone() {
            let err = "Mars/Olympus".parse::<DisplayZone>().unwrap_err();
            assert_eq!(err, TimeError::UnknownZone("Mars/Olympus".to_string()));
        }

        #[test]
        fn named_zone_shifts_wall_clock() {
            let zone = DisplayZone::Named(chrono_tz::Asia::Jerusalem);
            // Winter: UTC+2
            let wall = zone.wall_clock(utc(2025, 12, 28, 23, 30, 0));
            assert_eq!(wall.date(), NaiveDate::from_ymd_opt(2025, 12, 29).unwrap());
            assert_eq!(wall.format("%H:%M").to_string(), "01:30");
        }

        #[test]
        fn utc_zone_is_identity() {
            let wall = DisplayZone::Utc.wall_clock(utc(2025, 12, 28, 9, 0, 0));
            assert_eq!(wall, utc(2025, 12, 28, 9, 0, 0).naive_utc());
        }

        #[test]
        fn serde_uses_zone_name() {
            let zone = DisplayZone::Named(chrono_tz::Europe::Paris);
            let json = serde_json::to_string(&zone).unwrap();
            assert_eq!(json, "\"Europe/Paris\"");
            let parsed: DisplayZone = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, zone);
        }
    }

    mod instants {
        use super::*;

        #[test]
        fn formats_with_millis_and_z() {
            assert_eq!(
                format_instant(utc(2025, 12, 28, 9, 0, 0)),
                "2025-12-28T09:00:00.000Z"
            );
        }

        #[test]
        fn parses_rfc3339_and_offsets() {
            assert_eq!(
                parse_instant("2025-12-28T09:00:00.000Z"),
                Some(utc(2025, 12, 28, 9, 0, 0))
            );
            assert_eq!(
                parse_instant("2025-12-28T11:00:00+02:00"),
                Some(utc(2025, 12, 28, 9, 0, 0))
            );
        }

        #[test]
        fn parses_naive_as_utc() {
            assert_eq!(
                parse_instant("2025-12-28T09:00:00"),
                Some(utc(2025, 12, 28, 9, 0, 0))
            );
        }

        #[test]
        fn rejects_garbage() {
            assert_eq!(parse_instant(""), None);
            assert_eq!(parse_instant("tomorrow"), None);
            assert_eq!(parse_instant("2025-13-40T99:00:00Z"), None);
        }
    }

    mod time_window {
        use super::*;

        #[test]
        fn creation() {
            let start = utc(2025, 2, 5, 9, 0, 0);
            let end = utc(2025, 2, 5, 17, 0, 0);
            let window = TimeWindow::new(start, end);
            assert_eq!(window.duration(), Duration::hours(8));
        }

        #[test]
        #[should_panic(expected = "start must be <= end")]
        fn invalid_window() {
            TimeWindow::new(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 9, 0, 0));
        }

        #[test]
        fn try_new_rejects_inverted() {
            let result = TimeWindow::try_new(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 9, 0, 0));
            assert!(matches!(result, Err(TimeError::InvertedWindow { .. })));
        }

        #[test]
        fn upcoming_truncates_to_minute() {
            let now = utc(2025, 2, 5, 10, 17, 42) + Duration::milliseconds(250);
            let window = TimeWindow::upcoming(now, 30);
            assert_eq!(window.start, utc(2025, 2, 5, 10, 17, 0));
            assert_eq!(window.duration(), Duration::days(30));
        }

        #[test]
        fn upcoming_saturates_huge_ranges() {
            let now = utc(2025, 2, 5, 10, 17, 0);
            let window = TimeWindow::upcoming(now, 100_000_000);
            assert_eq!(window.start, now);
            assert_eq!(window.end, DateTime::<Utc>::MAX_UTC);

            let window = TimeWindow::upcoming(now, i64::MAX);
            assert_eq!(window.end, DateTime::<Utc>::MAX_UTC);
        }

        #[test]
        fn upcoming_negative_days_is_empty() {
            let window = TimeWindow::upcoming(utc(2025, 2, 5, 10, 17, 0), -3);
            assert_eq!(window.duration(), Duration::zero());
        }

        #[test]
        fn contains_is_half_open() {
            let window = TimeWindow::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));
            assert!(window.contains(utc(2025, 2, 5, 9, 0, 0)));
            assert!(!window.contains(utc(2025, 2, 5, 17, 0, 0)));
        }

        #[test]
        fn serializes_bounds_as_millis() {
            let window = TimeWindow::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));
            let json = serde_json::to_string(&window).unwrap();
            assert!(json.contains("2025-02-05T09:00:00.000Z"));
            let parsed: TimeWindow = serde_json::from_str(&json).unwrap();
            assert_eq!(window, parsed);
        }
    }
}
