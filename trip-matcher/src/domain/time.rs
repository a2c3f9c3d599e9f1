//! Time handling for timetable and telemetry data.
//!
//! Timetables give clock times ("HH:MM:SS") and ISO 8601 run-time
//! durations ("PT2M30S"). Telemetry feeds give RFC 3339 timestamps whose
//! precision and UTC offset vary between feeds. This module normalises both
//! into whole-second, zone-aware instants so that keys built from either
//! source compare equal when they describe the same departure.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Timelike,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::DataError;

/// A departure instant, truncated to whole seconds.
///
/// Equality, ordering and hashing are by instant, so the same departure
/// reported as `08:00:00+01:00` and `07:00:00.250Z` compares equal once
/// constructed. The original UTC offset is kept for display.
///
/// # Examples
///
/// ```
/// use trip_matcher::domain::DepartureTime;
///
/// let a = DepartureTime::parse("2017-10-25T08:00:00+01:00").unwrap();
/// let b = DepartureTime::parse("2017-10-25T07:00:00.250Z").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "2017-10-25T08:00:00+01:00");
/// ```
#[derive(Clone, Copy)]
pub struct DepartureTime(DateTime<FixedOffset>);

impl DepartureTime {
    /// Create a departure time, dropping any sub-second component.
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self(truncate_to_seconds(instant))
    }

    /// Parse an RFC 3339 timestamp.
    pub fn parse(s: &str) -> Result<Self, DataError> {
        Ok(Self::new(parse_timestamp(s)?))
    }

    /// Build a departure time from a local date and clock time in `tz`.
    ///
    /// Ambiguous local times (the repeated hour when clocks go back) resolve
    /// to the earlier instant. Times in the spring-forward gap are an error.
    pub fn from_local<Tz: TimeZone>(
        date: NaiveDate,
        time: NaiveTime,
        tz: &Tz,
    ) -> Result<Self, DataError> {
        let local = date.and_time(time);
        let instant = tz
            .from_local_datetime(&local)
            .earliest()
            .ok_or(DataError::NonexistentLocalTime(local))?;
        Ok(Self::new(instant.fixed_offset()))
    }

    /// Returns the underlying zone-aware instant.
    pub fn as_datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// Returns the local calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Returns the local clock time.
    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    /// Returns the duration between two departures.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        self.0.signed_duration_since(other.0)
    }
}

impl PartialEq for DepartureTime {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for DepartureTime {}

impl Hash for DepartureTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.naive_utc().hash(state);
    }
}

impl Ord for DepartureTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for DepartureTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<DateTime<FixedOffset>> for DepartureTime {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DepartureTime({self})")
    }
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, false))
    }
}

impl Serialize for DepartureTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DepartureTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DepartureTime::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse an RFC 3339 timestamp, keeping its UTC offset.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, DataError> {
    DateTime::parse_from_rfc3339(s).map_err(|e| DataError::InvalidTimestamp {
        value: s.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> Result<NaiveDate, DataError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| DataError::InvalidDate {
        value: s.to_string(),
    })
}

/// Parse a timetable clock time in `HH:MM:SS` form.
///
/// # Examples
///
/// ```
/// use trip_matcher::domain::parse_clock_time;
///
/// assert!(parse_clock_time("07:12:00").is_ok());
/// assert!(parse_clock_time("23:59:59").is_ok());
///
/// assert!(parse_clock_time("07:12").is_err());
/// assert!(parse_clock_time("24:00:00").is_err());
/// ```
pub fn parse_clock_time(s: &str) -> Result<NaiveTime, DataError> {
    let invalid = |reason: &str| DataError::InvalidTimestamp {
        value: s.to_string(),
        reason: reason.to_string(),
    };

    // Must be exactly 8 characters: HH:MM:SS
    let bytes = s.as_bytes();
    if bytes.len() != 8 {
        return Err(invalid("expected HH:MM:SS format"));
    }
    if bytes[2] != b':' || bytes[5] != b':' {
        return Err(invalid("expected colons at positions 2 and 5"));
    }

    let hour = parse_two_digits(&bytes[0..2]).ok_or_else(|| invalid("invalid hour digits"))?;
    let minute = parse_two_digits(&bytes[3..5]).ok_or_else(|| invalid("invalid minute digits"))?;
    let second = parse_two_digits(&bytes[6..8]).ok_or_else(|| invalid("invalid second digits"))?;

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| invalid("time out of range"))
}

/// Parse an ISO 8601 time duration such as `PT2M30S` or `-PT33S`.
///
/// Only the time designators (`H`, `M`, `S`) are supported; timetable run
/// times and SIRI delays never use date components. Fractional seconds
/// are truncated.
///
/// # Examples
///
/// ```
/// use trip_matcher::domain::parse_iso_duration;
/// use chrono::Duration;
///
/// assert_eq!(parse_iso_duration("PT2M30S").unwrap(), Duration::seconds(150));
/// assert_eq!(parse_iso_duration("-PT33S").unwrap(), Duration::seconds(-33));
/// assert_eq!(parse_iso_duration("PT1H").unwrap(), Duration::hours(1));
/// assert!(parse_iso_duration("P1D").is_err());
/// ```
pub fn parse_iso_duration(s: &str) -> Result<Duration, DataError> {
    let invalid = || DataError::InvalidDuration(s.to_string());

    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let body = rest.strip_prefix("PT").ok_or_else(invalid)?;
    if body.is_empty() {
        return Err(invalid());
    }

    let mut seconds: i64 = 0;
    let mut number = String::new();
    for c in body.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'H' | 'M' | 'S' => {
                let value: f64 = number.parse().map_err(|_| invalid())?;
                let unit = match c {
                    'H' => 3600.0,
                    'M' => 60.0,
                    _ => 1.0,
                };
                seconds += (value * unit) as i64;
                number.clear();
            }
            _ => return Err(invalid()),
        }
    }
    if !number.is_empty() {
        return Err(invalid());
    }

    let duration = Duration::seconds(seconds);
    Ok(if negative { -duration } else { duration })
}

fn truncate_to_seconds(instant: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    // with_nanosecond(0) is always in range
    instant.with_nanosecond(0).unwrap_or(instant)
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
