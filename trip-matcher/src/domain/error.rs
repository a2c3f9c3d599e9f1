//! Domain error types.
//!
//! These errors represent malformed records and data inconsistencies in the
//! domain layer. They are always scoped to a single record: one bad journey
//! or trip never aborts a whole day's batch. They are distinct from API/IO
//! errors.

use chrono::{NaiveDate, NaiveDateTime};

use super::InvalidStopCode;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    /// A date string could not be parsed
    #[error("invalid date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// A timestamp string could not be parsed
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// A date range ends before it starts
    #[error("invalid date range: {end} is before {start}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    /// A day-of-week name outside the schema vocabulary
    #[error("unknown day of week: {0}")]
    UnknownWeekday(String),

    /// An ISO 8601 duration that could not be parsed
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// A local wall-clock time that does not exist in the zone (DST gap)
    #[error("local time {0} does not exist in the timetable zone")]
    NonexistentLocalTime(NaiveDateTime),

    /// Bounding box text that is not four comma-separated numbers
    #[error("invalid bounding box {0:?}: expected min_lon,min_lat,max_lon,max_lat")]
    InvalidBoundingBox(String),

    /// Stop code failed validation
    #[error(transparent)]
    InvalidStopCode(#[from] InvalidStopCode),

    /// Scheduled journey has no stop visits
    #[error("journey must have at least one stop")]
    EmptyJourney,

    /// Required field missing from a raw record
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An operating profile was defaulted from a parent more than once
    #[error("operating profile has already been defaulted from a parent")]
    AlreadyDefaulted,
}
