//! Inclusive date ranges.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DataError, parse_date};

/// An inclusive date range with an optional open end.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use trip_matcher::calendar::DateRange;
///
/// let range = DateRange::parse("2019-03-01", Some("2019-03-31")).unwrap();
/// assert!(range.contains(NaiveDate::from_ymd_opt(2019, 3, 31).unwrap()));
/// assert!(!range.contains(NaiveDate::from_ymd_opt(2019, 4, 1).unwrap()));
///
/// assert!(DateRange::parse("2019-03-31", Some("2019-03-01")).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange", into = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, DataError> {
        if let Some(end) = end
            && end < start
        {
            return Err(DataError::InvertedDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse from `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: Option<&str>) -> Result<Self, DataError> {
        let start = parse_date(start)?;
        let end = end.map(parse_date).transpose()?;
        Self::new(start, end)
    }

    /// A range covering exactly one day.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: Some(date),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && self.end.is_none_or(|end| end >= date)
    }
}

impl fmt::Debug for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}->{}", self.start, end),
            None => write!(f, "{}->", self.start),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawDateRange {
    start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<String>,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = DataError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::parse(&raw.start, raw.end.as_deref())
    }
}

impl From<DateRange> for RawDateRange {
    fn from(range: DateRange) -> Self {
        RawDateRange {
            start: range.start.format("%Y-%m-%d").to_string(),
            end: range.end.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}
