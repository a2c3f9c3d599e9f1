//! Day-of-week sets and regular operating days.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::domain::DataError;

/// Marker name for a profile that only runs on bank holidays.
pub const HOLIDAYS_ONLY: &str = "HolidaysOnly";

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A set of weekdays, stored as a bitmask indexed from Monday.
///
/// # Examples
///
/// ```
/// use chrono::Weekday;
/// use trip_matcher::calendar::DaysOfWeek;
///
/// let days = DaysOfWeek::parse_names(["MondayToFriday"]).unwrap();
/// assert!(days.contains(Weekday::Wed));
/// assert!(!days.contains(Weekday::Sat));
///
/// let weekend = DaysOfWeek::parse_names(["Weekend"]).unwrap();
/// assert_eq!(weekend.len(), 2);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self(0x7f)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Days in the set, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_DAYS.into_iter().filter(|d| self.contains(*d))
    }

    /// Parse a list of schema day names into a set.
    ///
    /// Accepts single day names (`"Tuesday"`), inclusive ranges
    /// (`"MondayToFriday"`) and `"Weekend"`.
    pub fn parse_names<I, S>(names: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut days = Self::empty();
        for name in names {
            let name = name.as_ref();
            if name == "Weekend" {
                days.insert(Weekday::Sat);
                days.insert(Weekday::Sun);
            } else if let Some((from, to)) = name.split_once("To") {
                let from = parse_day_name(from).ok_or_else(|| unknown(name))?;
                let to = parse_day_name(to).ok_or_else(|| unknown(name))?;
                let (lo, hi) = (from.num_days_from_monday(), to.num_days_from_monday());
                if lo > hi {
                    return Err(unknown(name));
                }
                for day in &ALL_DAYS[lo as usize..=hi as usize] {
                    days.insert(*day);
                }
            } else {
                days.insert(parse_day_name(name).ok_or_else(|| unknown(name))?);
            }
        }
        Ok(days)
    }

    /// Canonical day names, Monday first.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|d| day_name(d).to_string()).collect()
    }
}

impl FromIterator<Weekday> for DaysOfWeek {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut days = Self::empty();
        for day in iter {
            days.insert(day);
        }
        days
    }
}

impl fmt::Debug for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

fn unknown(name: &str) -> DataError {
    DataError::UnknownWeekday(name.to_string())
}

fn parse_day_name(name: &str) -> Option<Weekday> {
    ALL_DAYS.into_iter().find(|d| day_name(*d) == name)
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// The regular-day component of an operating profile.
///
/// Serialized as a list of day names, with `["HolidaysOnly"]` for the
/// holidays-only marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum RegularDays {
    /// Runs on these days of the week
    Weekly(DaysOfWeek),
    /// Never runs on an ordinary day; only on bank holidays it opts into
    HolidaysOnly,
}

impl RegularDays {
    /// Whether this runs on `day` when no special rule applies.
    pub fn includes(&self, day: Weekday) -> bool {
        match self {
            RegularDays::Weekly(days) => days.contains(day),
            RegularDays::HolidaysOnly => false,
        }
    }

    /// True for an empty weekly set. `HolidaysOnly` counts as specified.
    pub fn is_empty(&self) -> bool {
        matches!(self, RegularDays::Weekly(days) if days.is_empty())
    }
}

impl TryFrom<Vec<String>> for RegularDays {
    type Error = DataError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        if value.iter().any(|v| v == HOLIDAYS_ONLY) {
            return Ok(RegularDays::HolidaysOnly);
        }
        DaysOfWeek::parse_names(&value).map(RegularDays::Weekly)
    }
}

impl From<RegularDays> for Vec<String> {
    fn from(value: RegularDays) -> Self {
        match value {
            RegularDays::Weekly(days) => days.names(),
            RegularDays::HolidaysOnly => vec![HOLIDAYS_ONLY.to_string()],
        }
    }
}
