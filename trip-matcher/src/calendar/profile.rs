//! Operating profiles: when a service or journey runs.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{BankHolidays, DateRange, RegularDays};
use crate::domain::DataError;

/// When an entity runs.
///
/// Every field is optional: `None` means "not specified here, inherit from
/// the parent". Call [`defaults_from`](Self::defaults_from) once with the
/// parent's profile before evaluating a child with
/// [`should_show`](Self::should_show).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatingProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_days: Option<RegularDays>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonoperation_date_ranges: Option<Vec<DateRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_date_ranges: Option<Vec<DateRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonoperation_bank_holidays: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_bank_holidays: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    resolved: bool,
}

impl OperatingProfile {
    /// A profile that runs on the given regular days with no exceptions.
    pub fn weekly(regular_days: RegularDays) -> Self {
        Self {
            regular_days: Some(regular_days),
            ..Self::default()
        }
    }

    /// Whether an entity with this profile runs on `date`.
    ///
    /// Precedence, highest first: non-operation date ranges, non-operation
    /// bank holidays, operation date ranges, operation bank holidays, then
    /// the regular days of the week.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use trip_matcher::calendar::{BankHolidays, DaysOfWeek, OperatingProfile, RegularDays};
    ///
    /// let days = DaysOfWeek::parse_names(["MondayToFriday"]).unwrap();
    /// let profile = OperatingProfile::weekly(RegularDays::Weekly(days));
    /// let holidays = BankHolidays::england_and_wales();
    ///
    /// let wednesday = NaiveDate::from_ymd_opt(2019, 3, 20).unwrap();
    /// let saturday = NaiveDate::from_ymd_opt(2019, 3, 23).unwrap();
    /// assert!(profile.should_show(wednesday, &holidays));
    /// assert!(!profile.should_show(saturday, &holidays));
    /// ```
    pub fn should_show(&self, date: NaiveDate, holidays: &BankHolidays) -> bool {
        if any_contains(&self.nonoperation_date_ranges, date) {
            return false;
        }
        if holidays.matches_any(date, slice(&self.nonoperation_bank_holidays)) {
            return false;
        }
        if any_contains(&self.operation_date_ranges, date) {
            return true;
        }
        if holidays.matches_any(date, slice(&self.operation_bank_holidays)) {
            return true;
        }
        self.regular_days
            .is_some_and(|days| days.includes(date.weekday()))
    }

    /// Fill every absent or empty field from `parent`.
    ///
    /// This may be applied once per profile; merging from a second parent
    /// would silently mix two inheritance chains.
    pub fn defaults_from(&mut self, parent: &OperatingProfile) -> Result<(), DataError> {
        if self.resolved {
            return Err(DataError::AlreadyDefaulted);
        }

        if self.regular_days.is_none_or(|d| d.is_empty()) {
            self.regular_days = parent.regular_days;
        }
        inherit(
            &mut self.nonoperation_date_ranges,
            &parent.nonoperation_date_ranges,
        );
        inherit(&mut self.operation_date_ranges, &parent.operation_date_ranges);
        inherit(
            &mut self.nonoperation_bank_holidays,
            &parent.nonoperation_bank_holidays,
        );
        inherit(
            &mut self.operation_bank_holidays,
            &parent.operation_bank_holidays,
        );

        self.resolved = true;
        Ok(())
    }

    /// Whether [`defaults_from`](Self::defaults_from) has been applied.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

fn inherit<T: Clone>(field: &mut Option<Vec<T>>, parent: &Option<Vec<T>>) {
    if field.as_ref().is_none_or(Vec::is_empty) {
        field.clone_from(parent);
    }
}

fn slice<T>(field: &Option<Vec<T>>) -> &[T] {
    field.as_deref().unwrap_or_default()
}

fn any_contains(ranges: &Option<Vec<DateRange>>, date: NaiveDate) -> bool {
    slice(ranges).iter().any(|r| r.contains(date))
}

/// A service's operating period. Journeys are only instantiated for days
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServicePeriod(DateRange);

impl ServicePeriod {
    pub fn new(range: DateRange) -> Self {
        Self(range)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(date)
    }

    pub fn range(&self) -> DateRange {
        self.0
    }
}
