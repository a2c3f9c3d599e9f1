//! Bank holiday tables.
//!
//! Each holiday date maps to its own name followed by the group names it
//! belongs to, so a profile that opts in or out of a group matches every
//! member date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel holiday name matching every bank holiday.
pub const ALL_BANK_HOLIDAYS: &str = "AllBankHolidays";

const EXCEPT_CHRISTMAS: &str = "AllHolidaysExceptChristmas";
const HOLIDAY_MONDAYS: &str = "HolidayMondays";
const CHRISTMAS: &str = "Christmas";
const DISPLACEMENT: &str = "DisplacementHolidays";

/// England and Wales bank holidays, 2017 to 2020. Scottish-only holidays are
/// left out.
const ENGLAND_AND_WALES: &[((i32, u32, u32), &[&str])] = &[
    ((2017, 1, 1), &["NewYearsDay", EXCEPT_CHRISTMAS]),
    ((2017, 4, 14), &["GoodFriday", EXCEPT_CHRISTMAS]),
    ((2017, 4, 17), &["EasterMonday", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    ((2017, 5, 1), &["MayDay", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    ((2017, 5, 29), &["SpringBank", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    (
        (2017, 8, 28),
        &["LateSummerBankHolidayNotScotland", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS],
    ),
    ((2017, 12, 25), &["ChristmasDay", CHRISTMAS]),
    ((2017, 12, 26), &["BoxingDay", CHRISTMAS]),
    ((2018, 1, 1), &["NewYearsDay", EXCEPT_CHRISTMAS]),
    ((2018, 3, 30), &["GoodFriday", EXCEPT_CHRISTMAS]),
    ((2018, 4, 2), &["EasterMonday", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    ((2018, 5, 7), &["MayDay", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    ((2018, 5, 28), &["SpringBank", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    (
        (2018, 8, 27),
        &["LateSummerBankHolidayNotScotland", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS],
    ),
    ((2018, 12, 25), &["ChristmasDay", CHRISTMAS]),
    ((2018, 12, 26), &["BoxingDay", CHRISTMAS]),
    ((2019, 1, 1), &["NewYearsDay", EXCEPT_CHRISTMAS]),
    ((2019, 4, 19), &["GoodFriday", EXCEPT_CHRISTMAS]),
    ((2019, 4, 22), &["EasterMonday", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    ((2019, 5, 6), &["MayDay", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    ((2019, 5, 27), &["SpringBank", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    (
        (2019, 8, 26),
        &["LateSummerBankHolidayNotScotland", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS],
    ),
    ((2019, 12, 25), &["ChristmasDay", CHRISTMAS]),
    ((2019, 12, 26), &["BoxingDay", CHRISTMAS]),
    ((2020, 1, 1), &["NewYearsDay", EXCEPT_CHRISTMAS]),
    ((2020, 4, 10), &["GoodFriday", EXCEPT_CHRISTMAS]),
    ((2020, 4, 13), &["EasterMonday", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    // Moved to a Friday that year
    ((2020, 5, 8), &["MayDay", EXCEPT_CHRISTMAS]),
    ((2020, 5, 25), &["SpringBank", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS]),
    (
        (2020, 8, 31),
        &["LateSummerBankHolidayNotScotland", HOLIDAY_MONDAYS, EXCEPT_CHRISTMAS],
    ),
    ((2020, 12, 25), &["ChristmasDay", CHRISTMAS]),
    ((2020, 12, 26), &["BoxingDay", CHRISTMAS]),
    ((2020, 12, 28), &["BoxingDayHoliday", DISPLACEMENT]),
];

/// A table from date to the holiday names that apply on it.
///
/// Serialized as a JSON object keyed by `YYYY-MM-DD`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use trip_matcher::calendar::BankHolidays;
///
/// let holidays = BankHolidays::england_and_wales();
/// let boxing_day = NaiveDate::from_ymd_opt(2019, 12, 26).unwrap();
/// assert!(holidays.is_named(boxing_day, "Christmas"));
/// assert!(!holidays.is_named(boxing_day, "HolidayMondays"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankHolidays(BTreeMap<NaiveDate, Vec<String>>);

impl BankHolidays {
    /// An empty table: no date is a holiday.
    pub fn none() -> Self {
        Self::default()
    }

    /// The built-in England and Wales table.
    pub fn england_and_wales() -> Self {
        ENGLAND_AND_WALES
            .iter()
            .filter_map(|&((y, m, d), names)| {
                let date = NaiveDate::from_ymd_opt(y, m, d)?;
                Some((date, names.iter().map(|n| n.to_string()).collect()))
            })
            .collect()
    }

    /// Add a holiday, replacing any names already recorded for `date`.
    pub fn insert(&mut self, date: NaiveDate, names: Vec<String>) {
        self.0.insert(date, names);
    }

    /// Names (own name first, then groups) for a holiday date.
    pub fn names_on(&self, date: NaiveDate) -> Option<&[String]> {
        self.0.get(&date).map(Vec::as_slice)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.0.contains_key(&date)
    }

    /// Whether `date` is a holiday matching `name`, either directly, through
    /// one of its groups, or through the `AllBankHolidays` sentinel.
    pub fn is_named(&self, date: NaiveDate, name: &str) -> bool {
        self.names_on(date)
            .is_some_and(|names| name == ALL_BANK_HOLIDAYS || names.iter().any(|n| n == name))
    }

    /// Whether `date` is a holiday matching any of `selected`.
    pub fn matches_any(&self, date: NaiveDate, selected: &[String]) -> bool {
        selected.iter().any(|name| self.is_named(date, name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(NaiveDate, Vec<String>)> for BankHolidays {
    fn from_iter<T: IntoIterator<Item = (NaiveDate, Vec<String>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn builtin_table_is_complete() {
        let holidays = BankHolidays::england_and_wales();
        assert_eq!(holidays.len(), ENGLAND_AND_WALES.len());
    }

    #[test]
    fn group_names() {
        let holidays = BankHolidays::england_and_wales();

        let easter_monday = date(2019, 4, 22);
        assert_eq!(
            holidays.names_on(easter_monday).unwrap(),
            ["EasterMonday", "HolidayMondays", "AllHolidaysExceptChristmas"]
        );
        assert!(holidays.is_named(easter_monday, "HolidayMondays"));
        assert!(!holidays.is_named(easter_monday, "Christmas"));

        let christmas = date(2018, 12, 25);
        assert!(holidays.is_named(christmas, "ChristmasDay"));
        assert!(holidays.is_named(christmas, "Christmas"));
        assert!(!holidays.is_named(christmas, "AllHolidaysExceptChristmas"));

        assert!(holidays.is_named(date(2020, 12, 28), "DisplacementHolidays"));
    }

    #[test]
    fn sentinel_matches_only_holidays() {
        let holidays = BankHolidays::england_and_wales();
        assert!(holidays.is_named(date(2017, 5, 29), ALL_BANK_HOLIDAYS));
        assert!(!holidays.is_named(date(2017, 5, 30), ALL_BANK_HOLIDAYS));
    }

    #[test]
    fn matches_any_selection() {
        let holidays = BankHolidays::england_and_wales();
        let selected = vec!["GoodFriday".to_string(), "BoxingDay".to_string()];
        assert!(holidays.matches_any(date(2018, 3, 30), &selected));
        assert!(holidays.matches_any(date(2018, 12, 26), &selected));
        assert!(!holidays.matches_any(date(2018, 12, 25), &selected));
        assert!(!holidays.matches_any(date(2018, 12, 25), &[]));
    }

    #[test]
    fn load_from_json() {
        let json = r#"{"2021-01-01": ["NewYearsDay", "AllHolidaysExceptChristmas"]}"#;
        let holidays: BankHolidays = serde_json::from_str(json).unwrap();
        assert!(holidays.is_named(date(2021, 1, 1), "AllHolidaysExceptChristmas"));
        assert!(!holidays.is_holiday(date(2019, 1, 1)));
    }
}
