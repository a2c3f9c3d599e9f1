//! Calendar rules for deciding whether a service runs on a date.
//!
//! An [`OperatingProfile`] layers explicit date ranges and bank holiday
//! rules over a weekly pattern. Bank holidays come from an explicit
//! [`BankHolidays`] table rather than a process-wide constant, so a run can
//! supply its own.

mod days;
mod holidays;
mod profile;
mod range;

pub use days::{DaysOfWeek, HOLIDAYS_ONLY, RegularDays};
pub use holidays::{ALL_BANK_HOLIDAYS, BankHolidays};
pub use profile::{OperatingProfile, ServicePeriod};
pub use range::DateRange;
