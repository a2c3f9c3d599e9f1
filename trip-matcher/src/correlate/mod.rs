//! Expanding match groups into one row per journey/trip pairing.
//!
//! Each row carries the departure and arrival delays of its trip against
//! its journey, human-readable stop descriptions, and a separator glyph
//! that brackets the rows of one group when printed.

mod rows;
mod separator;
mod summary;

use crate::domain::StopCode;

pub use rows::{Row, delays, expand};
pub use separator::Separator;
pub use summary::{DaySummary, describe_type, summarise};

#[cfg(test)]
pub(crate) use rows::fixtures;

/// Turns stop codes into human-readable descriptions.
pub trait StopDescriber {
    fn describe(&self, stop: &StopCode) -> String;
}

impl<F> StopDescriber for F
where
    F: Fn(&StopCode) -> String,
{
    fn describe(&self, stop: &StopCode) -> String {
        self(stop)
    }
}
