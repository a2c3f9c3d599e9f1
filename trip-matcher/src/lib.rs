//! Timetable to telemetry correlation.
//!
//! Answers, for one day: which timetabled bus journeys actually ran, and
//! how late were they? Scheduled journeys and observed vehicle trips are
//! matched on departure time, origin and destination, and each pairing is
//! expanded into a row carrying departure and arrival delays.

pub mod calendar;
pub mod correlate;
pub mod detect;
pub mod domain;
pub mod matcher;
pub mod pipeline;
pub mod report;
pub mod stops;
pub mod telemetry;
pub mod timetable;
