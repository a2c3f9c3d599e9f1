//! Domain types for timetable and telemetry correlation.
//!
//! This module contains the validated records shared by every stage of the
//! pipeline. Identifier and timestamp types enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod error;
mod geo;
mod journey;
mod stop;
mod time;
mod trip;

pub use error::DataError;
pub use geo::{BoundingBox, Coordinate, EARTH_RADIUS_M, haversine_distance};
pub use journey::{ScheduledJourney, ServiceInfo, StopVisit, StopVisits};
pub use stop::{InvalidStopCode, StopCode};
pub use time::{DepartureTime, parse_clock_time, parse_date, parse_iso_duration, parse_timestamp};
pub use trip::{ObservedTrip, PositionReport};
