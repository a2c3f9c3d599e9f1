//! Observed trip types.
//!
//! An `ObservedTrip` is one real vehicle run reconstructed from position
//! reports. The detector fills in `departure_position` and
//! `arrival_position`, which index into `positions`.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{BoundingBox, Coordinate, DepartureTime, StopCode};

/// One vehicle position report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub lat: f64,
    pub lon: f64,
    /// When the vehicle recorded this position
    pub recorded_at: DateTime<FixedOffset>,
    /// Heading in degrees, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    /// Operator-reported delay in seconds, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_secs: Option<i64>,
}

impl PositionReport {
    pub fn new(lat: f64, lon: f64, recorded_at: DateTime<FixedOffset>) -> Self {
        Self {
            lat,
            lon,
            recorded_at,
            bearing: None,
            delay_secs: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay_secs.map(Duration::seconds)
    }
}

/// One real vehicle run between two stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedTrip {
    /// Origin stop reference
    pub origin: StopCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_name: Option<String>,
    /// Destination stop reference
    pub destination: StopCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_name: Option<String>,
    /// Aimed departure from the origin, truncated to whole seconds
    pub aimed_departure: DepartureTime,
    pub line: String,
    pub operator: String,
    pub direction: String,
    pub vehicle: String,
    /// Position reports, ascending by `recorded_at`
    pub positions: Vec<PositionReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Index of the last report still at the origin
    #[serde(default)]
    pub departure_position: Option<usize>,
    /// Index of the first report at the destination
    #[serde(default)]
    pub arrival_position: Option<usize>,
}

impl ObservedTrip {
    /// The report marking departure from the origin, if detected.
    pub fn departure_report(&self) -> Option<&PositionReport> {
        self.departure_position.and_then(|i| self.positions.get(i))
    }

    /// The report marking arrival at the destination, if detected.
    pub fn arrival_report(&self) -> Option<&PositionReport> {
        self.arrival_position.and_then(|i| self.positions.get(i))
    }

    /// Observed departure time, if detected.
    pub fn departed_at(&self) -> Option<DateTime<FixedOffset>> {
        self.departure_report().map(|r| r.recorded_at)
    }

    /// Observed arrival time, if detected.
    pub fn arrived_at(&self) -> Option<DateTime<FixedOffset>> {
        self.arrival_report().map(|r| r.recorded_at)
    }

    /// Recompute the bounding box from the position reports.
    pub fn refresh_bounding_box(&mut self) {
        self.bounding_box = BoundingBox::enclosing(self.positions.iter().map(|p| p.coordinate()));
    }
}
