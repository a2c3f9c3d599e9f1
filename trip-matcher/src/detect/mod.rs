//! Position event detection.
//!
//! Turns irregular streams of vehicle position reports into discrete
//! events: the report where a trip left its origin and the report where it
//! reached its destination, or whole origin-to-destination runs carved out
//! of a vehicle's day.

mod config;
mod segment;
mod trip;

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{Coordinate, ObservedTrip, StopCode};

pub use config::DetectorConfig;
pub use segment::{Segment, extract_segments};
pub use trip::{Endpoints, detect_endpoints};

#[cfg(test)]
pub(crate) use trip::fixtures;

/// Resolves stop codes to coordinates.
pub trait StopLocator {
    fn locate(&self, stop: &StopCode) -> Option<Coordinate>;
}

impl StopLocator for HashMap<StopCode, Coordinate> {
    fn locate(&self, stop: &StopCode) -> Option<Coordinate> {
        self.get(stop).copied()
    }
}

/// Detect departure and arrival positions for every trip.
///
/// Trips are scanned in parallel and returned in their input order with
/// `departure_position` and `arrival_position` set. A trip whose origin or
/// destination cannot be located gets neither.
pub fn annotate_trips<L>(
    trips: Vec<ObservedTrip>,
    stops: &L,
    config: &DetectorConfig,
) -> Vec<ObservedTrip>
where
    L: StopLocator + Sync,
{
    let trips: Vec<ObservedTrip> = trips
        .into_par_iter()
        .map(|mut trip| {
            let endpoints = match (stops.locate(&trip.origin), stops.locate(&trip.destination)) {
                (Some(origin), Some(destination)) => {
                    detect_endpoints(&trip.positions, origin, destination, config)
                }
                (origin, destination) => {
                    debug!(
                        origin = %trip.origin,
                        destination = %trip.destination,
                        origin_known = origin.is_some(),
                        destination_known = destination.is_some(),
                        "Stop location unknown, skipping detection"
                    );
                    Endpoints::default()
                }
            };
            trip.departure_position = endpoints.departure;
            trip.arrival_position = endpoints.arrival;
            trip
        })
        .collect();

    info!(
        trips = trips.len(),
        departures = trips.iter().filter(|t| t.departure_position.is_some()).count(),
        arrivals = trips.iter().filter(|t| t.arrival_position.is_some()).count(),
        "Annotated trips"
    );

    trips
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::domain::{DepartureTime, PositionReport};

    fn stop(s: &str) -> StopCode {
        StopCode::parse(s).unwrap()
    }

    fn trip(origin: &str, destination: &str, positions: Vec<PositionReport>) -> ObservedTrip {
        ObservedTrip {
            origin: stop(origin),
            origin_name: None,
            destination: stop(destination),
            destination_name: None,
            aimed_departure: DepartureTime::new(minute(0)),
            line: "PR5".into(),
            operator: "SCCM".into(),
            direction: "INBOUND".into(),
            vehicle: "SCCM-19597".into(),
            positions,
            bounding_box: None,
            departure_position: None,
            arrival_position: None,
        }
    }

    fn locations() -> HashMap<StopCode, Coordinate> {
        HashMap::from([
            (stop("0500SMILT010"), MILTON),
            (stop("0500CCITY486"), DRUMMER_ST),
        ])
    }

    fn positions() -> Vec<PositionReport> {
        vec![
            north_of(MILTON, 0.0, minute(0)),
            north_of(MILTON, 500.0, minute(2)),
            north_of(DRUMMER_ST, 10.0, minute(20)),
        ]
    }

    #[test]
    fn annotates_in_input_order() {
        let trips = vec![
            trip("0500SMILT010", "0500CCITY486", positions()),
            trip("0500CCITY486", "0500SMILT010", positions()),
            trip("0500SMILT010", "0500CCITY486", vec![]),
        ];

        let annotated = annotate_trips(trips, &locations(), &DetectorConfig::default());

        assert_eq!(annotated.len(), 3);
        assert_eq!(annotated[0].departure_position, Some(0));
        assert_eq!(annotated[0].arrival_position, Some(2));
        // Reversed direction: never near its origin first, arrives at start
        assert_eq!(annotated[1].origin.as_str(), "0500CCITY486");
        assert_eq!(annotated[1].arrival_position, Some(0));
        assert_eq!(annotated[2].departure_position, None);
        assert_eq!(annotated[2].arrival_position, None);
    }

    #[test]
    fn unknown_stop_leaves_trip_unannotated() {
        let trips = vec![trip("0500SMILT010", "0500XXXXX999", positions())];
        let annotated = annotate_trips(trips, &locations(), &DetectorConfig::default());

        assert_eq!(annotated[0].departure_position, None);
        assert_eq!(annotated[0].arrival_position, None);
        assert_eq!(annotated[0].positions.len(), 3);
    }
}
