//! Departure and arrival detection for a single trip.

use crate::domain::{Coordinate, PositionReport};

use super::DetectorConfig;

/// Detected endpoint indices into a trip's position reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Endpoints {
    /// Last report still at the origin before the vehicle left
    pub departure: Option<usize>,
    /// First report at the destination
    pub arrival: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepartureState {
    BeforeDeparture,
    AtOrigin,
    Departed,
}

/// Find the departure and arrival reports of one trip.
///
/// The vehicle is at a stop while its great-circle distance to the stop is
/// below `config.threshold_m`. Departure is the report before the first one
/// that leaves the origin after having been at it. Arrival is the first
/// report at the destination; if there is none, the final report alone is
/// tried once more against the relaxed threshold.
///
/// Either index may be `None` when the reports are too sparse to tell.
pub fn detect_endpoints(
    positions: &[PositionReport],
    origin: Coordinate,
    destination: Coordinate,
    config: &DetectorConfig,
) -> Endpoints {
    let threshold = config.threshold_m;
    let mut state = DepartureState::BeforeDeparture;
    let mut endpoints = Endpoints::default();

    for (index, position) in positions.iter().enumerate() {
        let here = position.coordinate();
        let origin_distance = here.distance_to(&origin);

        match state {
            DepartureState::BeforeDeparture if origin_distance < threshold => {
                state = DepartureState::AtOrigin;
            }
            DepartureState::AtOrigin if origin_distance > threshold => {
                state = DepartureState::Departed;
                // Entering AtOrigin consumed an earlier report, so index >= 1
                endpoints.departure = Some(index - 1);
            }
            _ => {}
        }

        if endpoints.arrival.is_none() && here.distance_to(&destination) < threshold {
            endpoints.arrival = Some(index);
        }
    }

    if endpoints.arrival.is_none()
        && let Some(last) = positions.last()
        && last.coordinate().distance_to(&destination) < config.relaxed_threshold_m()
    {
        endpoints.arrival = Some(positions.len() - 1);
    }

    endpoints
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn config(threshold_m: f64) -> DetectorConfig {
        DetectorConfig::with_threshold(threshold_m)
    }

    #[test]
    fn departure_is_last_report_at_origin() {
        let positions = vec![
            north_of(MILTON, 10.0, minute(0)),
            north_of(MILTON, 20.0, minute(1)),
            between(MILTON, DRUMMER_ST, 0.1, minute(2)),
            between(MILTON, DRUMMER_ST, 0.3, minute(3)),
            between(MILTON, DRUMMER_ST, 0.5, minute(4)),
            between(MILTON, DRUMMER_ST, 0.7, minute(5)),
            between(MILTON, DRUMMER_ST, 0.9, minute(6)),
            north_of(DRUMMER_ST, 30.0, minute(7)),
            north_of(DRUMMER_ST, 5.0, minute(8)),
        ];

        let endpoints = detect_endpoints(&positions, MILTON, DRUMMER_ST, &config(50.0));
        assert_eq!(
            endpoints,
            Endpoints {
                departure: Some(1),
                arrival: Some(7)
            }
        );
    }

    #[test]
    fn lingering_at_origin() {
        // Three reports at the stop; the fourth has left
        let positions = vec![
            north_of(MILTON, 0.0, minute(0)),
            north_of(MILTON, 15.0, minute(1)),
            north_of(MILTON, 30.0, minute(2)),
            north_of(MILTON, 400.0, minute(3)),
            north_of(DRUMMER_ST, 0.0, minute(20)),
        ];
        let endpoints = detect_endpoints(&positions, MILTON, DRUMMER_ST, &config(50.0));
        assert_eq!(endpoints.departure, Some(2));
        assert_eq!(endpoints.arrival, Some(4));
    }

    #[test]
    fn never_at_origin() {
        let positions = vec![
            north_of(MILTON, 500.0, minute(0)),
            north_of(MILTON, 900.0, minute(1)),
            north_of(DRUMMER_ST, 10.0, minute(15)),
        ];
        let endpoints = detect_endpoints(&positions, MILTON, DRUMMER_ST, &config(100.0));
        assert_eq!(endpoints.departure, None);
        assert_eq!(endpoints.arrival, Some(2));
    }

    #[test]
    fn never_leaves_origin() {
        let positions = vec![
            north_of(MILTON, 0.0, minute(0)),
            north_of(MILTON, 10.0, minute(1)),
        ];
        let endpoints = detect_endpoints(&positions, MILTON, DRUMMER_ST, &config(100.0));
        assert_eq!(endpoints, Endpoints::default());
    }

    #[test]
    fn relaxed_retry_on_final_report() {
        let positions = vec![
            north_of(MILTON, 0.0, minute(0)),
            north_of(MILTON, 300.0, minute(1)),
            north_of(DRUMMER_ST, 150.0, minute(15)),
        ];
        let endpoints = detect_endpoints(&positions, MILTON, DRUMMER_ST, &config(100.0));
        assert_eq!(endpoints.departure, Some(0));
        assert_eq!(endpoints.arrival, Some(2));
    }

    #[test]
    fn relaxed_retry_only_checks_final_report() {
        // Passes within the relaxed distance earlier, but ends further away
        let positions = vec![
            north_of(MILTON, 0.0, minute(0)),
            north_of(DRUMMER_ST, 150.0, minute(14)),
            north_of(DRUMMER_ST, 250.0, minute(15)),
        ];
        let endpoints = detect_endpoints(&positions, MILTON, DRUMMER_ST, &config(100.0));
        assert_eq!(endpoints.arrival, None);
    }

    #[test]
    fn empty_trip() {
        let endpoints = detect_endpoints(&[], MILTON, DRUMMER_ST, &DetectorConfig::default());
        assert_eq!(endpoints, Endpoints::default());
    }

    #[test]
    fn first_arrival_wins() {
        let positions = vec![
            north_of(MILTON, 0.0, minute(0)),
            north_of(MILTON, 500.0, minute(1)),
            north_of(DRUMMER_ST, 20.0, minute(15)),
            north_of(DRUMMER_ST, 0.0, minute(16)),
        ];
        let endpoints = detect_endpoints(&positions, MILTON, DRUMMER_ST, &config(100.0));
        assert_eq!(endpoints.arrival, Some(2));
    }
}
