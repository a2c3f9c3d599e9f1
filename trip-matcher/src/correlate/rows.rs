//! Flattening match groups into display rows.

use serde::{Deserialize, Serialize};

use super::{Separator, StopDescriber};
use crate::domain::{DepartureTime, ObservedTrip, ScheduledJourney, StopCode};
use crate::matcher::{MatchGroup, MatchType};

/// One journey/trip pairing, or one unpaired side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub time: DepartureTime,
    pub origin: StopCode,
    pub origin_desc: String,
    pub destination: StopCode,
    pub destination_desc: String,
    pub journey: Option<ScheduledJourney>,
    pub separator: char,
    pub trip: Option<ObservedTrip>,
    /// Seconds late leaving the origin; negative when early
    pub departure_delay: Option<i64>,
    /// Seconds late reaching the destination; negative when early
    pub arrival_delay: Option<i64>,
}

impl Row {
    pub fn has_journey(&self) -> bool {
        self.journey.is_some()
    }

    pub fn has_trip(&self) -> bool {
        self.trip.is_some()
    }
}

/// Delays of `trip` against the timetable of `journey`, in seconds.
///
/// Each is `None` when the matching endpoint was not detected.
pub fn delays(journey: &ScheduledJourney, trip: &ObservedTrip) -> (Option<i64>, Option<i64>) {
    let departure = trip
        .departed_at()
        .map(|t| (t - journey.scheduled_departure()).num_seconds());
    let arrival = trip
        .arrived_at()
        .map(|t| (t - journey.scheduled_arrival()).num_seconds());
    (departure, arrival)
}

/// Expand groups into rows, in group order.
///
/// One-sided groups give one row per record. Two-sided groups give one row
/// per (journey, trip) pair, journeys in the outer loop.
pub fn expand<D>(groups: &[MatchGroup], stops: &D) -> Vec<Row>
where
    D: StopDescriber + ?Sized,
{
    let mut rows = Vec::new();
    for group in groups {
        expand_group(group, stops, &mut rows);
    }
    rows
}

fn expand_group<D>(group: &MatchGroup, stops: &D, rows: &mut Vec<Row>)
where
    D: StopDescriber + ?Sized,
{
    let key = group.key();
    let match_type = group.match_type();
    let separator = Separator::for_type(match_type);
    let origin_desc = stops.describe(&key.origin);
    let destination_desc = stops.describe(&key.destination);

    let (journeys, trips) = (group.journeys(), group.trips());
    let pairs: Vec<(Option<&ScheduledJourney>, Option<&ObservedTrip>)> = if trips.is_empty() {
        journeys.iter().map(|j| (Some(j), None)).collect()
    } else if journeys.is_empty() {
        trips.iter().map(|t| (None, Some(t))).collect()
    } else {
        journeys
            .iter()
            .flat_map(|j| trips.iter().map(move |t| (Some(j), Some(t))))
            .collect()
    };

    let len = pairs.len();
    for (index, (journey, trip)) in pairs.into_iter().enumerate() {
        let (departure_delay, arrival_delay) = match (journey, trip) {
            (Some(journey), Some(trip)) => delays(journey, trip),
            _ => (None, None),
        };
        rows.push(Row {
            match_type,
            time: key.time,
            origin: key.origin.clone(),
            origin_desc: origin_desc.clone(),
            destination: key.destination.clone(),
            destination_desc: destination_desc.clone(),
            journey: journey.cloned(),
            separator: separator.glyph(index, len),
            trip: trip.cloned(),
            departure_delay,
            arrival_delay,
        });
    }
}
