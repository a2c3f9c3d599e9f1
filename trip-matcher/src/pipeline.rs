//! One day's correlation, from journeys and trips to rows.

use std::collections::BTreeSet;

use tracing::info;

use crate::correlate::{DaySummary, Row, StopDescriber, expand, summarise};
use crate::detect::{DetectorConfig, StopLocator, annotate_trips};
use crate::domain::{BoundingBox, ObservedTrip, ScheduledJourney, StopCode};
use crate::matcher::{MatchGroup, NearMiss, audit_keys, match_day};

/// Everything produced for one day.
#[derive(Debug, Clone)]
pub struct DayOutput {
    pub groups: Vec<MatchGroup>,
    pub rows: Vec<Row>,
    pub summary: DaySummary,
    pub near_misses: Vec<NearMiss>,
}

/// Every stop code the journeys and trips start or end at.
pub fn endpoint_stops(journeys: &[ScheduledJourney], trips: &[ObservedTrip]) -> BTreeSet<StopCode> {
    let journey_stops = journeys
        .iter()
        .flat_map(|j| [j.origin().stop.clone(), j.destination().stop.clone()]);
    let trip_stops = trips
        .iter()
        .flat_map(|t| [t.origin.clone(), t.destination.clone()]);
    journey_stops.chain(trip_stops).collect()
}

/// Whether `stop` can be located and lies inside `area`.
///
/// Stops looked up individually may sit outside the area, so being
/// locatable is not enough.
fn in_area<S>(stops: &S, area: &BoundingBox, stop: &StopCode) -> bool
where
    S: StopLocator + ?Sized,
{
    stops.locate(stop).is_some_and(|c| area.contains(c))
}

/// Keep only journeys that start or end inside `area`.
pub fn retain_local_journeys<S>(
    journeys: Vec<ScheduledJourney>,
    stops: &S,
    area: &BoundingBox,
) -> Vec<ScheduledJourney>
where
    S: StopLocator + ?Sized,
{
    let total = journeys.len();
    let local: Vec<ScheduledJourney> = journeys
        .into_iter()
        .filter(|j| {
            in_area(stops, area, &j.origin().stop) || in_area(stops, area, &j.destination().stop)
        })
        .collect();
    info!(journeys = total, local = local.len(), "Filtered journeys to area");
    local
}

/// Keep only trips that start or end inside `area`.
pub fn retain_local_trips<S>(
    trips: Vec<ObservedTrip>,
    stops: &S,
    area: &BoundingBox,
) -> Vec<ObservedTrip>
where
    S: StopLocator + ?Sized,
{
    let total = trips.len();
    let local: Vec<ObservedTrip> = trips
        .into_iter()
        .filter(|t| in_area(stops, area, &t.origin) || in_area(stops, area, &t.destination))
        .collect();
    info!(trips = total, local = local.len(), "Filtered trips to area");
    local
}

/// Detect trip endpoints, match trips to journeys, and expand the result.
pub fn correlate_day<S>(
    journeys: Vec<ScheduledJourney>,
    trips: Vec<ObservedTrip>,
    stops: &S,
    config: &DetectorConfig,
) -> DayOutput
where
    S: StopLocator + StopDescriber + Sync,
{
    let trips = annotate_trips(trips, stops, config);
    let groups = match_day(journeys, trips);
    let near_misses = audit_keys(&groups);
    let rows = expand(&groups, stops);
    let summary = summarise(&rows);

    info!(
        groups = groups.len(),
        rows = rows.len(),
        near_misses = near_misses.len(),
        "Correlated day"
    );

    DayOutput {
        groups,
        rows,
        summary,
        near_misses,
    }
}
