//! Sort-merge of journeys and trips by key.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{info, warn};

use super::{MatchGroup, MatchKey};
use crate::domain::{ObservedTrip, ScheduledJourney, StopCode};

/// Group journeys and trips by key and merge the two sorted key sets.
///
/// Every journey and every trip lands in exactly one group. Groups come
/// out in ascending key order; within a group, records keep their input
/// order.
pub fn match_day(journeys: Vec<ScheduledJourney>, trips: Vec<ObservedTrip>) -> Vec<MatchGroup> {
    let journey_count = journeys.len();
    let trip_count = trips.len();

    let journey_index = index_by(journeys, MatchKey::for_journey);
    info!(
        journeys = journey_count,
        groups = journey_index.len(),
        "Grouped journeys"
    );

    let trip_index = index_by(trips, MatchKey::for_trip);
    info!(trips = trip_count, groups = trip_index.len(), "Grouped trips");

    let mut groups = Vec::with_capacity(journey_index.len().max(trip_index.len()));
    let mut journey_keys = journey_index.into_iter().peekable();
    let mut trip_keys = trip_index.into_iter().peekable();

    loop {
        let order = match (journey_keys.peek(), trip_keys.peek()) {
            (Some((j, _)), Some((t, _))) => j.cmp(t),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };

        let group = match order {
            Ordering::Less => journey_keys
                .next()
                .and_then(|(key, journeys)| MatchGroup::new(key, journeys, Vec::new())),
            Ordering::Greater => trip_keys
                .next()
                .and_then(|(key, trips)| MatchGroup::new(key, Vec::new(), trips)),
            Ordering::Equal => match (journey_keys.next(), trip_keys.next()) {
                (Some((key, journeys)), Some((_, trips))) => MatchGroup::new(key, journeys, trips),
                _ => None,
            },
        };
        groups.extend(group);
    }

    info!(groups = groups.len(), "Merged journeys and trips");
    groups
}

fn index_by<T>(items: Vec<T>, key: impl Fn(&T) -> MatchKey) -> BTreeMap<MatchKey, Vec<T>> {
    let mut index: BTreeMap<MatchKey, Vec<T>> = BTreeMap::new();
    for item in items {
        index.entry(key(&item)).or_default().push(item);
    }
    index
}

/// A one-sided journey group and a one-sided trip group whose keys differ
/// only slightly in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearMiss {
    pub journey_key: MatchKey,
    pub trip_key: MatchKey,
    /// Trip key time minus journey key time
    pub offset_secs: i64,
}

/// Largest time difference (exclusive) reported as a near miss.
const NEAR_MISS_SECS: i64 = 60;

/// Find unmatched groups that would have matched but for a small time
/// difference, which usually means the two feeds normalise times
/// differently.
pub fn audit_keys(groups: &[MatchGroup]) -> Vec<NearMiss> {
    let mut unmatched_trips: HashMap<(&StopCode, &StopCode), Vec<&MatchKey>> = HashMap::new();
    for group in groups {
        if group.journeys().is_empty() {
            let key = group.key();
            unmatched_trips
                .entry((&key.origin, &key.destination))
                .or_default()
                .push(key);
        }
    }

    let mut misses = Vec::new();
    for group in groups.iter().filter(|g| g.trips().is_empty()) {
        let journey_key = group.key();
        let Some(candidates) = unmatched_trips.get(&(&journey_key.origin, &journey_key.destination))
        else {
            continue;
        };

        for trip_key in candidates {
            let offset_secs = trip_key
                .time
                .signed_duration_since(journey_key.time)
                .num_seconds();
            if offset_secs.abs() < NEAR_MISS_SECS {
                warn!(
                    origin = %journey_key.origin,
                    destination = %journey_key.destination,
                    journey_time = %journey_key.time,
                    trip_time = %trip_key.time,
                    offset_secs,
                    "Near-miss match keys"
                );
                misses.push(NearMiss {
                    journey_key: journey_key.clone(),
                    trip_key: (*trip_key).clone(),
                    offset_secs,
                });
            }
        }
    }

    misses
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::tests::{at, journey, trip};
    use super::*;
    use crate::domain::DepartureTime;
    use crate::matcher::MatchType;

    const STOPS: [&str; 3] = ["A", "B", "C"];

    fn key_time(minute: u32) -> DepartureTime {
        at(&format!("2019-03-20T08:{minute:02}:00Z"))
    }

    /// Small key space so that collisions on both sides are common
    fn keys() -> impl Strategy<Value = Vec<(u32, usize, usize)>> {
        prop::collection::vec((0u32..4, 0usize..3, 0usize..3), 0..24)
    }

    fn inputs(
        journey_keys: &[(u32, usize, usize)],
        trip_keys: &[(u32, usize, usize)],
    ) -> (Vec<ScheduledJourney>, Vec<ObservedTrip>) {
        let journeys = journey_keys
            .iter()
            .enumerate()
            .map(|(i, &(m, o, d))| journey(&format!("J{i}"), key_time(m), STOPS[o], STOPS[d]))
            .collect();
        let trips = trip_keys
            .iter()
            .enumerate()
            .map(|(i, &(m, o, d))| trip(&format!("T{i}"), key_time(m), STOPS[o], STOPS[d]))
            .collect();
        (journeys, trips)
    }

    proptest! {
        /// Output groups partition the input exactly
        #[test]
        fn groups_partition_input(jk in keys(), tk in keys()) {
            let (journeys, trips) = inputs(&jk, &tk);
            let groups = match_day(journeys, trips);

            let mut journey_ids: Vec<String> = groups
                .iter()
                .flat_map(|g| g.journeys().iter().map(|j| j.vehicle_journey_code.clone()))
                .collect();
            let mut trip_ids: Vec<String> = groups
                .iter()
                .flat_map(|g| g.trips().iter().map(|t| t.vehicle.clone()))
                .collect();
            journey_ids.sort();
            trip_ids.sort();

            let mut expected_journeys: Vec<String> = (0..jk.len()).map(|i| format!("J{i}")).collect();
            let mut expected_trips: Vec<String> = (0..tk.len()).map(|i| format!("T{i}")).collect();
            expected_journeys.sort();
            expected_trips.sort();

            prop_assert_eq!(journey_ids, expected_journeys);
            prop_assert_eq!(trip_ids, expected_trips);
        }

        /// Keys are strictly increasing and every tag matches its lists
        #[test]
        fn groups_sorted_and_tagged(jk in keys(), tk in keys()) {
            let (journeys, trips) = inputs(&jk, &tk);
            let groups = match_day(journeys, trips);

            for pair in groups.windows(2) {
                prop_assert!(pair[0].key() < pair[1].key());
            }
            for group in &groups {
                prop_assert!(!(group.journeys().is_empty() && group.trips().is_empty()));
                prop_assert_eq!(
                    Some(group.match_type()),
                    MatchType::classify(group.journeys().len(), group.trips().len())
                );
            }
        }

        /// Matching the same input twice gives byte-identical output
        #[test]
        fn matching_is_idempotent(jk in keys(), tk in keys()) {
            let (journeys, trips) = inputs(&jk, &tk);
            let first = match_day(journeys.clone(), trips.clone());
            let second = match_day(journeys, trips);

            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }
}
