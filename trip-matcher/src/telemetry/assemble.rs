//! Grouping vehicle activity into trips and tracks.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{TripKey, VehicleActivity};
use crate::domain::{BoundingBox, DataError, ObservedTrip, PositionReport, StopCode};

/// Group activity records into one trip per distinct seven-part identity.
///
/// Trips come out in the order their first record was seen. Positions
/// within each trip are sorted by recording time. Records that fail
/// validation are logged and skipped.
pub fn assemble_trips<'a>(
    records: impl IntoIterator<Item = &'a VehicleActivity>,
) -> Vec<ObservedTrip> {
    let mut index: HashMap<TripKey, usize> = HashMap::new();
    let mut trips: Vec<ObservedTrip> = Vec::new();
    let mut skipped = 0usize;

    for record in records {
        let (key, position) = match validate(record) {
            Ok(parts) => parts,
            Err(e) => {
                skipped += 1;
                warn!(
                    vehicle = %record.vehicle_ref,
                    error = %e,
                    "Skipping malformed activity record"
                );
                continue;
            }
        };

        match index.entry(key) {
            Entry::Occupied(slot) => trips[*slot.get()].positions.push(position),
            Entry::Vacant(slot) => {
                let key = slot.key();
                trips.push(ObservedTrip {
                    origin: key.origin.clone(),
                    origin_name: record.origin_name.clone(),
                    destination: key.destination.clone(),
                    destination_name: record.destination_name.clone(),
                    aimed_departure: key.aimed_departure,
                    line: key.line.clone(),
                    operator: key.operator.clone(),
                    direction: key.direction.clone(),
                    vehicle: key.vehicle.clone(),
                    positions: vec![position],
                    bounding_box: None,
                    departure_position: None,
                    arrival_position: None,
                });
                slot.insert(trips.len() - 1);
            }
        }
    }

    for trip in &mut trips {
        trip.positions.sort_by_key(|p| p.recorded_at);
        trip.refresh_bounding_box();
    }

    info!(trips = trips.len(), skipped, "Assembled trips");
    trips
}

/// Everything one vehicle reported during a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTrack {
    pub vehicle: String,
    /// Lines the vehicle served at some point in the day
    pub lines: BTreeSet<String>,
    pub origins: BTreeSet<StopCode>,
    pub destinations: BTreeSet<StopCode>,
    /// Position reports, ascending by `recorded_at`
    pub positions: Vec<PositionReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl VehicleTrack {
    fn new(vehicle: String) -> Self {
        Self {
            vehicle,
            lines: BTreeSet::new(),
            origins: BTreeSet::new(),
            destinations: BTreeSet::new(),
            positions: Vec::new(),
            bounding_box: None,
        }
    }

    pub fn serves_line(&self, line: &str) -> bool {
        self.lines.contains(line)
    }
}

/// Group activity records into one whole-day track per vehicle, ordered by
/// vehicle reference.
pub fn assemble_tracks<'a>(
    records: impl IntoIterator<Item = &'a VehicleActivity>,
) -> Vec<VehicleTrack> {
    let mut tracks: BTreeMap<String, VehicleTrack> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let (key, position) = match validate(record) {
            Ok(parts) => parts,
            Err(e) => {
                skipped += 1;
                warn!(
                    vehicle = %record.vehicle_ref,
                    error = %e,
                    "Skipping malformed activity record"
                );
                continue;
            }
        };

        let track = tracks
            .entry(key.vehicle.clone())
            .or_insert_with(|| VehicleTrack::new(key.vehicle));
        track.lines.insert(key.line);
        track.origins.insert(key.origin);
        track.destinations.insert(key.destination);
        track.positions.push(position);
    }

    let tracks: Vec<VehicleTrack> = tracks
        .into_values()
        .map(|mut track| {
            track.positions.sort_by_key(|p| p.recorded_at);
            track.bounding_box =
                BoundingBox::enclosing(track.positions.iter().map(|p| p.coordinate()));
            track
        })
        .collect();

    info!(tracks = tracks.len(), skipped, "Assembled vehicle tracks");
    tracks
}

fn validate(record: &VehicleActivity) -> Result<(TripKey, PositionReport), DataError> {
    Ok((record.trip_key()?, record.position()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(vehicle: &str, aimed: &str, recorded: &str, lat: f64) -> VehicleActivity {
        VehicleActivity {
            origin_ref: "0500HHILT004".into(),
            origin_name: Some("Scotts Crescent".into()),
            destination_ref: "0500SBARH011".into(),
            destination_name: Some("Tesco".into()),
            origin_aimed_departure_time: aimed.into(),
            line_ref: "8".into(),
            operator_ref: "WP".into(),
            direction_ref: "INBOUND".into(),
            vehicle_ref: vehicle.into(),
            recorded_at_time: recorded.into(),
            bearing: None,
            delay: Some("PT0S".into()),
            lat,
            lon: 0.12,
        }
    }

    #[test]
    fn groups_by_identity_and_sorts_positions() {
        let records = vec![
            record("WP-325", "2019-03-20T07:12:00+00:00", "2019-03-20T07:14:00+00:00", 52.21),
            record("WP-325", "2019-03-20T07:12:00+00:00", "2019-03-20T07:10:00+00:00", 52.20),
            record("WP-326", "2019-03-20T07:12:00+00:00", "2019-03-20T07:11:00+00:00", 52.22),
            // Same departure written with a different offset and fraction
            record("WP-325", "2019-03-20T08:12:00.000+01:00", "2019-03-20T07:12:00+00:00", 52.23),
        ];

        let trips = assemble_trips(&records);
        assert_eq!(trips.len(), 2);

        let first = &trips[0];
        assert_eq!(first.vehicle, "WP-325");
        let recorded: Vec<String> = first
            .positions
            .iter()
            .map(|p| p.recorded_at.format("%H:%M").to_string())
            .collect();
        assert_eq!(recorded, vec!["07:10", "07:12", "07:14"]);

        let bbox = first.bounding_box.unwrap();
        assert_eq!(bbox.min_lat, 52.20);
        assert_eq!(bbox.max_lat, 52.23);
        assert_eq!(first.origin_name.as_deref(), Some("Scotts Crescent"));
        assert!(first.departure_position.is_none());

        assert_eq!(trips[1].vehicle, "WP-326");
    }

    #[test]
    fn different_aimed_departures_are_different_trips() {
        let records = vec![
            record("WP-325", "2019-03-20T07:12:00+00:00", "2019-03-20T07:10:00+00:00", 52.2),
            record("WP-325", "2019-03-20T08:12:00+00:00", "2019-03-20T08:10:00+00:00", 52.2),
        ];
        assert_eq!(assemble_trips(&records).len(), 2);
    }

    #[test]
    fn malformed_records_skipped() {
        let bad = record("WP-325", "yesterday", "2019-03-20T07:10:00+00:00", 52.2);
        let records = vec![
            bad,
            record("WP-325", "2019-03-20T07:12:00+00:00", "2019-03-20T07:10:00+00:00", 52.2),
        ];
        let trips = assemble_trips(&records);
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].positions.len(), 1);
    }

    #[test]
    fn tracks_span_trips() {
        let mut other_line = record(
            "WP-325",
            "2019-03-20T09:00:00+00:00",
            "2019-03-20T09:01:00+00:00",
            52.25,
        );
        other_line.line_ref = "8A".into();
        other_line.origin_ref = "0500SBARH011".into();
        let records = vec![
            record("WP-326", "2019-03-20T07:12:00+00:00", "2019-03-20T07:11:00+00:00", 52.22),
            other_line,
            record("WP-325", "2019-03-20T07:12:00+00:00", "2019-03-20T07:10:00+00:00", 52.20),
        ];

        let tracks = assemble_tracks(&records);
        assert_eq!(tracks.len(), 2);

        let track = &tracks[0];
        assert_eq!(track.vehicle, "WP-325");
        assert_eq!(track.positions.len(), 2);
        assert!(track.positions[0].recorded_at < track.positions[1].recorded_at);
        assert!(track.serves_line("8"));
        assert!(track.serves_line("8A"));
        assert!(!tracks[1].serves_line("8A"));
        assert_eq!(track.origins.len(), 2);
        assert_eq!(track.bounding_box.unwrap().max_lat, 52.25);
    }
}
