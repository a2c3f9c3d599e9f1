//! Carving whole-day vehicle tracks into origin-to-destination runs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::DetectorConfig;
use crate::domain::{Coordinate, PositionReport};
use crate::telemetry::VehicleTrack;

/// A contiguous slice of one vehicle's track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub vehicle: String,
    /// True when the slice runs from the origin to the destination
    pub on_route: bool,
    pub positions: Vec<PositionReport>,
}

impl Segment {
    pub fn first(&self) -> Option<&PositionReport> {
        self.positions.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteState {
    OffRoute,
    AtOrigin,
    OnRoute,
}

/// Extract every run from `origin` to `destination` across all tracks.
///
/// When `line` is given, only vehicles that served that line during the
/// day are considered. Reports that are not part of a completed run come
/// out as `on_route = false` segments, except for runs abandoned after a
/// reporting gap longer than the route timeout, which are dropped.
///
/// Tracks are scanned in parallel; the result is sorted by the time of each
/// segment's first report.
pub fn extract_segments(
    tracks: &[VehicleTrack],
    origin: Coordinate,
    destination: Coordinate,
    line: Option<&str>,
    config: &DetectorConfig,
) -> Vec<Segment> {
    let mut segments: Vec<Segment> = tracks
        .par_iter()
        .filter(|track| match line {
            Some(line) if !track.serves_line(line) => {
                debug!(vehicle = %track.vehicle, line, "Skipping vehicle not serving line");
                false
            }
            _ => true,
        })
        .flat_map_iter(|track| segment_track(track, origin, destination, config))
        .collect();

    segments.sort_by_key(|s| s.first().map(|p| p.recorded_at));

    info!(
        segments = segments.len(),
        on_route = segments.iter().filter(|s| s.on_route).count(),
        "Extracted segments"
    );
    segments
}

fn segment_track(
    track: &VehicleTrack,
    origin: Coordinate,
    destination: Coordinate,
    config: &DetectorConfig,
) -> Vec<Segment> {
    let origin_threshold = config.segment_origin_threshold_m;
    let destination_threshold = config.segment_destination_threshold_m;
    let timeout = config.route_timeout();

    let mut segments = Vec::new();
    let mut emit = |positions: Vec<PositionReport>, on_route: bool| {
        if !positions.is_empty() {
            segments.push(Segment {
                vehicle: track.vehicle.clone(),
                on_route,
                positions,
            });
        }
    };

    let mut state = RouteState::OffRoute;
    let mut current: Vec<PositionReport> = Vec::new();

    for position in &track.positions {
        let here = position.coordinate();
        let origin_distance = here.distance_to(&origin);
        let at_destination = here.distance_to(&destination) < destination_threshold;

        match state {
            RouteState::OffRoute => {
                current.push(position.clone());
                if origin_distance < origin_threshold {
                    state = RouteState::AtOrigin;
                }
            }
            RouteState::AtOrigin if origin_distance > origin_threshold => {
                // The run starts from the last report at the origin
                let last_at_origin = current.pop();
                emit(std::mem::take(&mut current), false);
                current.extend(last_at_origin);
                current.push(position.clone());
                state = RouteState::OnRoute;

                if at_destination {
                    emit(std::mem::take(&mut current), true);
                    state = RouteState::OffRoute;
                }
            }
            RouteState::AtOrigin => current.push(position.clone()),
            RouteState::OnRoute => {
                let gap = current
                    .last()
                    .map(|prev| position.recorded_at - prev.recorded_at);

                if origin_distance < origin_threshold {
                    current.push(position.clone());
                    state = RouteState::AtOrigin;
                } else if gap.is_some_and(|gap| gap > timeout) {
                    debug!(
                        vehicle = %track.vehicle,
                        at = %position.recorded_at,
                        discarded = current.len(),
                        "Route timed out"
                    );
                    current.clear();
                    current.push(position.clone());
                    state = RouteState::OffRoute;
                } else if at_destination {
                    current.push(position.clone());
                    emit(std::mem::take(&mut current), true);
                    state = RouteState::OffRoute;
                } else {
                    current.push(position.clone());
                }
            }
        }
    }

    emit(current, false);
    segments
}
