//! Day-level statistics over expanded rows.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use super::Row;
use crate::matcher::MatchType;

/// Counts describing how well a day's timetable matched its telemetry.
///
/// `journeys` and `trips` count rows carrying that side, so a journey
/// paired with two trips is counted twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub rows: usize,
    pub journeys: usize,
    pub trips: usize,
    pub by_type: BTreeMap<MatchType, usize>,
    pub trips_with_departure: usize,
    pub trips_with_arrival: usize,
    pub trips_with_both: usize,
    pub unmatched_journeys_by_line: BTreeMap<String, usize>,
    pub unmatched_trips_by_line: BTreeMap<String, usize>,
}

/// Long-form description of a match type.
pub fn describe_type(match_type: MatchType) -> &'static str {
    match match_type {
        MatchType::ZeroOne => "No journey, single trip",
        MatchType::ZeroMany => "No journey, multiple trips",
        MatchType::OneZero => "Single journey, no trips",
        MatchType::OneOne => "Single journey, single trip",
        MatchType::OneMany => "Single journey, multiple trips",
        MatchType::ManyZero => "Multiple journeys, no trips",
        MatchType::ManyOne => "Multiple journeys, one trip",
        MatchType::ManyMany => "Multiple journeys, multiple trips",
    }
}

pub fn summarise(rows: &[Row]) -> DaySummary {
    let mut summary = DaySummary {
        rows: rows.len(),
        ..DaySummary::default()
    };

    for row in rows {
        *summary.by_type.entry(row.match_type).or_default() += 1;

        match (&row.journey, &row.trip) {
            (Some(journey), None) => {
                summary.journeys += 1;
                *summary
                    .unmatched_journeys_by_line
                    .entry(journey.service.line_name.clone())
                    .or_default() += 1;
            }
            (None, Some(trip)) => {
                summary.trips += 1;
                *summary
                    .unmatched_trips_by_line
                    .entry(trip.line.clone())
                    .or_default() += 1;
            }
            (Some(_), Some(_)) => {
                summary.journeys += 1;
                summary.trips += 1;
            }
            (None, None) => {}
        }

        if let Some(trip) = &row.trip {
            let departed = trip.departure_position.is_some();
            let arrived = trip.arrival_position.is_some();
            summary.trips_with_departure += usize::from(departed);
            summary.trips_with_arrival += usize::from(arrived);
            summary.trips_with_both += usize::from(departed && arrived);
        }
    }

    summary
}

impl DaySummary {
    /// Write the summary to the log at `info`.
    pub fn log(&self) {
        info!(
            rows = self.rows,
            journeys = self.journeys,
            trips = self.trips,
            "Day summary"
        );
        for (match_type, count) in &self.by_type {
            info!(match_type = %match_type, count, "{}", describe_type(*match_type));
        }
        info!(
            departure = self.trips_with_departure,
            arrival = self.trips_with_arrival,
            both = self.trips_with_both,
            "Trips with detected times"
        );
        for (line, count) in &self.unmatched_journeys_by_line {
            info!(line = %line, count, "Journeys with no trips");
        }
        for (line, count) in &self.unmatched_trips_by_line {
            info!(line = %line, count, "Trips with no journeys");
        }
    }
}
