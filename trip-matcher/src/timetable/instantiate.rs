//! Turning journey templates into dated journeys.

use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use super::{JourneyTemplate, LinkStop, ServiceTemplate, TimetableDocument, TimingLink};
use crate::calendar::BankHolidays;
use crate::domain::{
    DataError, DepartureTime, ScheduledJourney, StopCode, StopVisit, StopVisits,
    parse_clock_time, parse_iso_duration,
};

/// Zone in which timetable clock times are expressed.
pub const TIMETABLE_ZONE: Tz = chrono_tz::Europe::London;

/// Instantiate every journey in `timetable` that runs on `day`.
///
/// A journey that fails validation is logged and skipped; the rest of the
/// day is still produced. Use [`instantiate_journey`] to stop at the first
/// error instead.
pub fn instantiate_day(
    timetable: &TimetableDocument,
    day: NaiveDate,
    holidays: &BankHolidays,
) -> Vec<ScheduledJourney> {
    let mut journeys = Vec::new();
    let mut not_running = 0usize;
    let mut malformed = 0usize;

    for service in &timetable.services {
        for template in &service.journeys {
            match instantiate_journey(service, template, day, holidays) {
                Ok(Some(journey)) => journeys.push(journey),
                Ok(None) => not_running += 1,
                Err(e) => {
                    malformed += 1;
                    warn!(
                        line = %service.info.line_name,
                        journey = %template.vehicle_journey_code,
                        error = %e,
                        "Skipping malformed journey"
                    );
                }
            }
        }
    }

    info!(
        %day,
        journeys = journeys.len(),
        not_running,
        malformed,
        "Instantiated timetable"
    );

    journeys
}

/// Instantiate one journey template for `day`.
///
/// Returns `Ok(None)` when the service period or the journey's operating
/// profile excludes the day.
pub fn instantiate_journey(
    service: &ServiceTemplate,
    template: &JourneyTemplate,
    day: NaiveDate,
    holidays: &BankHolidays,
) -> Result<Option<ScheduledJourney>, DataError> {
    if !service.operating_period.contains(day) {
        return Ok(None);
    }

    let mut profile = template.profile.clone();
    profile.defaults_from(&service.profile)?;
    if !profile.should_show(day, holidays) {
        debug!(
            journey = %template.vehicle_journey_code,
            %day,
            "Journey does not run"
        );
        return Ok(None);
    }

    let clock = parse_clock_time(&template.departure_time)?;
    let departure_time = DepartureTime::from_local(day, clock, &TIMETABLE_ZONE)?;
    let stops = stop_visits(&template.links, departure_time.as_datetime())?;

    Ok(Some(ScheduledJourney {
        service: service.info.clone(),
        direction: template.direction.clone(),
        private_code: template.private_code.clone(),
        vehicle_journey_code: template.vehicle_journey_code.clone(),
        source_file: service.source_file.clone(),
        departure_time,
        profile,
        stops,
    }))
}

/// Walk the timing links, accumulating run and wait times from `departure`.
fn stop_visits(
    links: &[TimingLink],
    departure: DateTime<FixedOffset>,
) -> Result<StopVisits, DataError> {
    let Some(last) = links.last() else {
        return Err(DataError::EmptyJourney);
    };

    let mut visits = Vec::with_capacity(links.len() + 1);
    let mut time = departure;

    for link in links {
        visits.push(visit(&link.from, time)?);
        time += parse_iso_duration(&link.run_time)?;
        if let Some(wait) = &link.to.wait_time {
            time += parse_iso_duration(wait)?;
        }
    }
    visits.push(visit(&last.to, time)?);

    StopVisits::new(visits)
}

fn visit(stop: &LinkStop, time: DateTime<FixedOffset>) -> Result<StopVisit, DataError> {
    Ok(StopVisit {
        stop: StopCode::parse(&stop.stop)?,
        time: time.with_timezone(&TIMETABLE_ZONE).fixed_offset(),
        sequence: stop.sequence,
        activity: stop.activity.clone(),
        timing_status: stop.timing_status.clone(),
    })
}
