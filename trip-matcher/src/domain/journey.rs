//! Scheduled journey types.
//!
//! A `ScheduledJourney` is one timetabled departure on one day, with its
//! full ordered list of stop visits. The origin is the first visit and the
//! destination the last; a journey with no visits cannot be constructed.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::calendar::OperatingProfile;

use super::{DataError, DepartureTime, StopCode};

/// A scheduled call at a stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopVisit {
    /// Stop code
    pub stop: StopCode,
    /// Scheduled time at this stop
    pub time: DateTime<FixedOffset>,
    /// Sequence number from the journey pattern, if given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    /// Activity at the stop (e.g. "pickUp", "setDown", "pickUpAndSetDown")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    /// Timing status (e.g. "PTP" for a principal timing point)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing_status: Option<String>,
}

impl StopVisit {
    /// Creates a visit with only the stop and time populated.
    pub fn new(stop: StopCode, time: DateTime<FixedOffset>) -> Self {
        Self {
            stop,
            time,
            sequence: None,
            activity: None,
            timing_status: None,
        }
    }
}

/// The non-empty, ordered stop visits of a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StopVisit>", into = "Vec<StopVisit>")]
pub struct StopVisits(Vec<StopVisit>);

impl StopVisits {
    pub fn new(visits: Vec<StopVisit>) -> Result<Self, DataError> {
        if visits.is_empty() {
            return Err(DataError::EmptyJourney);
        }
        Ok(Self(visits))
    }

    pub fn first(&self) -> &StopVisit {
        // Non-empty by construction
        &self.0[0]
    }

    pub fn last(&self) -> &StopVisit {
        &self.0[self.0.len() - 1]
    }

    pub fn as_slice(&self) -> &[StopVisit] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<StopVisit>> for StopVisits {
    type Error = DataError;

    fn try_from(value: Vec<StopVisit>) -> Result<Self, Self::Error> {
        StopVisits::new(value)
    }
}

impl From<StopVisits> for Vec<StopVisit> {
    fn from(value: StopVisits) -> Self {
        value.0
    }
}

/// Descriptive fields of a journey's parent service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Public line name (e.g. "PR5")
    pub line_name: String,
    /// National operator code (e.g. "SCCM")
    pub operator_code: String,
    /// Operator display name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    /// Service code from the timetable source
    #[serde(default)]
    pub service_code: String,
    /// Free-text description of the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One scheduled departure, valid on the day it was instantiated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledJourney {
    /// Parent service details
    pub service: ServiceInfo,
    /// Journey direction (e.g. "inbound", "outbound")
    pub direction: String,
    /// Operator's private code for this journey, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_code: Option<String>,
    /// Vehicle journey code from the timetable source
    #[serde(default)]
    pub vehicle_journey_code: String,
    /// Timetable file this journey came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Absolute departure time from the origin
    pub departure_time: DepartureTime,
    /// Operating profile, already defaulted from the parent service
    #[serde(default)]
    pub profile: OperatingProfile,
    /// Ordered stop visits, origin first
    pub stops: StopVisits,
}

impl ScheduledJourney {
    /// The first stop visit.
    pub fn origin(&self) -> &StopVisit {
        self.stops.first()
    }

    /// The last stop visit.
    pub fn destination(&self) -> &StopVisit {
        self.stops.last()
    }

    /// Scheduled departure time from the origin stop.
    pub fn scheduled_departure(&self) -> DateTime<FixedOffset> {
        self.origin().time
    }

    /// Scheduled arrival time at the destination stop.
    pub fn scheduled_arrival(&self) -> DateTime<FixedOffset> {
        self.destination().time
    }
}
