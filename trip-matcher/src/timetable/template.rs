//! Undated timetable records.
//!
//! A timetable document lists services; each service carries its operating
//! period, a default operating profile and the journey templates that run
//! under it. Fields stay as raw strings here so that one malformed journey
//! can be reported and skipped without rejecting the whole document.

use serde::{Deserialize, Serialize};

use crate::calendar::{OperatingProfile, ServicePeriod};
use crate::domain::ServiceInfo;

/// A parsed timetable: every service from one or more source files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimetableDocument {
    pub services: Vec<ServiceTemplate>,
}

/// One service and the journeys that run under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTemplate {
    #[serde(flatten)]
    pub info: ServiceInfo,
    /// Dates the service is registered to run
    pub operating_period: ServicePeriod,
    /// Default profile for journeys that leave fields unspecified
    #[serde(default)]
    pub profile: OperatingProfile,
    /// Timetable file the service was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default)]
    pub journeys: Vec<JourneyTemplate>,
}

/// One timetabled departure, without a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_code: Option<String>,
    #[serde(default)]
    pub vehicle_journey_code: String,
    pub direction: String,
    /// Local clock time of departure from the first stop ("HH:MM:SS")
    pub departure_time: String,
    /// Journey-level profile; absent fields inherit from the service
    #[serde(default)]
    pub profile: OperatingProfile,
    /// Consecutive timing links from origin to destination
    pub links: Vec<TimingLink>,
}

/// A timed hop between two consecutive stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingLink {
    pub from: LinkStop,
    pub to: LinkStop,
    /// ISO 8601 duration from departing `from` to reaching `to`
    pub run_time: String,
}

/// One end of a timing link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkStop {
    pub stop: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing_status: Option<String>,
    /// ISO 8601 dwell time at this stop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<String>,
}
