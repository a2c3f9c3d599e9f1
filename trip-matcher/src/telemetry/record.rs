//! Raw SIRI-VM vehicle activity records.

use serde::{Deserialize, Serialize};

use crate::domain::{
    DataError, DepartureTime, PositionReport, StopCode, parse_iso_duration, parse_timestamp,
};

/// One archived batch of vehicle activity, as captured from the feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiriBatch {
    pub request_data: Vec<VehicleActivity>,
}

/// A single vehicle activity report.
///
/// Field names follow the SIRI-VM feed. Coordinates are read from the
/// numeric `acp_lat`/`acp_lng` fields the archiver adds; the feed's own
/// `Latitude`/`Longitude` strings are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleActivity {
    pub origin_ref: String,
    #[serde(default)]
    pub origin_name: Option<String>,
    pub destination_ref: String,
    #[serde(default)]
    pub destination_name: Option<String>,
    pub origin_aimed_departure_time: String,
    pub line_ref: String,
    pub operator_ref: String,
    pub direction_ref: String,
    pub vehicle_ref: String,
    pub recorded_at_time: String,
    #[serde(default)]
    pub bearing: Option<String>,
    #[serde(default)]
    pub delay: Option<String>,
    #[serde(rename = "acp_lat")]
    pub lat: f64,
    #[serde(rename = "acp_lng")]
    pub lon: f64,
}

/// The seven fields that identify one vehicle run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TripKey {
    pub origin: StopCode,
    pub destination: StopCode,
    pub aimed_departure: DepartureTime,
    pub line: String,
    pub operator: String,
    pub direction: String,
    pub vehicle: String,
}

impl VehicleActivity {
    /// Validate the identifying fields of this record.
    pub fn trip_key(&self) -> Result<TripKey, DataError> {
        Ok(TripKey {
            origin: StopCode::parse(&self.origin_ref)?,
            destination: StopCode::parse(&self.destination_ref)?,
            aimed_departure: DepartureTime::parse(&self.origin_aimed_departure_time)?,
            line: self.line_ref.clone(),
            operator: self.operator_ref.clone(),
            direction: self.direction_ref.clone(),
            vehicle: self.vehicle_ref.clone(),
        })
    }

    /// Validate and extract the position part of this record.
    pub fn position(&self) -> Result<PositionReport, DataError> {
        let delay_secs = self
            .delay
            .as_deref()
            .map(parse_iso_duration)
            .transpose()?
            .map(|d| d.num_seconds());

        Ok(PositionReport {
            lat: self.lat,
            lon: self.lon,
            recorded_at: parse_timestamp(&self.recorded_at_time)?,
            // Bearings are advisory; an unreadable one is dropped
            bearing: self.bearing.as_deref().and_then(|b| b.parse().ok()),
            delay_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Bearing": "300",
        "DataFrameRef": "1",
        "DatedVehicleJourneyRef": "119",
        "Delay": "-PT33S",
        "DestinationName": "Emmanuel St Stop E1",
        "DestinationRef": "0500CCITY487",
        "DirectionRef": "OUTBOUND",
        "InPanic": "0",
        "Latitude": "52.2051239",
        "LineRef": "7",
        "Longitude": "0.1242290",
        "Monitored": "true",
        "OperatorRef": "SCCM",
        "OriginAimedDepartureTime": "2017-10-25T23:14:00+01:00",
        "OriginName": "Park Road",
        "OriginRef": "0500SSAWS023",
        "PublishedLineName": "7",
        "RecordedAtTime": "2017-10-25T23:59:48+01:00",
        "ValidUntilTime": "2017-10-25T23:59:48+01:00",
        "VehicleMonitoringRef": "SCCM-19597",
        "VehicleRef": "SCCM-19597",
        "acp_id": "SCCM-19597",
        "acp_lat": 52.2051239,
        "acp_lng": 0.124229,
        "acp_ts": 1508972388
    }"#;

    #[test]
    fn parse_feed_record() {
        let record: VehicleActivity = serde_json::from_str(SAMPLE).unwrap();
        let key = record.trip_key().unwrap();
        assert_eq!(key.origin.as_str(), "0500SSAWS023");
        assert_eq!(key.destination.as_str(), "0500CCITY487");
        assert_eq!(key.vehicle, "SCCM-19597");
        assert_eq!(key.aimed_departure.to_string(), "2017-10-25T23:14:00+01:00");

        let pos = record.position().unwrap();
        assert_eq!(pos.lat, 52.2051239);
        assert_eq!(pos.bearing, Some(300.0));
        assert_eq!(pos.delay_secs, Some(-33));
        assert_eq!(pos.recorded_at.to_rfc3339(), "2017-10-25T23:59:48+01:00");
    }

    #[test]
    fn bad_fields_are_errors() {
        let mut record: VehicleActivity = serde_json::from_str(SAMPLE).unwrap();
        record.delay = Some("soon".into());
        assert!(matches!(
            record.position(),
            Err(DataError::InvalidDuration(_))
        ));

        record.delay = None;
        record.bearing = Some("north".into());
        assert_eq!(record.position().unwrap().bearing, None);

        record.origin_ref = String::new();
        assert!(matches!(
            record.trip_key(),
            Err(DataError::InvalidStopCode(_))
        ));
    }
}
