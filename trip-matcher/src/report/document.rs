//! Per-day JSON documents.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::ReportError;
use crate::correlate::{DaySummary, Row};
use crate::domain::{BoundingBox, ObservedTrip, ScheduledJourney};
use crate::matcher::MatchGroup;
use crate::stops::StopTable;
use crate::telemetry::{SiriBatch, VehicleActivity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneysDocument {
    pub day: NaiveDate,
    pub bounding_box: BoundingBox,
    pub journeys: Vec<ScheduledJourney>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripsDocument {
    pub day: NaiveDate,
    pub bounding_box: BoundingBox,
    pub trips: Vec<ObservedTrip>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopsDocument {
    pub day: NaiveDate,
    pub bounding_box: BoundingBox,
    pub stops: StopTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergedDocument<'a> {
    pub day: NaiveDate,
    pub bounding_box: BoundingBox,
    pub merged: &'a [MatchGroup],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsDocument {
    pub day: NaiveDate,
    pub bounding_box: BoundingBox,
    pub rows: Vec<Row>,
    #[serde(default, skip_deserializing)]
    pub summary: Option<DaySummary>,
}

/// The day and area shared by every document of one run.
pub fn check_consistent(
    journeys: &JourneysDocument,
    trips: &TripsDocument,
) -> Result<(NaiveDate, BoundingBox), ReportError> {
    if journeys.day != trips.day {
        return Err(ReportError::DayMismatch {
            journeys: journeys.day,
            trips: trips.day,
        });
    }
    if journeys.bounding_box != trips.bounding_box {
        return Err(ReportError::AreaMismatch {
            journeys: journeys.bounding_box,
            trips: trips.bounding_box,
        });
    }
    Ok((journeys.day, journeys.bounding_box))
}

/// Path of a per-day file, such as `trips-2019-03-20.json`.
pub fn day_file(dir: &Path, prefix: &str, day: NaiveDate, extension: &str) -> PathBuf {
    dir.join(format!("{prefix}-{}.{extension}", day.format("%Y-%m-%d")))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReportError> {
    let file = File::open(path).map_err(|e| ReportError::io(path, e))?;
    let value = serde_json::from_reader(BufReader::new(file)).map_err(|e| ReportError::json(path, e))?;
    debug!(path = %path.display(), "Read document");
    Ok(value)
}

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ReportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| ReportError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| ReportError::json(path, e))?;
    writer.flush().map_err(|e| ReportError::io(path, e))?;

    info!(path = %path.display(), "Wrote document");
    Ok(())
}

/// Read every `*.json` SIRI batch in `dir`, in file name order.
///
/// Files that fail to parse are logged and skipped.
pub fn read_siri_dir(dir: &Path) -> Result<Vec<VehicleActivity>, ReportError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| ReportError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut records = Vec::new();
    let mut skipped = 0;
    for file in &files {
        match read_json::<SiriBatch>(file) {
            Ok(batch) => records.extend(batch.request_data),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable SIRI file");
                skipped += 1;
            }
        }
    }

    info!(
        files = files.len(),
        skipped,
        records = records.len(),
        "Read SIRI directory"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::fixtures::{at, journey, trip};
    use tempfile::tempdir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 3, 20).unwrap()
    }

    fn area() -> BoundingBox {
        "0.007896,52.155610,0.225048,52.267842".parse().unwrap()
    }

    #[test]
    fn day_file_names() {
        let path = day_file(Path::new("/data"), "rows", day(), "csv");
        assert_eq!(path, PathBuf::from("/data/rows-2019-03-20.csv"));
    }

    #[test]
    fn journeys_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let path = day_file(dir.path(), "journeys", day(), "json");
        let doc = JourneysDocument {
            day: day(),
            bounding_box: area(),
            journeys: vec![journey("J1", at("2019-03-20T08:00:00+00:00"), "A", "B", 12)],
        };

        write_json(&path, &doc).unwrap();
        let back: JourneysDocument = read_json(&path).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn missing_file_names_path() {
        let err = read_json::<TripsDocument>(Path::new("/nonexistent/trips.json")).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/trips.json"));
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"day\": ").unwrap();
        let err = read_json::<TripsDocument>(&path).unwrap_err();
        assert!(matches!(err, ReportError::Json { .. }));
    }

    #[test]
    fn writes_into_new_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("merged.json");
        let doc = MergedDocument {
            day: day(),
            bounding_box: area(),
            merged: &[],
        };
        write_json(&path, &doc).unwrap();

        let value: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(value["day"], "2019-03-20");
        assert_eq!(value["merged"], serde_json::json!([]));
    }

    #[test]
    fn documents_must_agree() {
        let journeys = JourneysDocument {
            day: day(),
            bounding_box: area(),
            journeys: vec![],
        };
        let mut trips = TripsDocument {
            day: day(),
            bounding_box: area(),
            trips: vec![trip("V1", at("2019-03-20T08:00:00+00:00"), "A", "B", vec![])],
        };
        assert_eq!(check_consistent(&journeys, &trips).unwrap(), (day(), area()));

        trips.day = day().succ_opt().unwrap();
        assert!(matches!(
            check_consistent(&journeys, &trips),
            Err(ReportError::DayMismatch { .. })
        ));

        trips.day = day();
        trips.bounding_box.max_lat += 0.1;
        assert!(matches!(
            check_consistent(&journeys, &trips),
            Err(ReportError::AreaMismatch { .. })
        ));
    }

    #[test]
    fn siri_directory_skips_bad_files() {
        let dir = tempdir().unwrap();
        let record = r#"{
            "OriginRef": "0500SMILT010",
            "DestinationRef": "0500CCITY486",
            "OriginAimedDepartureTime": "2019-03-20T08:00:00+00:00",
            "LineRef": "PR5",
            "OperatorRef": "SCCM",
            "DirectionRef": "INBOUND",
            "VehicleRef": "SCCM-19597",
            "RecordedAtTime": "2019-03-20T08:00:10+00:00",
            "acp_lat": 52.2451386,
            "acp_lng": 0.1509704
        }"#;
        fs::write(
            dir.path().join("1553068810.json"),
            format!("{{\"request_data\": [{record}, {record}]}}"),
        )
        .unwrap();
        fs::write(dir.path().join("1553068840.json"), "not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = read_siri_dir(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vehicle_ref, "SCCM-19597");
    }
}
