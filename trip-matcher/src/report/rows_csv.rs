//! Spreadsheet export of expanded rows.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use super::ReportError;
use crate::correlate::Row;

const HEADER: [&str; 22] = [
    "Type",
    "Day",
    "Time",
    "From",
    "From_Description",
    "To",
    "To_Description",
    "Journey_Line",
    "Journey_Operator_Code",
    "Journey_Operator_Name",
    "Journey_Direction",
    "Journey_Departure",
    "Journey_Arrival",
    " ",
    "Trip_Line",
    "Trip_Operator",
    "Trip_Direction",
    "Trip_Vehicle",
    "Trip_Departure",
    "Trip_Arrival",
    "Delay_Departure",
    "Delay_Arrival",
];

/// Seconds as minutes with two decimals; blank when absent.
pub fn format_minutes(seconds: Option<i64>) -> String {
    seconds
        .map(|s| format!("{:.2}", s as f64 / 60.0))
        .unwrap_or_default()
}

fn clock(time: Option<DateTime<FixedOffset>>, format: &str) -> String {
    time.map(|t| t.format(format).to_string())
        .unwrap_or_default()
}

fn record(row: &Row) -> Vec<String> {
    let time = row.time.as_datetime();
    let mut fields = vec![
        row.match_type.to_string(),
        time.format("%Y-%m-%d").to_string(),
        time.format("%H:%M").to_string(),
        row.origin.to_string(),
        row.origin_desc.clone(),
        row.destination.to_string(),
        row.destination_desc.clone(),
    ];

    match &row.journey {
        Some(journey) => fields.extend([
            journey.service.line_name.clone(),
            journey.service.operator_code.clone(),
            journey.service.operator_name.clone().unwrap_or_default(),
            journey.direction.clone(),
            clock(Some(journey.scheduled_departure()), "%H:%M"),
            clock(Some(journey.scheduled_arrival()), "%H:%M"),
        ]),
        None => fields.extend(std::iter::repeat_n(String::new(), 6)),
    }

    fields.push(row.separator.to_string());

    match &row.trip {
        Some(trip) => fields.extend([
            trip.line.clone(),
            trip.operator.clone(),
            trip.direction.clone(),
            trip.vehicle.clone(),
            clock(trip.departed_at(), "%H:%M:%S"),
            clock(trip.arrived_at(), "%H:%M:%S"),
        ]),
        None => fields.extend(std::iter::repeat_n(String::new(), 6)),
    }

    fields.push(format_minutes(row.departure_delay));
    fields.push(format_minutes(row.arrival_delay));
    fields
}

/// Write rows as CSV with every field quoted.
pub fn write_rows<W: Write>(writer: W, rows: &[Row]) -> Result<(), ReportError> {
    let mut csv = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    csv.write_record(HEADER)?;
    for row in rows {
        csv.write_record(record(row))?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_rows_file(path: &Path, rows: &[Row]) -> Result<(), ReportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| ReportError::io(path, e))?;
    write_rows(file, rows)?;

    info!(path = %path.display(), rows = rows.len(), "Wrote CSV");
    Ok(())
}
