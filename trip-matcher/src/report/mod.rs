//! Reading the day's input documents and writing its outputs.
//!
//! Every document is keyed by day and carries the bounding box of the area
//! it covers. Outputs are the merged groups and the expanded rows, as JSON,
//! plus the rows as a spreadsheet-friendly CSV.

mod document;
mod error;
mod rows_csv;

pub use document::{
    JourneysDocument, MergedDocument, RowsDocument, StopsDocument, TripsDocument,
    check_consistent, day_file, read_json, read_siri_dir, write_json,
};
pub use error::ReportError;
pub use rows_csv::{format_minutes, write_rows, write_rows_file};
