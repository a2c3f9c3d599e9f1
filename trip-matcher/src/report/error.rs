//! Report I/O error types.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::BoundingBox;

/// Errors reading input documents or writing outputs.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Journeys and trips documents describe different days
    #[error("journeys are for {journeys} but trips are for {trips}")]
    DayMismatch { journeys: NaiveDate, trips: NaiveDate },

    /// Journeys and trips documents cover different areas
    #[error("journeys cover {journeys} but trips cover {trips}")]
    AreaMismatch {
        journeys: BoundingBox,
        trips: BoundingBox,
    },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
