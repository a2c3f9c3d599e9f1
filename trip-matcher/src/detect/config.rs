//! Thresholds for position event detection.

use chrono::Duration;

/// Configuration parameters for endpoint detection and segment extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Distance from a trip's origin or destination (metres) inside which a
    /// vehicle counts as being at that stop.
    pub threshold_m: f64,

    /// Multiplier applied to `threshold_m` for the single retry against a
    /// trip's final report when no arrival was seen.
    pub relaxed_factor: f64,

    /// Origin proximity (metres) for whole-day segment extraction.
    pub segment_origin_threshold_m: f64,

    /// Destination proximity (metres) for whole-day segment extraction.
    pub segment_destination_threshold_m: f64,

    /// Longest gap between consecutive reports (seconds) before an
    /// in-progress segment is abandoned.
    pub route_timeout_secs: i64,
}

impl DetectorConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        threshold_m: f64,
        relaxed_factor: f64,
        segment_origin_threshold_m: f64,
        segment_destination_threshold_m: f64,
        route_timeout_secs: i64,
    ) -> Self {
        Self {
            threshold_m,
            relaxed_factor,
            segment_origin_threshold_m,
            segment_destination_threshold_m,
            route_timeout_secs,
        }
    }

    /// Default configuration with a different endpoint threshold.
    pub fn with_threshold(threshold_m: f64) -> Self {
        Self {
            threshold_m,
            ..Self::default()
        }
    }

    /// Returns the endpoint threshold after relaxation.
    pub fn relaxed_threshold_m(&self) -> f64 {
        self.threshold_m * self.relaxed_factor
    }

    /// Returns the route timeout as a Duration.
    pub fn route_timeout(&self) -> Duration {
        Duration::seconds(self.route_timeout_secs)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold_m: 100.0,
            relaxed_factor: 2.0,
            segment_origin_threshold_m: 40.0,
            segment_destination_threshold_m: 40.0,
            route_timeout_secs: 500,
        }
    }
}
