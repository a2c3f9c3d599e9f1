//! Vehicle telemetry assembly.
//!
//! Raw SIRI-VM activity records arrive as a flat stream. They are grouped
//! two ways: by trip identity into [`ObservedTrip`]s for matching, and by
//! vehicle into whole-day [`VehicleTrack`]s for segment extraction.
//!
//! [`ObservedTrip`]: crate::domain::ObservedTrip

mod assemble;
mod record;

pub use assemble::{VehicleTrack, assemble_tracks, assemble_trips};
pub use record::{SiriBatch, TripKey, VehicleActivity};
