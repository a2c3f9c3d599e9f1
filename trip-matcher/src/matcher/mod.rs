//! Matching scheduled journeys to observed trips.
//!
//! Both sides are grouped by `(departure time, origin, destination)`. The
//! sorted key sets are merged, so each output [`MatchGroup`] holds every
//! journey and trip with one key, tagged with its journey:trip
//! cardinality.

mod merge;
mod types;

pub use merge::{NearMiss, audit_keys, match_day};
pub use types::{MatchGroup, MatchKey, MatchType, UnknownMatchType};
