//! Match keys, cardinality tags and groups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{DepartureTime, ObservedTrip, ScheduledJourney, StopCode};

/// The composite key journeys and trips are matched on.
///
/// Ordering is lexicographic with time first, so sorted keys run in
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchKey {
    pub time: DepartureTime,
    pub origin: StopCode,
    pub destination: StopCode,
}

impl MatchKey {
    pub fn new(time: DepartureTime, origin: StopCode, destination: StopCode) -> Self {
        Self {
            time,
            origin,
            destination,
        }
    }

    /// Key of a scheduled journey: departure time, first stop, last stop.
    pub fn for_journey(journey: &ScheduledJourney) -> Self {
        Self::new(
            journey.departure_time,
            journey.origin().stop.clone(),
            journey.destination().stop.clone(),
        )
    }

    /// Key of an observed trip: aimed departure, origin, destination.
    pub fn for_trip(trip: &ObservedTrip) -> Self {
        Self::new(
            trip.aimed_departure,
            trip.origin.clone(),
            trip.destination.clone(),
        )
    }
}

/// Error returned when parsing an unknown match type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown match type: {0:?}")]
pub struct UnknownMatchType(String);

/// Cardinality of a match group as (journeys, trips).
///
/// Displayed as two tokens, journeys first: `"1-1"`, `"*-0"` and so on,
/// where `*` means more than one.
///
/// # Examples
///
/// ```
/// use trip_matcher::matcher::MatchType;
///
/// assert_eq!(MatchType::classify(2, 0), Some(MatchType::ManyZero));
/// assert_eq!(MatchType::ManyZero.as_str(), "*-0");
/// assert_eq!("1-*".parse::<MatchType>().unwrap(), MatchType::OneMany);
/// assert_eq!(MatchType::classify(0, 0), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum MatchType {
    ZeroOne,
    OneZero,
    OneOne,
    OneMany,
    ManyOne,
    ManyMany,
    ZeroMany,
    ManyZero,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Count {
    Zero,
    One,
    Many,
}

impl Count {
    fn of(n: usize) -> Self {
        match n {
            0 => Count::Zero,
            1 => Count::One,
            _ => Count::Many,
        }
    }
}

impl MatchType {
    pub const ALL: [MatchType; 8] = [
        MatchType::ZeroOne,
        MatchType::OneZero,
        MatchType::OneOne,
        MatchType::OneMany,
        MatchType::ManyOne,
        MatchType::ManyMany,
        MatchType::ZeroMany,
        MatchType::ManyZero,
    ];

    /// Classify a group with the given numbers of journeys and trips.
    ///
    /// Returns `None` when both are zero; such a group never exists.
    pub fn classify(journeys: usize, trips: usize) -> Option<Self> {
        use Count::*;
        Some(match (Count::of(journeys), Count::of(trips)) {
            (Zero, Zero) => return None,
            (Zero, One) => MatchType::ZeroOne,
            (Zero, Many) => MatchType::ZeroMany,
            (One, Zero) => MatchType::OneZero,
            (One, One) => MatchType::OneOne,
            (One, Many) => MatchType::OneMany,
            (Many, Zero) => MatchType::ManyZero,
            (Many, One) => MatchType::ManyOne,
            (Many, Many) => MatchType::ManyMany,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::ZeroOne => "0-1",
            MatchType::OneZero => "1-0",
            MatchType::OneOne => "1-1",
            MatchType::OneMany => "1-*",
            MatchType::ManyOne => "*-1",
            MatchType::ManyMany => "*-*",
            MatchType::ZeroMany => "0-*",
            MatchType::ManyZero => "*-0",
        }
    }

    /// True when one side of the group is empty.
    pub fn is_unmatched(&self) -> bool {
        matches!(
            self,
            MatchType::ZeroOne | MatchType::ZeroMany | MatchType::OneZero | MatchType::ManyZero
        )
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = UnknownMatchType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownMatchType(s.to_string()))
    }
}

impl TryFrom<String> for MatchType {
    type Error = UnknownMatchType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MatchType> for &'static str {
    fn from(value: MatchType) -> Self {
        value.as_str()
    }
}

/// Journeys and trips that share a key.
///
/// Groups are only built by the matcher, which guarantees at least one side
/// is non-empty; the type tag is derived from the two lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchGroup {
    key: MatchKey,
    #[serde(rename = "type")]
    match_type: MatchType,
    journeys: Vec<ScheduledJourney>,
    trips: Vec<ObservedTrip>,
}

impl MatchGroup {
    /// Build a group, or `None` if both sides are empty.
    pub fn new(
        key: MatchKey,
        journeys: Vec<ScheduledJourney>,
        trips: Vec<ObservedTrip>,
    ) -> Option<Self> {
        let match_type = MatchType::classify(journeys.len(), trips.len())?;
        Some(Self {
            key,
            match_type,
            journeys,
            trips,
        })
    }

    pub fn key(&self) -> &MatchKey {
        &self.key
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn journeys(&self) -> &[ScheduledJourney] {
        &self.journeys
    }

    pub fn trips(&self) -> &[ObservedTrip] {
        &self.trips
    }

    /// Consume the group, returning its journeys and trips.
    pub fn into_parts(self) -> (MatchKey, Vec<ScheduledJourney>, Vec<ObservedTrip>) {
        (self.key, self.journeys, self.trips)
    }
}
