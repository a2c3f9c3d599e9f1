//! Stop records and the per-day stop table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::correlate::StopDescriber;
use crate::detect::StopLocator;
use crate::domain::{Coordinate, StopCode};

/// Indicators that read as a preposition and so precede the stop name,
/// as in "opp Milton Road".
const POSITIONAL_INDICATORS: &[&str] = &[
    "opp",
    "outside",
    "o/s",
    "adj",
    "near",
    "nr",
    "behind",
    "inside",
    "by",
    "in",
    "at",
    "on",
    "before",
    "just before",
    "after",
    "just after",
    "corner of",
];

/// A bus stop as returned by the stop directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub atco_code: String,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub indicator: Option<String>,
    #[serde(default)]
    pub locality_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl StopRecord {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Human-readable description, such as "opp Milton Road, Chesterton".
    pub fn description(&self) -> String {
        let mut parts = Vec::with_capacity(2);

        if let Some(name) = non_empty(&self.common_name) {
            parts.push(match non_empty(&self.indicator) {
                Some(indicator) if is_positional(indicator) => format!("{indicator} {name}"),
                Some(indicator) => format!("{name} {indicator}"),
                None => name.to_string(),
            });
        }
        if let Some(locality) = non_empty(&self.locality_name) {
            parts.push(locality.to_string());
        }

        parts.join(", ")
    }
}

fn is_positional(indicator: &str) -> bool {
    let lower = indicator.to_lowercase();
    POSITIONAL_INDICATORS.contains(&lower.as_str())
}

/// Stop records keyed by stop code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopTable(BTreeMap<StopCode, StopRecord>);

impl StopTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, dropping records whose code is not a valid stop code.
    pub fn from_records(records: impl IntoIterator<Item = StopRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.insert(record);
        }
        table
    }

    /// Insert a record, returning false if its code is invalid.
    pub fn insert(&mut self, record: StopRecord) -> bool {
        match StopCode::parse(&record.atco_code) {
            Ok(code) => {
                self.0.insert(code, record);
                true
            }
            Err(e) => {
                debug!(code = %record.atco_code, error = %e, "Skipping stop with invalid code");
                false
            }
        }
    }

    pub fn get(&self, code: &StopCode) -> Option<&StopRecord> {
        self.0.get(code)
    }

    pub fn contains(&self, code: &StopCode) -> bool {
        self.0.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &StopRecord> {
        self.0.values()
    }

    /// Codes from `codes` not present in the table, deduplicated and sorted.
    pub fn missing<'a>(&self, codes: impl IntoIterator<Item = &'a StopCode>) -> Vec<StopCode> {
        let mut missing: Vec<StopCode> = codes
            .into_iter()
            .filter(|c| !self.contains(c))
            .cloned()
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

impl StopLocator for StopTable {
    fn locate(&self, stop: &StopCode) -> Option<Coordinate> {
        self.get(stop).map(StopRecord::coordinate)
    }
}

impl StopDescriber for StopTable {
    /// Unknown codes describe as themselves.
    fn describe(&self, stop: &StopCode) -> String {
        match self.get(stop) {
            Some(record) => record.description(),
            None => stop.to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::StopRecord;

    pub fn record(code: &str, name: &str, indicator: Option<&str>, lat: f64, lon: f64) -> StopRecord {
        StopRecord {
            atco_code: code.into(),
            common_name: Some(name.into()),
            indicator: indicator.map(Into::into),
            locality_name: Some("Cambridge".into()),
            latitude: lat,
            longitude: lon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;

    fn code(s: &str) -> StopCode {
        StopCode::parse(s).unwrap()
    }

    #[test]
    fn positional_indicator_precedes_name() {
        let stop = record("0500CCITY423", "Milton Road", Some("opp"), 52.22, 0.13);
        assert_eq!(stop.description(), "opp Milton Road, Cambridge");

        let stop = record("0500CCITY423", "Milton Road", Some("Just After"), 52.22, 0.13);
        assert_eq!(stop.description(), "Just After Milton Road, Cambridge");
    }

    #[test]
    fn other_indicator_follows_name() {
        let stop = record("0500CCITY486", "Drummer Street", Some("Bay 12"), 52.20, 0.12);
        assert_eq!(stop.description(), "Drummer Street Bay 12, Cambridge");
    }

    #[test]
    fn missing_parts() {
        let stop = StopRecord {
            atco_code: "0500CCITY486".into(),
            common_name: Some("Drummer Street".into()),
            indicator: Some(" ".into()),
            locality_name: None,
            latitude: 52.20,
            longitude: 0.12,
        };
        assert_eq!(stop.description(), "Drummer Street");

        let nameless = StopRecord {
            common_name: None,
            locality_name: Some("Histon".into()),
            ..stop
        };
        assert_eq!(nameless.description(), "Histon");
    }

    #[test]
    fn table_describes_and_locates() {
        let table = StopTable::from_records([
            record("0500SMILT010", "Milton P&R", None, 52.245, 0.151),
            record("not a code!", "Nowhere", None, 0.0, 0.0),
        ]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.describe(&code("0500SMILT010")), "Milton P&R, Cambridge");
        assert_eq!(table.describe(&code("0500XXXXX999")), "0500XXXXX999");
        assert_eq!(
            table.locate(&code("0500SMILT010")),
            Some(Coordinate::new(52.245, 0.151))
        );
        assert_eq!(table.locate(&code("0500XXXXX999")), None);
    }

    #[test]
    fn missing_codes_are_deduplicated() {
        let table = StopTable::from_records([record("A1", "Here", None, 0.0, 0.0)]);
        let wanted = [code("B2"), code("A1"), code("B2"), code("C3")];
        assert_eq!(table.missing(&wanted), vec![code("B2"), code("C3")]);
    }

    #[test]
    fn serializes_as_code_map() {
        let table = StopTable::from_records([record("A1", "Here", Some("opp"), 1.0, 2.0)]);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["A1"]["common_name"], "Here");

        let back: StopTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}
