//! Stop code types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of an ATCO stop code.
const MAX_LEN: usize = 12;

/// Error returned when parsing an invalid stop code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop code {value:?}: {reason}")]
pub struct InvalidStopCode {
    value: String,
    reason: &'static str,
}

/// A valid ATCO stop code (e.g. `0500CCITY487`).
///
/// ATCO codes are 1 to 12 ASCII letters and digits. This type guarantees
/// that any `StopCode` value is valid by construction, and it orders
/// lexicographically so it can take part in sorted match keys.
///
/// # Examples
///
/// ```
/// use trip_matcher::domain::StopCode;
///
/// let stop = StopCode::parse("0500CCITY487").unwrap();
/// assert_eq!(stop.as_str(), "0500CCITY487");
///
/// assert!(StopCode::parse("").is_err());
/// assert!(StopCode::parse("0500 CCITY").is_err());
/// assert!(StopCode::parse("0500CCITY4870").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopCode(String);

impl StopCode {
    /// Parse a stop code from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidStopCode> {
        let reason = if s.is_empty() {
            Some("must not be empty")
        } else if s.len() > MAX_LEN {
            Some("must be at most 12 characters")
        } else if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some("must be ASCII letters and digits")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidStopCode {
                value: s.to_string(),
                reason,
            }),
            None => Ok(StopCode(s.to_string())),
        }
    }

    /// Returns the stop code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StopCode {
    type Error = InvalidStopCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StopCode::parse(&value)
    }
}

impl From<StopCode> for String {
    fn from(value: StopCode) -> Self {
        value.0
    }
}

impl fmt::Debug for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopCode({})", self.0)
    }
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(StopCode::parse("0500CCITY487").is_ok());
        assert!(StopCode::parse("0500SSAWS023").is_ok());
        assert!(StopCode::parse("A").is_ok());
    }

    #[test]
    fn reject_invalid_codes() {
        assert!(StopCode::parse("").is_err());
        assert!(StopCode::parse("0500-CITY").is_err());
        assert!(StopCode::parse("0500CCITY487X").is_err());
        assert!(StopCode::parse("0500ÖCITY").is_err());
    }

    #[test]
    fn error_names_value() {
        let err = StopCode::parse("bad code").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid stop code \"bad code\": must be ASCII letters and digits"
        );
    }

    #[test]
    fn orders_lexicographically() {
        let a = StopCode::parse("0500CCITY144").unwrap();
        let b = StopCode::parse("0500CCITY487").unwrap();
        assert!(a < b);
    }

    #[test]
    fn serde_validates() {
        let code: StopCode = serde_json::from_str("\"0500HHILT004\"").unwrap();
        assert_eq!(code.as_str(), "0500HHILT004");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"0500HHILT004\"");

        assert!(serde_json::from_str::<StopCode>("\"no spaces\"").is_err());
    }

    #[test]
    fn debug_and_display() {
        let code = StopCode::parse("0500CCITY487").unwrap();
        assert_eq!(format!("{code:?}"), "StopCode(0500CCITY487)");
        assert_eq!(code.to_string(), "0500CCITY487");
    }
}
