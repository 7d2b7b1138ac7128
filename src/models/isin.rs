use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid ISIN {value:?}: expected exactly 12 alphanumeric characters")]
pub struct IsinError {
    value: String,
}

/// International Securities Identification Number.
///
/// Stored uppercase. Validated on construction and on deserialization, so a
/// persisted portfolio can never smuggle a malformed identifier back in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isin(String);

impl Isin {
    pub fn new(value: impl Into<String>) -> Result<Self, IsinError> {
        let value = value.into();
        let normalized = value.trim().to_uppercase();
        if normalized.len() == 12 && normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(Self(normalized))
        } else {
            Err(IsinError { value })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for Isin {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for Isin {
    type Err = IsinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Isin {
    type Error = IsinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Isin> for String {
    fn from(isin: Isin) -> Self {
        isin.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_normalizes_valid_isins() {
        let isin = Isin::new("gb00bd3rz582").unwrap();
        assert_eq!(isin.as_str(), "GB00BD3RZ582");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let isin = Isin::new(" IE00B42WWV65 ").unwrap();
        assert_eq!(isin.as_str(), "IE00B42WWV65");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Isin::new("GB00BD3RZ58").is_err());
        assert!(Isin::new("GB00BD3RZ5821").is_err());
        assert!(Isin::new("").is_err());
    }

    #[test]
    fn rejects_non_alphanumeric() {
        assert!(Isin::new("GB00-D3RZ582").is_err());
        assert!(Isin::new("GB00BD3RZ58 ").is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<Isin, _> = serde_json::from_str(r#""GB00BD3RZ582""#);
        assert!(ok.is_ok());

        let bad: Result<Isin, _> = serde_json::from_str(r#""not-an-isin""#);
        assert!(bad.is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let isin = Isin::new("GB00BD3RZ582").unwrap();
        let json = serde_json::to_string(&isin).unwrap();
        assert_eq!(json, r#""GB00BD3RZ582""#);
    }
}
