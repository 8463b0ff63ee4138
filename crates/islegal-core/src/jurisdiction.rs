//! # Jurisdiction Keys
//!
//! `JurisdictionKey` identifies a country (`DE`) or a sub-national region
//! (`US-CA`). It is a validated newtype: construction checks the
//! `CC` / `CC-RR` shape, so a bare string cannot be passed where a
//! jurisdiction identifier is expected.
//!
//! Accepted shapes:
//! - two uppercase ASCII letters (ISO 3166-1 alpha-2), or
//! - two uppercase letters, a hyphen, and 2–3 uppercase alphanumerics
//!   (ISO 3166-2 style, used here for US states).
//!
//! Lowercase input is uppercased before validation; anything else is
//! rejected at construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Validated identifier for a jurisdiction: a country or a `COUNTRY-REGION`
/// pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JurisdictionKey(String);

impl JurisdictionKey {
    /// Construct a key from raw input, uppercasing and validating shape.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidKey` when the input does not match
    /// `CC` or `CC-RR(R)`.
    pub fn new(input: &str) -> Result<Self, CoreError> {
        let normalized = input.trim().to_ascii_uppercase();
        if !is_valid_key(&normalized) {
            return Err(CoreError::InvalidKey(input.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Construct a key from a country code and optional region code.
    pub fn from_parts(country: &str, region: Option<&str>) -> Result<Self, CoreError> {
        match region {
            Some(region) if !region.trim().is_empty() => {
                Self::new(&format!("{}-{}", country.trim(), region.trim()))
            }
            _ => Self::new(country),
        }
    }

    /// The full key string, e.g. `"US-CA"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The country component, e.g. `"US"` for `"US-CA"`.
    pub fn country(&self) -> &str {
        match self.0.find('-') {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// The region component, if any.
    pub fn region(&self) -> Option<&str> {
        self.0.find('-').map(|idx| &self.0[idx + 1..])
    }

    /// Whether this key identifies a sub-national region.
    pub fn is_regional(&self) -> bool {
        self.0.contains('-')
    }
}

/// Shape check: `CC` or `CC-RR(R)` with uppercase ASCII.
fn is_valid_key(key: &str) -> bool {
    let bytes = key.as_bytes();
    if bytes.len() < 2 || !bytes[..2].iter().all(|b| b.is_ascii_uppercase()) {
        return false;
    }
    match bytes.len() {
        2 => true,
        5 | 6 => {
            bytes[2] == b'-'
                && bytes[3..]
                    .iter()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        _ => false,
    }
}

impl fmt::Display for JurisdictionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JurisdictionKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for JurisdictionKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<JurisdictionKey> for String {
    fn from(key: JurisdictionKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_key() {
        let key = JurisdictionKey::new("DE").unwrap();
        assert_eq!(key.as_str(), "DE");
        assert_eq!(key.country(), "DE");
        assert_eq!(key.region(), None);
        assert!(!key.is_regional());
    }

    #[test]
    fn test_state_key() {
        let key = JurisdictionKey::new("US-CA").unwrap();
        assert_eq!(key.country(), "US");
        assert_eq!(key.region(), Some("CA"));
        assert!(key.is_regional());
    }

    #[test]
    fn test_lowercase_input_normalized() {
        let key = JurisdictionKey::new("us-ca").unwrap();
        assert_eq!(key.as_str(), "US-CA");
    }

    #[test]
    fn test_three_char_region() {
        assert!(JurisdictionKey::new("GB-SCT").is_ok());
    }

    #[test]
    fn test_from_parts() {
        let key = JurisdictionKey::from_parts("US", Some("TX")).unwrap();
        assert_eq!(key.as_str(), "US-TX");
        let key = JurisdictionKey::from_parts("FR", None).unwrap();
        assert_eq!(key.as_str(), "FR");
        let key = JurisdictionKey::from_parts("FR", Some("  ")).unwrap();
        assert_eq!(key.as_str(), "FR");
    }

    #[test]
    fn test_rejects_bad_shapes() {
        for bad in ["", "D", "DEU", "US-", "US-C", "US-CALI", "1A", "US_CA"] {
            assert!(JurisdictionKey::new(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let key = JurisdictionKey::new("US-CO").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"US-CO\"");
        let parsed: JurisdictionKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let result: Result<JurisdictionKey, _> = serde_json::from_str("\"not a key\"");
        assert!(result.is_err());
    }
}
