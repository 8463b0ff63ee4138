//! # Canonical Serialization
//!
//! `CanonicalBytes` is the sole construction path for bytes used in
//! fingerprint computation. The inner field is private; the only
//! constructor rejects floats and serializes via RFC 8785 (JSON
//! Canonicalization Scheme), so any two structurally equal values produce
//! identical bytes regardless of field order or formatting.
//!
//! Floats are rejected because JCS number rendering has edge cases that
//! differ across producers; every hashed value in this workspace carries
//! coordinates and amounts as strings or integers.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization with float
/// rejection.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - No float values appear anywhere in the serialized tree.
/// - Serialization uses sorted keys with compact separators (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value
    /// contains non-integer numbers, or `SerializationFailed` if JCS
    /// serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let bytes = serde_jcs::to_vec(&value)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk the JSON tree and reject any number that is not representable as
/// an integer.
fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) => {
            if n.as_i64().is_none() && n.as_u64().is_none() {
                return Err(CanonicalizationError::FloatRejected(
                    n.as_f64().unwrap_or(f64::NAN),
                ));
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Sample {
        b: u32,
        a: &'static str,
    }

    #[test]
    fn test_keys_are_sorted() {
        let bytes = CanonicalBytes::new(&Sample { b: 1, a: "x" }).unwrap();
        assert_eq!(bytes.as_bytes(), br#"{"a":"x","b":1}"#);
    }

    #[test]
    fn test_floats_rejected() {
        let value = serde_json::json!({ "lat": 31.97 });
        let result = CanonicalBytes::new(&value);
        assert!(matches!(
            result,
            Err(CanonicalizationError::FloatRejected(_))
        ));
    }

    #[test]
    fn test_integers_accepted() {
        let value = serde_json::json!({ "count": 3, "neg": -2 });
        assert!(CanonicalBytes::new(&value).is_ok());
    }

    #[test]
    fn test_equal_values_equal_bytes() {
        let a = serde_json::json!({ "x": [1, 2], "y": null });
        let b = serde_json::json!({ "y": null, "x": [1, 2] });
        assert_eq!(
            CanonicalBytes::new(&a).unwrap(),
            CanonicalBytes::new(&b).unwrap()
        );
    }
}
