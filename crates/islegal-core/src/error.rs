//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the islegal workspace. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Identifier errors carry the rejected input.
//! - Canonicalization errors distinguish float rejection from
//!   serialization failure.
//! - Validation errors carry the violating field and reason.

use thiserror::Error;

/// Top-level error type for the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A jurisdiction key failed shape validation.
    #[error("invalid jurisdiction key: {0:?}")]
    InvalidKey(String),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A field failed validation.
    #[error("validation error on {field}: {reason}")]
    Validation {
        /// The violating field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in fingerprint inputs. Coordinates
    /// and amounts that must be hashed are carried as strings.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
