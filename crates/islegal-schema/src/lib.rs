//! # islegal-schema — Law Profile Document Validation
//!
//! Runtime JSON Schema validation for stored law-profile documents.
//!
//! The profile schema (`schemas/law_profile.schema.json`, Draft 2020-12)
//! is embedded at compile time and compiled into a reusable validator.
//! Key entry points:
//!
//! - [`ProfileValidator::validate_value`] — validate a parsed JSON value
//!   against the profile schema.
//! - [`ProfileValidator::validate_file`] — load and validate a profile
//!   document from disk.
//!
//! ## Crate Policy
//!
//! - Depends only on `islegal-core` internally.
//! - Schema validation is a trust boundary: invalid documents are
//!   rejected with structured errors including the instance path and the
//!   violated schema path.
//! - The embedded schema must stay deserialization-compatible with
//!   `islegal_core::JurisdictionProfile`; a document the schema accepts
//!   must deserialize, and a serialized profile must validate.

pub mod validate;

pub use validate::{
    ProfileValidator, SchemaValidationError, ValidationViolations, Violation, PROFILE_SCHEMA_NAME,
};
