//! # Profile Document Validation
//!
//! Runtime validation of law-profile JSON documents against the embedded
//! profile schema (Draft 2020-12).
//!
//! ## Security Invariant
//!
//! Schema validation is a trust boundary. Documents that fail validation
//! must be rejected with structured error information including the
//! instance path, the violated schema path, and a message.
//!
//! The schema is self-contained: every `$ref` points into its own
//! `$defs`, so no external resolution (and no network access) happens
//! at compile or validation time.

use std::fmt;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// Canonical name of the embedded profile schema.
pub const PROFILE_SCHEMA_NAME: &str = "law_profile.schema.json";

const PROFILE_SCHEMA: &str = include_str!("../schemas/law_profile.schema.json");

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The compiled validator could not be built.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema identifier.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// IO error reading a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single validation violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A compiled validator for law-profile documents.
///
/// The embedded schema is parsed and compiled once at construction.
///
/// ## Thread Safety
///
/// `ProfileValidator` is `Send + Sync`; one instance can be shared
/// across concurrent requests.
pub struct ProfileValidator {
    validator: Validator,
}

impl fmt::Debug for ProfileValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileValidator")
            .field("schema", &PROFILE_SCHEMA_NAME)
            .finish()
    }
}

impl ProfileValidator {
    /// Compile the embedded profile schema into a validator.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidatorBuildError` if the
    /// embedded schema is not itself valid Draft 2020-12.
    pub fn new() -> Result<Self, SchemaValidationError> {
        let schema_value: Value = serde_json::from_str(PROFILE_SCHEMA).map_err(|e| {
            SchemaValidationError::ValidatorBuildError {
                schema_name: PROFILE_SCHEMA_NAME.to_string(),
                reason: format!("embedded schema is invalid JSON: {e}"),
            }
        })?;

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts.build(&schema_value).map_err(|e| {
            SchemaValidationError::ValidatorBuildError {
                schema_name: PROFILE_SCHEMA_NAME.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self { validator })
    }

    /// Validate a parsed JSON value against the profile schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` with structured
    /// violation details if the document is invalid.
    pub fn validate_value(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        let errors: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema_name: PROFILE_SCHEMA_NAME.to_string(),
                violations: ValidationViolations { violations: errors },
            })
        }
    }

    /// Load a profile document from disk and validate it.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::DocumentLoadError` if the file
    /// cannot be read or parsed as JSON, and
    /// `SchemaValidationError::ValidationFailed` (with the file path
    /// folded into the schema name) if the document is invalid.
    pub fn validate_file(&self, path: &Path) -> Result<(), SchemaValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SchemaValidationError::DocumentLoadError {
                path: path.display().to_string(),
                reason: format!("cannot read file: {e}"),
            }
        })?;

        let value: Value = serde_json::from_str(&content).map_err(|e| {
            SchemaValidationError::DocumentLoadError {
                path: path.display().to_string(),
                reason: format!("invalid JSON: {e}"),
            }
        })?;

        self.validate_value(&value).map_err(|e| match e {
            SchemaValidationError::ValidationFailed { violations, .. } => {
                SchemaValidationError::ValidationFailed {
                    schema_name: format!("{PROFILE_SCHEMA_NAME} ({})", path.display()),
                    violations,
                }
            }
            other => other,
        })
    }
}
