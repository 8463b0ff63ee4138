//! # islegal-verify — Verification Service
//!
//! Converts a jurisdiction profile's machine-extracted evidence into a
//! user-facing verification level plus human-checkable links, decides
//! when evidence has gone stale, and defines the capability interface to
//! the external on-demand verifier.
//!
//! The on-demand call is the only operation in the engine that may block
//! on an external process. It runs with a bounded timeout and degrades
//! to `pending` with a reason code on any failure — it never blocks or
//! fails the primary answer.

pub mod freshness;
pub mod level;
pub mod verifier;

pub use freshness::{evidence_is_fresh, FRESHNESS_TTL_DAYS};
pub use level::{derive_verification, Verification, VerificationLevel};
pub use verifier::{CommandVerifier, MockVerifier, Verifier, VerifyOutcome, VerifyReason, VerifyStatus};
