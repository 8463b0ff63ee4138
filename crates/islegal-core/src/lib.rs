//! # islegal-core — Foundational Types for the Legality Engine
//!
//! This crate is the bedrock of the islegal engine. It defines the
//! type-system primitives every other crate in the workspace depends on;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `JurisdictionKey` is a
//!    validated newtype — a bare string cannot masquerade as a jurisdiction
//!    identifier. Construction validates the `CC` / `CC-RR` shape.
//!
//! 2. **`CanonicalBytes` newtype.** ALL fingerprint computation flows
//!    through `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for
//!    hashes, which would make cache-soundness checks depend on key order.
//!
//! 3. **Append-only review history.** `ReviewHistory` exposes `push` and
//!    read access only. Existing entries cannot be rewritten, so the
//!    no-silent-downgrade invariant is checkable by structural diff.
//!
//! 4. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision, keeping fingerprints byte-stable.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `islegal-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod jurisdiction;
pub mod law;
pub mod profile;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{profile_fingerprint, sha256_hex, ContentDigest};
pub use error::CoreError;
pub use jurisdiction::JurisdictionKey;
pub use law::{ConfidenceLevel, LawStatus, RiskFlag, Source, SourceKind, StatusLevel};
pub use profile::{
    EvidenceItem, EvidenceKind, JurisdictionProfile, MachineVerified, Provenance, ReviewHistory,
    ReviewHistoryEntry, ReviewSource, ReviewStatus,
};
pub use temporal::Timestamp;
