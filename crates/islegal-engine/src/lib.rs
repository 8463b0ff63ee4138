//! # islegal-engine — Legality Resolution Engine
//!
//! Ties the other crates together into the single exposed operation:
//! resolve a jurisdiction to a trusted, verifiable answer.
//!
//! - [`status`] — pure profile-to-traffic-light status resolution.
//! - [`store`] — jurisdiction and evidence store traits with in-memory
//!   and JSON-directory implementations (per-key write locking,
//!   no-silent-downgrade enforcement).
//! - [`cache`] — the LRU result cache with window, fingerprint, and
//!   GPS-cell soundness checks.
//! - [`resolve`] — the [`resolve::Resolver`] orchestrating profile load,
//!   status resolution, verification freshness, nearest-better search,
//!   and cache wrap-around.

pub mod cache;
pub mod resolve;
pub mod status;
pub mod store;

pub use cache::{CacheEntry, ResultCache, CACHE_CAPACITY, CACHE_WINDOW_MINUTES};
pub use resolve::{Resolution, ResolveError, ResolveRequest, Resolver};
pub use status::{resolve_status, ResolvedStatus};
pub use store::{
    EvidenceStore, JsonDirStore, JurisdictionStore, MemoryEvidenceStore, MemoryStore, StoreError,
};
