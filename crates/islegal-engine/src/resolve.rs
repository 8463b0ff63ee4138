//! # The Resolve Operation
//!
//! The single exposed operation: take a country (plus optional region,
//! location method, and GPS fix), load the profile, resolve its status,
//! derive verification, search for a nearer-better jurisdiction, and
//! wrap the whole request in the result cache.
//!
//! Error posture follows the request taxonomy: an invalid country code
//! is `BadInput`; a recognized jurisdiction with no stored profile is
//! answered with a `needs_review` placeholder, not an error; a failed or
//! timed-out on-demand verification degrades `verify` to pending and
//! never blocks the primary answer; a cache miss just forces full
//! recomputation.

use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use islegal_core::{
    profile_fingerprint, ConfidenceLevel, CoreError, JurisdictionKey, JurisdictionProfile,
    Timestamp,
};
use islegal_geo::{
    build_approx_cell, build_gps_cell, centroid_for, nearest_better, GeoPoint, LocationMethod,
    NearestBetter, NearestCandidate,
};
use islegal_verify::{
    derive_verification, evidence_is_fresh, Verification, Verifier, VerifyOutcome,
    FRESHNESS_TTL_DAYS,
};

use crate::cache::{CacheEntry, ResultCache};
use crate::status::{resolve_status, ResolvedStatus};
use crate::store::{EvidenceStore, JurisdictionStore, StoreError};

/// Errors surfaced by the resolve operation.
///
/// Deliberately narrow: most conditions (missing profile, stale
/// evidence, cache miss) are answered, not raised.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Missing or invalid country/region input.
    #[error("bad input for {field}: {reason}")]
    BadInput {
        /// The offending request field.
        field: String,
        /// Machine-readable reason.
        reason: String,
    },

    /// The jurisdiction store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The profile fingerprint could not be computed.
    #[error("fingerprint failure: {0}")]
    Fingerprint(#[from] CoreError),
}

/// One resolution request.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// ISO country code.
    pub country: String,
    /// Region code for sub-national jurisdictions.
    pub region: Option<String>,
    /// How the location was obtained.
    pub method: LocationMethod,
    /// Caller-asserted location confidence; defaults per method.
    pub confidence: Option<ConfidenceLevel>,
    /// GPS fix, for cell quantization.
    pub gps: Option<GeoPoint>,
}

impl ResolveRequest {
    /// A manual-entry request.
    pub fn manual(country: impl Into<String>, region: Option<String>) -> Self {
        Self {
            country: country.into(),
            region,
            method: LocationMethod::Manual,
            confidence: None,
            gps: None,
        }
    }

    /// A GPS-sourced request.
    pub fn gps(country: impl Into<String>, region: Option<String>, point: GeoPoint) -> Self {
        Self {
            country: country.into(),
            region,
            method: LocationMethod::Gps,
            confidence: None,
            gps: Some(point),
        }
    }
}

/// The answer to one resolution request.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Per-request identifier.
    pub request_id: Uuid,
    /// Resolved jurisdiction key.
    pub key: JurisdictionKey,
    /// Display status.
    pub status: ResolvedStatus,
    /// The profile the answer was computed from (a placeholder when no
    /// document is stored).
    pub profile: JurisdictionProfile,
    /// Verification level and verify-links.
    pub verification: Verification,
    /// Evidence freshness outcome. `None` when the profile carries no
    /// evidence block; pending with a reason code when re-verification
    /// was attempted and did not complete.
    pub verify: Option<VerifyOutcome>,
    /// Nearest strictly-better jurisdiction, when one exists.
    pub nearest_better: Option<NearestBetter>,
    /// Whether the answer was served from the result cache.
    pub cache_hit: bool,
    /// Approximate cell the answer was cached under.
    pub approx_cell: String,
    /// Location method behind the answer.
    pub location_method: LocationMethod,
    /// Location confidence behind the answer.
    pub location_confidence: ConfidenceLevel,
}

/// The resolution engine. Owns the stores, the on-demand verifier, and
/// the result cache; stateless per request apart from the cache.
pub struct Resolver {
    store: Box<dyn JurisdictionStore>,
    evidence: Option<Box<dyn EvidenceStore>>,
    verifier: Box<dyn Verifier>,
    cache: Mutex<ResultCache>,
    ttl_days: i64,
}

impl Resolver {
    /// A resolver over a jurisdiction store and an on-demand verifier,
    /// with the default cache and evidence TTL.
    pub fn new(store: Box<dyn JurisdictionStore>, verifier: Box<dyn Verifier>) -> Self {
        Self {
            store,
            evidence: None,
            verifier,
            cache: Mutex::new(ResultCache::new()),
            ttl_days: FRESHNESS_TTL_DAYS,
        }
    }

    /// Attach an evidence store consulted for profiles without an
    /// embedded evidence block.
    pub fn with_evidence_store(mut self, evidence: Box<dyn EvidenceStore>) -> Self {
        self.evidence = Some(evidence);
        self
    }

    /// Override the evidence freshness TTL.
    pub fn with_ttl_days(mut self, ttl_days: i64) -> Self {
        self.ttl_days = ttl_days;
        self
    }

    /// Replace the result cache.
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Mutex::new(cache);
        self
    }

    /// Resolve a request at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::BadInput`] for an invalid country or
    /// region, and propagates store/fingerprint failures. Everything
    /// else is answered.
    pub fn resolve(&self, request: &ResolveRequest) -> Result<Resolution, ResolveError> {
        self.resolve_at(request, Timestamp::now())
    }

    /// Resolve a request against an injected clock.
    pub fn resolve_at(
        &self,
        request: &ResolveRequest,
        now: Timestamp,
    ) -> Result<Resolution, ResolveError> {
        let key = JurisdictionKey::from_parts(&request.country, request.region.as_deref())
            .map_err(|e| ResolveError::BadInput {
                field: "country".to_string(),
                reason: e.to_string(),
            })?;
        let request_id = Uuid::new_v4();

        let location_confidence = request.confidence.unwrap_or(match request.method {
            LocationMethod::Manual => ConfidenceLevel::Medium,
            LocationMethod::Gps => ConfidenceLevel::High,
            LocationMethod::Ip => ConfidenceLevel::Low,
        });
        let gps_cell = request.gps.map(|p| build_gps_cell(p.lat, p.lon));
        let approx_cell = build_approx_cell(
            request.method,
            key.country(),
            key.region(),
            gps_cell.as_deref(),
        );

        let mut profile = match self.store.get(&key)? {
            Some(profile) => profile,
            None => {
                // Recognized but unstored: answered, never an error. The
                // placeholder is not written back.
                tracing::info!(%request_id, key = %key, "no stored profile, synthesizing placeholder");
                JurisdictionProfile::placeholder(key.clone())
            }
        };
        if profile.machine_verified.is_none() {
            if let Some(evidence) = &self.evidence {
                profile.machine_verified = evidence.get(&key)?;
            }
        }

        let profile_hash = profile_fingerprint(&profile)?;

        let cached = {
            let mut cache = relock(&self.cache);
            cache.lookup(&key, &approx_cell, &profile_hash, now)
        };
        let cache_hit = cached.is_some();
        tracing::debug!(%request_id, key = %key, cell = %approx_cell, cache_hit, "cache consulted");

        let status = resolve_status(&profile);
        let verification = derive_verification(&profile);

        // A cache hit never skips the freshness check: at most one
        // on-demand attempt per request, and a failure degrades to
        // pending rather than blocking the answer.
        let verify = profile.machine_verified.as_ref().map(|mv| {
            if evidence_is_fresh(mv, now, self.ttl_days) {
                VerifyOutcome::verified()
            } else {
                let outcome = self.verifier.verify(&key);
                tracing::info!(
                    %request_id,
                    key = %key,
                    status = ?outcome.status,
                    reason = ?outcome.reason,
                    "stale evidence, on-demand verification attempted"
                );
                outcome
            }
        });

        let nearest_better = if cache_hit {
            None
        } else {
            self.find_nearest_better(&key, &status, request.gps)?
        };

        if !cache_hit {
            let entry = CacheEntry {
                ts: now,
                key: key.clone(),
                country: key.country().to_string(),
                region: key.region().map(str::to_string),
                status_code: status.code.clone(),
                status_level: status.level,
                profile_hash,
                verified_at: profile.verified_at,
                location_method: request.method,
                location_confidence,
                approx_cell: approx_cell.clone(),
            };
            relock(&self.cache).record(entry);
        }

        Ok(Resolution {
            request_id,
            key,
            status,
            profile,
            verification,
            verify,
            nearest_better,
            cache_hit,
            approx_cell,
            location_method: request.method,
            location_confidence,
        })
    }

    /// Nearest strictly-better search over the stored corpus, same tier
    /// only. The current centroid comes from the reference table, with
    /// the GPS fix as fallback.
    fn find_nearest_better(
        &self,
        key: &JurisdictionKey,
        status: &ResolvedStatus,
        gps: Option<GeoPoint>,
    ) -> Result<Option<NearestBetter>, ResolveError> {
        let Some(current_point) = centroid_for(key).map(|c| c.point()).or(gps) else {
            return Ok(None);
        };
        if status.level.rank().map_or(true, |rank| rank == 2) {
            return Ok(None);
        }

        let mut candidates = Vec::new();
        for candidate_key in self.store.keys()? {
            if candidate_key == *key || candidate_key.is_regional() != key.is_regional() {
                continue;
            }
            let Some(centroid) = centroid_for(&candidate_key) else {
                continue;
            };
            let Some(profile) = self.store.get(&candidate_key)? else {
                continue;
            };
            let level = resolve_status(&profile).level;
            candidates.push(NearestCandidate {
                key: candidate_key,
                level,
                point: centroid.point(),
                sources_count: profile.sources.len(),
            });
        }

        Ok(nearest_better(status.level, current_point, &candidates))
    }
}

fn relock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use islegal_core::{LawStatus, ReviewStatus, Source, StatusLevel};
    use islegal_verify::{MockVerifier, VerifyReason, VerifyStatus};
    use std::sync::Arc;

    use crate::store::MemoryStore;

    fn trusted(key: &str, recreational: LawStatus, medical: LawStatus) -> JurisdictionProfile {
        let mut p = JurisdictionProfile::placeholder(JurisdictionKey::new(key).unwrap());
        p.review_status = ReviewStatus::Known;
        p.recreational = recreational;
        p.medical = medical;
        p.sources = vec![Source {
            title: "Statute register".into(),
            url: "https://example.gov/law".into(),
        }];
        p
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(trusted("US-TX", LawStatus::Illegal, LawStatus::Illegal));
        store.seed(trusted("US-CO", LawStatus::Allowed, LawStatus::Allowed));
        store.seed(trusted("US-NM", LawStatus::Illegal, LawStatus::Allowed));
        store.seed(trusted("US-OK", LawStatus::Illegal, LawStatus::Illegal));
        store
    }

    fn resolver(store: MemoryStore) -> Resolver {
        Resolver::new(Box::new(store), Box::new(MockVerifier::default()))
    }

    #[test]
    fn test_invalid_country_is_bad_input() {
        let r = resolver(MemoryStore::new());
        let err = r
            .resolve(&ResolveRequest::manual("not a code", None))
            .unwrap_err();
        assert!(matches!(err, ResolveError::BadInput { .. }));
    }

    #[test]
    fn test_missing_profile_answers_with_placeholder() {
        let r = resolver(MemoryStore::new());
        let resolution = r.resolve(&ResolveRequest::manual("FR", None)).unwrap();
        assert_eq!(resolution.status.level, StatusLevel::Gray);
        assert_eq!(resolution.profile.review_status, ReviewStatus::NeedsReview);
        assert!(!resolution.cache_hit);
    }

    #[test]
    fn test_green_resolution_with_nearest_none() {
        let r = resolver(seeded_store());
        let resolution = r
            .resolve(&ResolveRequest::manual("US", Some("CO".into())))
            .unwrap();
        assert_eq!(resolution.status.level, StatusLevel::Green);
        assert!(resolution.nearest_better.is_none());
    }

    #[test]
    fn test_red_texas_finds_nearer_yellow_new_mexico() {
        let r = resolver(seeded_store());
        let resolution = r
            .resolve(&ResolveRequest::manual("US", Some("TX".into())))
            .unwrap();
        assert_eq!(resolution.status.level, StatusLevel::Red);
        let nearest = resolution.nearest_better.unwrap();
        // New Mexico (yellow) is closer to Texas than Colorado (green).
        assert_eq!(nearest.key, JurisdictionKey::new("US-NM").unwrap());
    }

    #[test]
    fn test_second_request_is_cache_hit_and_skips_nearest() {
        let r = resolver(seeded_store());
        let request = ResolveRequest::manual("US", Some("TX".into()));
        let first = r.resolve(&request).unwrap();
        assert!(!first.cache_hit);
        assert!(first.nearest_better.is_some());
        let second = r.resolve(&request).unwrap();
        assert!(second.cache_hit);
        assert!(second.nearest_better.is_none());
        assert_eq!(second.status, first.status);
    }

    #[test]
    fn test_profile_change_invalidates_cache() {
        let store = Arc::new(seeded_store());
        struct Shared(Arc<MemoryStore>);
        impl JurisdictionStore for Shared {
            fn get(&self, key: &JurisdictionKey) -> Result<Option<JurisdictionProfile>, StoreError> {
                self.0.get(key)
            }
            fn put(&self, profile: &JurisdictionProfile) -> Result<(), StoreError> {
                self.0.put(profile)
            }
            fn keys(&self) -> Result<Vec<JurisdictionKey>, StoreError> {
                self.0.keys()
            }
        }
        let r = Resolver::new(
            Box::new(Shared(store.clone())),
            Box::new(MockVerifier::default()),
        );
        let request = ResolveRequest::manual("US", Some("TX".into()));
        r.resolve(&request).unwrap();

        let mut changed = trusted("US-TX", LawStatus::Restricted, LawStatus::Allowed);
        changed.possession_limit = Some("25g".into());
        store.seed(changed);

        let after = r.resolve(&request).unwrap();
        assert!(!after.cache_hit, "changed profile hash must miss");
    }

    #[test]
    fn test_expired_cache_entry_misses() {
        let r = resolver(seeded_store());
        let request = ResolveRequest::manual("US", Some("TX".into()));
        let start = Timestamp::parse("2026-08-01T12:00:00Z").unwrap();
        r.resolve_at(&request, start).unwrap();
        let hit = r.resolve_at(&request, start.minus_minutes(-60)).unwrap();
        assert!(hit.cache_hit);
        let miss = r.resolve_at(&request, start.minus_minutes(-150)).unwrap();
        assert!(!miss.cache_hit);
    }

    #[test]
    fn test_gps_requests_cache_per_cell() {
        let r = resolver(seeded_store());
        let austin = GeoPoint {
            lat: 30.2672,
            lon: -97.7431,
        };
        let el_paso = GeoPoint {
            lat: 31.7619,
            lon: -106.4850,
        };
        let first = r
            .resolve(&ResolveRequest::gps("US", Some("TX".into()), austin))
            .unwrap();
        assert!(!first.cache_hit);
        let moved = r
            .resolve(&ResolveRequest::gps("US", Some("TX".into()), el_paso))
            .unwrap();
        assert!(!moved.cache_hit, "a different cell must not hit");
        let same = r
            .resolve(&ResolveRequest::gps("US", Some("TX".into()), austin))
            .unwrap();
        assert!(same.cache_hit);
    }

    #[test]
    fn test_stale_evidence_attempts_verify_once_even_on_cache_hit() {
        use islegal_core::{EvidenceKind, MachineVerified};
        let store = seeded_store();
        let mut p = trusted("DE", LawStatus::Restricted, LawStatus::Allowed);
        p.machine_verified = Some(MachineVerified {
            status_recreational: LawStatus::Restricted,
            status_medical: LawStatus::Allowed,
            evidence: Vec::new(),
            evidence_kind: EvidenceKind::Law,
            source_url: None,
            snapshot_path: None,
            confidence: ConfidenceLevel::Medium,
            official_source_ok: true,
            retrieved_at: Some(Timestamp::now().minus_days(60)),
            generated_at: None,
            verified_at: None,
        });
        store.seed(p);

        let mock = Arc::new(MockVerifier::returning(VerifyOutcome::pending(
            VerifyReason::Timeout,
        )));
        struct Shared(Arc<MockVerifier>);
        impl Verifier for Shared {
            fn verify(&self, key: &JurisdictionKey) -> VerifyOutcome {
                self.0.verify(key)
            }
        }
        let r = Resolver::new(Box::new(store), Box::new(Shared(mock.clone())));
        let request = ResolveRequest::manual("DE", None);

        let first = r.resolve(&request).unwrap();
        let outcome = first.verify.unwrap();
        assert_eq!(outcome.status, VerifyStatus::Pending);
        assert_eq!(outcome.reason, VerifyReason::Timeout);
        assert_eq!(mock.call_count(), 1);

        // The cached answer still re-runs the freshness check.
        let second = r.resolve(&request).unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.verify.unwrap().status, VerifyStatus::Pending);
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn test_fresh_evidence_never_calls_verifier() {
        use islegal_core::{EvidenceKind, MachineVerified};
        let store = MemoryStore::new();
        let mut p = trusted("DE", LawStatus::Restricted, LawStatus::Allowed);
        p.machine_verified = Some(MachineVerified {
            status_recreational: LawStatus::Restricted,
            status_medical: LawStatus::Allowed,
            evidence: Vec::new(),
            evidence_kind: EvidenceKind::Law,
            source_url: None,
            snapshot_path: None,
            confidence: ConfidenceLevel::Medium,
            official_source_ok: true,
            retrieved_at: Some(Timestamp::now().minus_days(1)),
            generated_at: None,
            verified_at: None,
        });
        store.seed(p);

        let mock = Arc::new(MockVerifier::default());
        struct Shared(Arc<MockVerifier>);
        impl Verifier for Shared {
            fn verify(&self, key: &JurisdictionKey) -> VerifyOutcome {
                self.0.verify(key)
            }
        }
        let r = Resolver::new(Box::new(store), Box::new(Shared(mock.clone())));
        let resolution = r.resolve(&ResolveRequest::manual("DE", None)).unwrap();
        assert_eq!(resolution.verify.unwrap().status, VerifyStatus::Verified);
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_evidence_store_consulted_when_profile_has_no_block() {
        use islegal_core::{EvidenceKind, MachineVerified};
        use crate::store::MemoryEvidenceStore;
        let store = MemoryStore::new();
        store.seed(trusted("DE", LawStatus::Restricted, LawStatus::Allowed));
        let evidence = MemoryEvidenceStore::new();
        evidence.insert(
            JurisdictionKey::new("DE").unwrap(),
            MachineVerified {
                status_recreational: LawStatus::Restricted,
                status_medical: LawStatus::Allowed,
                evidence: Vec::new(),
                evidence_kind: EvidenceKind::Law,
                source_url: None,
                snapshot_path: None,
                confidence: ConfidenceLevel::Medium,
                official_source_ok: true,
                retrieved_at: Some(Timestamp::now()),
                generated_at: None,
                verified_at: None,
            },
        );
        let r = resolver(store).with_evidence_store(Box::new(evidence));
        let resolution = r.resolve(&ResolveRequest::manual("DE", None)).unwrap();
        assert!(resolution.profile.machine_verified.is_some());
        assert_eq!(resolution.verify.unwrap().status, VerifyStatus::Verified);
    }

    #[test]
    fn test_no_evidence_means_no_verify_outcome() {
        let r = resolver(seeded_store());
        let resolution = r
            .resolve(&ResolveRequest::manual("US", Some("CO".into())))
            .unwrap();
        assert!(resolution.verify.is_none());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let r = resolver(seeded_store());
        let request = ResolveRequest::manual("US", Some("CO".into()));
        let a = r.resolve(&request).unwrap();
        let b = r.resolve(&request).unwrap();
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_nearest_search_same_tier_only() {
        let store = seeded_store();
        // A green country must not appear as a candidate for a US state.
        store.seed(trusted("CA", LawStatus::Allowed, LawStatus::Allowed));
        let r = resolver(store);
        let resolution = r
            .resolve(&ResolveRequest::manual("US", Some("TX".into())))
            .unwrap();
        let nearest = resolution.nearest_better.unwrap();
        assert!(nearest.key.is_regional());
    }
}
