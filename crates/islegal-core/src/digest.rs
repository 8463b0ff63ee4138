//! # Content Fingerprints
//!
//! SHA-256 fingerprints over canonical bytes. The cache-soundness rule
//! compares a presented fingerprint against the freshly loaded profile,
//! so fingerprints must be stable across serialization order and
//! whitespace — `sha256_digest()` therefore accepts only
//! `&CanonicalBytes`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;
use crate::law::{ConfidenceLevel, LawStatus, RiskFlag, Source};
use crate::profile::{JurisdictionProfile, ReviewStatus};

/// A SHA-256 content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Compute a SHA-256 digest from canonical bytes.
pub fn sha256_digest(bytes: &CanonicalBytes) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes.as_bytes());
    ContentDigest(hasher.finalize().into())
}

/// Compute a SHA-256 digest and render it as hex in one step.
pub fn sha256_hex(bytes: &CanonicalBytes) -> String {
    sha256_digest(bytes).to_hex()
}

/// The field subset hashed into a profile fingerprint: identity, law
/// fields, sorted risks, sources, timestamps, and review state. Anything
/// else (history, notes, machine evidence) can change without
/// invalidating cached answers.
#[derive(Serialize)]
struct FingerprintFields<'a> {
    id: &'a str,
    country: &'a str,
    region: Option<&'a str>,
    medical: LawStatus,
    recreational: LawStatus,
    public_use: LawStatus,
    home_grow: LawStatus,
    cross_border: LawStatus,
    possession_limit: Option<&'a str>,
    risks: Vec<RiskFlag>,
    sources: &'a [Source],
    updated_at: Option<String>,
    verified_at: Option<String>,
    confidence: ConfidenceLevel,
    status: ReviewStatus,
}

/// Stable content fingerprint of a profile's law fields and sources.
///
/// Equal inputs always produce equal hex output; risks are sorted before
/// hashing so set order in the stored document does not matter.
///
/// # Errors
///
/// Returns `CoreError::Canonicalization` if canonical bytes cannot be
/// produced (the fingerprint field set contains no floats, so this only
/// occurs on serialization failure).
pub fn profile_fingerprint(profile: &JurisdictionProfile) -> Result<String, CoreError> {
    let mut risks = profile.risks.clone();
    risks.sort();
    risks.dedup();
    let fields = FingerprintFields {
        id: profile.id.as_str(),
        country: &profile.country,
        region: profile.region.as_deref(),
        medical: profile.medical,
        recreational: profile.recreational,
        public_use: profile.public_use,
        home_grow: profile.home_grow,
        cross_border: profile.cross_border,
        possession_limit: profile.possession_limit.as_deref(),
        risks,
        sources: &profile.sources,
        updated_at: profile.updated_at.map(|t| t.to_iso8601()),
        verified_at: profile.verified_at.map(|t| t.to_iso8601()),
        confidence: profile.review_confidence,
        status: profile.review_status,
    };
    let bytes = CanonicalBytes::new(&fields)?;
    Ok(sha256_hex(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jurisdiction::JurisdictionKey;
    use proptest::prelude::*;

    fn profile(key: &str) -> JurisdictionProfile {
        JurisdictionProfile::placeholder(JurisdictionKey::new(key).unwrap())
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let p = profile("DE");
        let a = profile_fingerprint(&p).unwrap();
        let b = profile_fingerprint(&p).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_law_fields() {
        let mut p = profile("DE");
        let before = profile_fingerprint(&p).unwrap();
        p.recreational = LawStatus::Allowed;
        let after = profile_fingerprint(&p).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_fingerprint_ignores_history_and_notes() {
        let mut p = profile("DE");
        let before = profile_fingerprint(&p).unwrap();
        p.review_status_history
            .push(ReviewStatus::NeedsReview, crate::Timestamp::now());
        p.review_notes = Some("missing official sources".into());
        let after = profile_fingerprint(&p).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_fingerprint_risk_order_irrelevant() {
        let mut a = profile("DE");
        a.risks = vec![RiskFlag::Driving, RiskFlag::PublicUse];
        let mut b = profile("DE");
        b.risks = vec![RiskFlag::PublicUse, RiskFlag::Driving];
        assert_eq!(
            profile_fingerprint(&a).unwrap(),
            profile_fingerprint(&b).unwrap()
        );
    }

    proptest! {
        #[test]
        fn prop_fingerprint_stable_across_serde_round_trip(
            recreational in prop_oneof![
                Just(LawStatus::Allowed),
                Just(LawStatus::Restricted),
                Just(LawStatus::Illegal),
                Just(LawStatus::Unknown),
            ],
            limit in proptest::option::of("[0-9]{1,2}g"),
        ) {
            let mut p = profile("US-CA");
            p.recreational = recreational;
            p.possession_limit = limit;
            let direct = profile_fingerprint(&p).unwrap();
            let json = serde_json::to_string(&p).unwrap();
            let round: JurisdictionProfile = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(direct, profile_fingerprint(&round).unwrap());
        }
    }
}
