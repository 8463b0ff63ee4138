//! # Status Resolver
//!
//! Maps a jurisdiction profile plus its trust state to a traffic-light
//! display status. Pure and deterministic: the same profile always
//! yields the same status, with no clock dependence beyond the review
//! state already captured in the profile.

use serde::{Deserialize, Serialize};

use islegal_core::{JurisdictionProfile, LawStatus, ReviewStatus, StatusLevel};

/// The display status attached to a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStatus {
    /// Traffic-light level.
    pub level: StatusLevel,
    /// Machine-readable status code.
    pub code: String,
    /// Human-readable label.
    pub label: String,
}

impl ResolvedStatus {
    fn new(level: StatusLevel, code: &str, label: &str) -> Self {
        Self {
            level,
            code: code.to_string(),
            label: label.to_string(),
        }
    }
}

/// Resolve the display status of a profile.
///
/// Untrusted states short-circuit: `needs_review` and `unknown` resolve
/// to `gray` regardless of law fields, `provisional` to `yellow`. For
/// trusted profiles the law fields decide: recreational allowed is
/// `green`, otherwise medical allowed is `yellow`, otherwise `red`.
///
/// A `green` answer with zero citable sources is downgraded to `yellow`
/// ("needs verification") — a status is never shown as fully legal
/// without at least one source to check.
pub fn resolve_status(profile: &JurisdictionProfile) -> ResolvedStatus {
    match profile.effective_review_status() {
        ReviewStatus::NeedsReview | ReviewStatus::Unknown => {
            return ResolvedStatus::new(StatusLevel::Gray, "needs_review", "needs review");
        }
        ReviewStatus::Provisional => {
            return ResolvedStatus::new(StatusLevel::Yellow, "provisional", "provisional");
        }
        ReviewStatus::Reviewed | ReviewStatus::Known => {}
    }

    if profile.recreational == LawStatus::Allowed {
        if profile.sources.is_empty() {
            return ResolvedStatus::new(
                StatusLevel::Yellow,
                "needs_verification",
                "needs verification",
            );
        }
        return ResolvedStatus::new(StatusLevel::Green, "legal", "legal");
    }
    if profile.medical == LawStatus::Allowed {
        return ResolvedStatus::new(StatusLevel::Yellow, "medical_only", "medical only");
    }
    ResolvedStatus::new(StatusLevel::Red, "illegal", "illegal")
}
