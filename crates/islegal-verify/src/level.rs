//! # Verification Levels
//!
//! Derives the verification level of a profile from its machine-verified
//! evidence block, and assembles the links a reader can follow to check
//! the claim themselves.
//!
//! A profile is `machine_verified` only when its evidence was extracted
//! from a page carrying legal/statutory markers (`evidence_kind = law`).
//! Evidence from a news mention demotes the profile to `candidate`, as
//! does a profile still waiting for review. The classification itself is
//! made by the external scraping pipeline; this module consumes the
//! recorded kind.

use serde::{Deserialize, Serialize};

use islegal_core::{EvidenceKind, JurisdictionProfile, ReviewStatus, Source};

/// Maximum number of evidence-anchor links shown to the reader.
const MAX_EVIDENCE_LINKS: usize = 3;

/// How much machine verification backs a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationLevel {
    /// Evidence extracted from a statutory source backs the law fields.
    MachineVerified,
    /// Sources exist but none is verified statutory evidence.
    Candidate,
    /// Nothing to check.
    Unknown,
}

/// The verification answer attached to a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// Verification level.
    pub level: VerificationLevel,
    /// Links a reader can follow to check the claim.
    pub links: Vec<Source>,
    /// Number of evidence items backing the claim.
    pub evidence_count: usize,
}

/// Derive the verification level and verify-links for a profile.
pub fn derive_verification(profile: &JurisdictionProfile) -> Verification {
    if let Some(mv) = &profile.machine_verified {
        if !mv.evidence.is_empty() && mv.evidence_kind == EvidenceKind::Law {
            return Verification {
                level: VerificationLevel::MachineVerified,
                links: machine_verify_links(mv),
                evidence_count: mv.evidence.len(),
            };
        }
        if !mv.evidence.is_empty() {
            // Evidence exists but is not a law page.
            return Verification {
                level: VerificationLevel::Candidate,
                links: profile.checkable_sources(),
                evidence_count: mv.evidence.len(),
            };
        }
    }

    match profile.effective_review_status() {
        ReviewStatus::NeedsReview | ReviewStatus::Provisional => Verification {
            level: VerificationLevel::Candidate,
            links: profile.checkable_sources(),
            evidence_count: 0,
        },
        _ => Verification {
            level: VerificationLevel::Unknown,
            links: Vec::new(),
            evidence_count: 0,
        },
    }
}

/// Official source URL, a snapshot-dated link, and up to three evidence
/// anchors, deduplicated by URL.
fn machine_verify_links(mv: &islegal_core::MachineVerified) -> Vec<Source> {
    let mut links = Vec::new();
    if let Some(url) = &mv.source_url {
        links.push(Source {
            title: "Official source".to_string(),
            url: url.clone(),
        });
    }
    if let Some(path) = &mv.snapshot_path {
        let title = match snapshot_date(path) {
            Some(date) => format!("Snapshot ({date})"),
            None => "Snapshot".to_string(),
        };
        links.push(Source {
            title,
            url: path.clone(),
        });
    }
    for item in mv.evidence.iter().take(MAX_EVIDENCE_LINKS) {
        let url = match &item.locator {
            Some(anchor) if anchor.starts_with('#') => format!("{}{}", item.url, anchor),
            Some(locator) => format!("{}#{}", item.url, locator),
            None => item.url.clone(),
        };
        links.push(Source {
            title: "Evidence".to_string(),
            url,
        });
    }
    let mut seen = std::collections::HashSet::new();
    links.retain(|link| seen.insert(link.url.clone()));
    links
}

/// Extract a `YYYY-MM-DD` path segment from a snapshot path.
fn snapshot_date(path: &str) -> Option<&str> {
    path.split('/').find(|segment| {
        let b = segment.as_bytes();
        b.len() == 10
            && b[4] == b'-'
            && b[7] == b'-'
            && b.iter()
                .enumerate()
                .all(|(i, c)| matches!(i, 4 | 7) || c.is_ascii_digit())
    })
}
