//! # Jurisdiction Profiles
//!
//! The `JurisdictionProfile` record: one per jurisdiction key, holding the
//! per-field law statuses, citable sources, review metadata, the
//! append-only review-status history, and the optional machine-verified
//! evidence block written by the external extraction pipeline.
//!
//! ## Append-Only History
//!
//! `ReviewHistory` exposes append and read access only. Existing entries
//! cannot be rewritten or removed, which makes the no-silent-downgrade
//! invariant checkable by structural diff of two profile versions.

use serde::{Deserialize, Serialize};

use crate::jurisdiction::JurisdictionKey;
use crate::law::{ConfidenceLevel, LawStatus, RiskFlag, Source, SourceKind};
use crate::temporal::Timestamp;

// ─── Review Status ───────────────────────────────────────────────────

/// Trust level of a jurisdiction profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Auto-generated placeholder; no human or machine evidence.
    Provisional,
    /// Candidate sources or machine evidence attached, not yet confirmed.
    NeedsReview,
    /// Human-applied update with at least one verifiable official source.
    Reviewed,
    /// Terminal; fully verified. The default trusted state for shipped
    /// profiles.
    Known,
    /// Stored document carried no recognizable review status. Legacy
    /// strings deserialize here instead of failing the document load.
    #[serde(other)]
    Unknown,
}

impl ReviewStatus {
    /// Normalize for status resolution: stored documents may carry either
    /// `known` or `reviewed` for a trusted profile.
    pub fn effective(&self) -> ReviewStatus {
        match self {
            Self::Known => Self::Reviewed,
            other => *other,
        }
    }

    /// Trust rank used to forbid downgrades: unknown(0) < provisional(1)
    /// < needs_review(2) < reviewed/known(3).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Provisional => 1,
            Self::NeedsReview => 2,
            Self::Reviewed | Self::Known => 3,
        }
    }

    /// Whether this profile is trusted for status display.
    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Reviewed | Self::Known)
    }
}

impl Default for ReviewStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Provisional => "provisional",
            Self::NeedsReview => "needs_review",
            Self::Reviewed => "reviewed",
            Self::Known => "known",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

// ─── Review History ──────────────────────────────────────────────────

/// One entry in the review-status audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewHistoryEntry {
    /// The status that was recorded.
    pub status: ReviewStatus,
    /// When it was recorded.
    pub at: Timestamp,
}

/// Append-only ordered log of review-status changes.
///
/// The inner vector is private: entries can be appended and read, never
/// mutated or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewHistory(Vec<ReviewHistoryEntry>);

impl ReviewHistory {
    /// An empty history.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one entry.
    pub fn push(&mut self, status: ReviewStatus, at: Timestamp) {
        self.0.push(ReviewHistoryEntry { status, at });
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Option<&ReviewHistoryEntry> {
        self.0.last()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[ReviewHistoryEntry] {
        &self.0
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ─── Review Sources ──────────────────────────────────────────────────

/// A source attached during review, carrying a trust classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSource {
    /// Human-readable title.
    pub title: String,
    /// Link to the source document.
    pub url: String,
    /// Trust classification; registry entries without one are neutral.
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,
}

fn default_source_kind() -> SourceKind {
    SourceKind::Neutral
}

// ─── Provenance ──────────────────────────────────────────────────────

/// Model identifier stamped by the registry conveyor pipeline.
const REGISTRY_CONVEYOR_MODEL: &str = "registry";

/// Pipeline provenance stamped on generated profile documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Identifier of the pipeline that generated the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

// ─── Machine-Verified Evidence ───────────────────────────────────────

/// Whether extracted evidence came from a statutory/legal page or merely
/// a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    /// Source text contains legal/statutory markers.
    Law,
    /// News mention or other non-statutory text.
    NonLaw,
}

/// A quoted excerpt plus locator from an official source snapshot.
///
/// Immutable once written: a superseding extraction produces a new record
/// with a new content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Source page URL.
    pub url: String,
    /// Path of the stored snapshot this quote was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<String>,
    /// Anchor or page locator within the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    /// The quoted text.
    pub quote: String,
    /// Hash of the snapshot content the quote was extracted from.
    pub content_hash: String,
}

/// Evidence-backed fields owned by the verification pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineVerified {
    /// Extracted recreational status.
    #[serde(default)]
    pub status_recreational: LawStatus,
    /// Extracted medical status.
    #[serde(default)]
    pub status_medical: LawStatus,
    /// Supporting evidence items.
    #[serde(default)]
    pub evidence: Vec<EvidenceItem>,
    /// Classification of the evidence source text.
    pub evidence_kind: EvidenceKind,
    /// The official source page the evidence was extracted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Path of the dated snapshot backing the evidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<String>,
    /// Extraction confidence.
    #[serde(default)]
    pub confidence: ConfidenceLevel,
    /// Whether the source URL passed the official-domain registry check.
    #[serde(default)]
    pub official_source_ok: bool,
    /// When the snapshot was retrieved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_at: Option<Timestamp>,
    /// When the evidence block was generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<Timestamp>,
    /// When the evidence was last verified against the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<Timestamp>,
}

// ─── Jurisdiction Profile ────────────────────────────────────────────

/// One law profile per jurisdiction key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionProfile {
    /// Jurisdiction key; unique and immutable after creation.
    pub id: JurisdictionKey,
    /// ISO country code.
    pub country: String,
    /// Region code for sub-national jurisdictions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Medical cannabis status.
    #[serde(default)]
    pub medical: LawStatus,
    /// Recreational cannabis status.
    #[serde(default)]
    pub recreational: LawStatus,
    /// Public consumption status.
    #[serde(default)]
    pub public_use: LawStatus,
    /// Home cultivation status.
    #[serde(default)]
    pub home_grow: LawStatus,
    /// Cross-border transport status.
    #[serde(default)]
    pub cross_border: LawStatus,
    /// Possession limit, free text (e.g. "25g").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possession_limit: Option<String>,
    /// Risk flags.
    #[serde(default)]
    pub risks: Vec<RiskFlag>,
    /// Citable sources shown with the answer.
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Trust state.
    #[serde(default)]
    pub review_status: ReviewStatus,
    /// Review confidence.
    #[serde(default)]
    pub review_confidence: ConfidenceLevel,
    /// Sources attached during review.
    #[serde(default)]
    pub review_sources: Vec<ReviewSource>,
    /// Append-only review audit log.
    #[serde(default)]
    pub review_status_history: ReviewHistory,
    /// Diagnostic note from the last review decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    /// Date the governing law took effect, when the schema demands it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    /// Last profile edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    /// Last successful source verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<Timestamp>,
    /// Evidence-backed fields, owned by the verification pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_verified: Option<MachineVerified>,
    /// Pipeline provenance, when the document was generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl JurisdictionProfile {
    /// A `needs_review` placeholder for a jurisdiction that is recognized
    /// by the ISO list but has no stored profile. Never written back to
    /// the store.
    pub fn placeholder(key: JurisdictionKey) -> Self {
        let country = key.country().to_string();
        let region = key.region().map(str::to_string);
        Self {
            id: key,
            country,
            region,
            medical: LawStatus::Unknown,
            recreational: LawStatus::Unknown,
            public_use: LawStatus::Unknown,
            home_grow: LawStatus::Unknown,
            cross_border: LawStatus::Unknown,
            possession_limit: None,
            risks: Vec::new(),
            sources: Vec::new(),
            review_status: ReviewStatus::NeedsReview,
            review_confidence: ConfidenceLevel::Low,
            review_sources: Vec::new(),
            review_status_history: ReviewHistory::new(),
            review_notes: None,
            effective_date: None,
            updated_at: None,
            verified_at: None,
            machine_verified: None,
            provenance: None,
        }
    }

    /// Review status normalized for display: `known` reads as
    /// `reviewed`, and an unrecognizable status on a registry-conveyor
    /// document that carries review sources degrades to `provisional`
    /// rather than `unknown`.
    pub fn effective_review_status(&self) -> ReviewStatus {
        if self.review_status == ReviewStatus::Unknown && self.is_conveyor_generated() {
            return ReviewStatus::Provisional;
        }
        self.review_status.effective()
    }

    fn is_conveyor_generated(&self) -> bool {
        !self.review_sources.is_empty()
            && self.provenance.as_ref().and_then(|p| p.model_id.as_deref())
                == Some(REGISTRY_CONVEYOR_MODEL)
    }

    /// Whether every required law field carries a verified answer.
    /// Required: medical, recreational, public_use, cross_border.
    pub fn required_fields_known(&self) -> bool {
        self.medical.is_known()
            && self.recreational.is_known()
            && self.public_use.is_known()
            && self.cross_border.is_known()
    }

    /// Number of review sources classified official.
    pub fn official_review_source_count(&self) -> usize {
        self.review_sources
            .iter()
            .filter(|s| s.kind == SourceKind::Official)
            .count()
    }

    /// The sources a reader should check: review sources when present,
    /// otherwise the ordinary source list.
    pub fn checkable_sources(&self) -> Vec<Source> {
        if self.review_sources.is_empty() {
            self.sources.clone()
        } else {
            self.review_sources
                .iter()
                .map(|s| Source {
                    title: s.title.clone(),
                    url: s.url.clone(),
                })
                .collect()
        }
    }
}
