//! # Law-Status Vocabulary
//!
//! The shared enums for legality answers: per-field law statuses, risk
//! flags, source records, confidence levels, and the traffic-light
//! `StatusLevel` with its strict ordering used by the nearest-better
//! search.

use serde::{Deserialize, Serialize};

// ─── Law Status ──────────────────────────────────────────────────────

/// Legal status of a single law field (medical, recreational, public use,
/// home grow, cross border).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawStatus {
    /// Explicitly permitted.
    Allowed,
    /// Permitted with conditions (possession limits, licensed outlets).
    Restricted,
    /// Prohibited.
    Illegal,
    /// No verified answer.
    Unknown,
}

impl LawStatus {
    /// Whether this field has a verified (non-unknown) answer.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl Default for LawStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

// ─── Risk Flags ──────────────────────────────────────────────────────

/// Risk flags attached to a jurisdiction profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    /// Carrying across a border is prosecuted even between two legal
    /// jurisdictions.
    BorderCrossing,
    /// Consumption in public spaces is penalized.
    PublicUse,
    /// Driving under influence is penalized regardless of legality.
    Driving,
    /// Federal property within the US follows federal law.
    FederalPropertyUs,
}

// ─── Sources ─────────────────────────────────────────────────────────

/// A citable source backing a legality claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Human-readable title.
    pub title: String,
    /// Link to the source document.
    pub url: String,
}

/// Classification of a review source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Government or statute-register page.
    Official,
    /// Reputable non-government coverage.
    Neutral,
    /// Community-maintained reference.
    Wiki,
}

// ─── Confidence ──────────────────────────────────────────────────────

/// How much verification backs a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Confidence assigned on review promotion from the number of
    /// official sources: 0 → low, 1 → medium, 2+ → high.
    pub fn from_official_count(count: usize) -> Self {
        match count {
            0 => Self::Low,
            1 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self::Low
    }
}

// ─── Status Level ────────────────────────────────────────────────────

/// Traffic-light summary of legality.
///
/// `Gray` means the profile has not been reviewed; it carries no rank and
/// never participates in better/worse comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Green,
    Yellow,
    Red,
    Gray,
}

impl StatusLevel {
    /// Rank on the ordering `red(0) < yellow(1) < green(2)`.
    ///
    /// `Gray` has no rank: an unreviewed jurisdiction is neither better
    /// nor worse than anything.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Self::Red => Some(0),
            Self::Yellow => Some(1),
            Self::Green => Some(2),
            Self::Gray => None,
        }
    }

    /// Whether `self` is strictly better than `other`.
    pub fn is_strictly_better_than(&self, other: StatusLevel) -> bool {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        }
    }
}

impl std::fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Gray => "gray",
        };
        f.write_str(s)
    }
}
