//! # Review Transitions
//!
//! The typed transition functions of the trust state machine. Each
//! transition validates the current state, mutates the profile, and
//! appends to the audit history — illegal transitions are an error path,
//! not a string comparison at the call site.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use islegal_core::{
    ConfidenceLevel, JurisdictionProfile, LawStatus, ReviewSource, ReviewStatus, Timestamp,
};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors that can occur during trust-state transitions.
#[derive(Error, Debug)]
pub enum TransitionError {
    /// The profile is not in the state the transition requires.
    #[error("invalid review transition for {key}: {from} -> {to}")]
    InvalidTransition {
        /// Jurisdiction key.
        key: String,
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },

    /// The write would reduce trust on a reviewed/known profile without
    /// an explicit demotion. Fatal to the write operation.
    #[error("illegal demotion for {key}: profile is {from} and may not be silently downgraded")]
    IllegalDemotion {
        /// Jurisdiction key.
        key: String,
        /// The trusted state that would have been overwritten.
        from: String,
    },
}

// ─── Diagnostic Defects ──────────────────────────────────────────────

/// Evidence-quality defects that defer a promotion. Recoverable: they
/// route the profile back into `needs_review` with a diagnostic note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDefect {
    /// No review source passed the official-domain registry check.
    MissingOfficialSources,
    /// At least one required law field is still `unknown`.
    MissingRequiredFields,
    /// Policy demands an effective date and none is present.
    MissingEffectiveDate,
}

impl ReviewDefect {
    /// The diagnostic note appended to the profile.
    pub fn note(&self) -> &'static str {
        match self {
            Self::MissingOfficialSources => "missing official sources",
            Self::MissingRequiredFields => "missing required fields",
            Self::MissingEffectiveDate => "missing effective_date",
        }
    }
}

// ─── Review Input ────────────────────────────────────────────────────

/// Policy knobs for the review pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReviewPolicy {
    /// Whether promotion to `reviewed` requires an effective date.
    pub require_effective_date: bool,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            require_effective_date: false,
        }
    }
}

/// A human-applied review: field updates plus the sources backing them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUpdate {
    /// Medical status update.
    pub medical: Option<LawStatus>,
    /// Recreational status update.
    pub recreational: Option<LawStatus>,
    /// Public-use status update.
    pub public_use: Option<LawStatus>,
    /// Home-grow status update.
    pub home_grow: Option<LawStatus>,
    /// Cross-border status update.
    pub cross_border: Option<LawStatus>,
    /// Possession limit update.
    pub possession_limit: Option<String>,
    /// Date the governing law took effect.
    pub effective_date: Option<String>,
    /// Sources backing the review; replaces the profile's review sources
    /// when non-empty.
    pub sources: Vec<ReviewSource>,
}

/// Outcome of a review application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The profile was promoted to `reviewed`.
    Promoted {
        /// Confidence assigned from the official-source count.
        confidence: ConfidenceLevel,
    },
    /// A quality check failed; the profile looped back into
    /// `needs_review` with a diagnostic note.
    Deferred(ReviewDefect),
}

// ─── Transitions ─────────────────────────────────────────────────────

/// `provisional → needs_review`: attach candidate sources.
///
/// Allowed even with zero official sources, but confidence is then
/// downgraded to `low` (one official source yields `medium`).
///
/// # Errors
///
/// Returns `IllegalDemotion` when the profile (or its history tail)
/// already outranks `needs_review`, and `InvalidTransition` when the
/// profile is in `needs_review` already.
pub fn promote_to_needs_review(
    profile: &mut JurisdictionProfile,
    sources: Vec<ReviewSource>,
    now: Timestamp,
) -> Result<(), TransitionError> {
    guard_no_demotion(profile, ReviewStatus::NeedsReview)?;
    if profile.review_status == ReviewStatus::NeedsReview {
        return Err(invalid(profile, "needs_review"));
    }

    let official = sources
        .iter()
        .filter(|s| s.kind == islegal_core::SourceKind::Official)
        .count();
    let confidence = if official >= 1 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };

    record_transition(profile, ReviewStatus::NeedsReview, now);
    profile.review_sources = sources;
    profile.review_confidence = confidence;
    profile.updated_at = Some(now);
    tracing::info!(
        key = %profile.id,
        confidence = ?confidence,
        official_sources = official,
        "promoted to needs_review"
    );
    Ok(())
}

/// `needs_review → reviewed`, or a diagnostic self-loop.
///
/// Checks, in order: at least one official source, all required law
/// fields non-unknown, and an effective date when `policy` demands one.
/// The first failing check appends `needs_review` again with a reason
/// note and returns `ReviewOutcome::Deferred` — not an error.
///
/// # Errors
///
/// Returns `IllegalDemotion` when the profile is already trusted, and
/// `InvalidTransition` when it is not currently in `needs_review`.
pub fn apply_review(
    profile: &mut JurisdictionProfile,
    update: ReviewUpdate,
    policy: ReviewPolicy,
    now: Timestamp,
) -> Result<ReviewOutcome, TransitionError> {
    guard_no_demotion(profile, ReviewStatus::Reviewed)?;
    if profile.review_status != ReviewStatus::NeedsReview {
        return Err(invalid(profile, "reviewed"));
    }

    apply_field_updates(profile, &update);
    if !update.sources.is_empty() {
        profile.review_sources = update.sources;
    }

    if let Some(defect) = first_defect(profile, policy) {
        record_transition(profile, ReviewStatus::NeedsReview, now);
        profile.review_notes = Some(defect.note().to_string());
        profile.updated_at = Some(now);
        tracing::warn!(key = %profile.id, defect = ?defect, "review deferred");
        return Ok(ReviewOutcome::Deferred(defect));
    }

    let confidence = ConfidenceLevel::from_official_count(profile.official_review_source_count());
    record_transition(profile, ReviewStatus::Reviewed, now);
    profile.review_confidence = confidence;
    profile.review_notes = None;
    profile.updated_at = Some(now);
    tracing::info!(key = %profile.id, confidence = ?confidence, "promoted to reviewed");
    Ok(ReviewOutcome::Promoted { confidence })
}

/// Explicit demotion of a trusted profile back to `needs_review`.
///
/// This is the only legal path that reduces trust, and it always leaves
/// an appended history entry plus a `review_notes` explanation.
///
/// # Errors
///
/// Returns `InvalidTransition` when the profile is not currently
/// trusted.
pub fn demote_for_rereview(
    profile: &mut JurisdictionProfile,
    reason: &str,
    now: Timestamp,
) -> Result<(), TransitionError> {
    if !profile.review_status.is_trusted() {
        return Err(invalid(profile, "needs_review"));
    }
    record_transition(profile, ReviewStatus::NeedsReview, now);
    profile.review_notes = Some(reason.to_string());
    profile.updated_at = Some(now);
    tracing::warn!(key = %profile.id, reason, "explicit demotion to needs_review");
    Ok(())
}

// ─── Internals ───────────────────────────────────────────────────────

/// Reject writes whose target rank is below the profile's current rank
/// (checking the history tail as well, in case the status field was
/// edited out of band).
fn guard_no_demotion(
    profile: &JurisdictionProfile,
    target: ReviewStatus,
) -> Result<(), TransitionError> {
    let current = profile.review_status.rank();
    let tail = profile
        .review_status_history
        .last()
        .map(|e| e.status.rank())
        .unwrap_or(0);
    if current.max(tail) > target.rank() {
        return Err(TransitionError::IllegalDemotion {
            key: profile.id.to_string(),
            from: profile.review_status.to_string(),
        });
    }
    Ok(())
}

fn invalid(profile: &JurisdictionProfile, to: &str) -> TransitionError {
    TransitionError::InvalidTransition {
        key: profile.id.to_string(),
        from: profile.review_status.to_string(),
        to: to.to_string(),
    }
}

/// Append the outgoing state (dated by the profile's last update) and
/// the new state, then flip the status field. Two entries per
/// transition, matching the audit-log convention.
fn record_transition(profile: &mut JurisdictionProfile, to: ReviewStatus, now: Timestamp) {
    let from_at = profile.updated_at.unwrap_or(now);
    profile
        .review_status_history
        .push(profile.review_status, from_at);
    profile.review_status_history.push(to, now);
    profile.review_status = to;
}

fn apply_field_updates(profile: &mut JurisdictionProfile, update: &ReviewUpdate) {
    if let Some(v) = update.medical {
        profile.medical = v;
    }
    if let Some(v) = update.recreational {
        profile.recreational = v;
    }
    if let Some(v) = update.public_use {
        profile.public_use = v;
    }
    if let Some(v) = update.home_grow {
        profile.home_grow = v;
    }
    if let Some(v) = update.cross_border {
        profile.cross_border = v;
    }
    if let Some(v) = &update.possession_limit {
        profile.possession_limit = Some(v.clone());
    }
    if let Some(v) = &update.effective_date {
        profile.effective_date = Some(v.clone());
    }
}

fn first_defect(profile: &JurisdictionProfile, policy: ReviewPolicy) -> Option<ReviewDefect> {
    if profile.official_review_source_count() < 1 {
        return Some(ReviewDefect::MissingOfficialSources);
    }
    if !profile.required_fields_known() {
        return Some(ReviewDefect::MissingRequiredFields);
    }
    if policy.require_effective_date && profile.effective_date.is_none() {
        return Some(ReviewDefect::MissingEffectiveDate);
    }
    None
}

// ─── Tests ───────────────────────────────────────────────────────────
