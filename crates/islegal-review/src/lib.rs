//! # islegal-review — Trust State Machine
//!
//! Governs transitions between the review states of a jurisdiction
//! profile and assigns a confidence level on promotion.
//!
//! ## States
//!
//! ```text
//! provisional ──▶ needs_review ──▶ reviewed ──▶ known (terminal)
//!                      │ ▲
//!                      └─┘  self-loop with diagnostic payload
//! ```
//!
//! Promotion to `reviewed` requires at least one official source, all
//! required law fields populated, and (when policy demands it) an
//! effective date. A failing check routes the profile back into
//! `needs_review` with a reason note — recoverable, never raised.
//!
//! A `known` or `reviewed` profile is never downgraded automatically:
//! any write that would reduce trust without an explicit demotion is
//! rejected as fatal.
//!
//! Every transition appends entries to the profile's append-only
//! `review_status_history`; history is never rewritten.

pub mod batch;
pub mod transition;

pub use batch::select_promotion_batch;
pub use transition::{
    apply_review, demote_for_rereview, promote_to_needs_review, ReviewDefect, ReviewOutcome,
    ReviewPolicy, ReviewUpdate, TransitionError,
};
