//! # islegal-cli — Operator Command-Line Interface
//!
//! The operator surface over the legality engine. Replaces the ad-hoc
//! corpus scripts with a structured clap-based CLI.
//!
//! ## Subcommands
//!
//! - `validate` — schema-check every profile document in a corpus
//!   directory
//! - `promote` — select and apply a seeded batch of
//!   provisional → needs_review promotions
//! - `review-apply` — apply a review file to one jurisdiction
//! - `check` — resolve a jurisdiction and print the full answer
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business
//!   logic.
//! - Handler functions delegate to domain crates — no business logic
//!   here.
//! - Handlers return `anyhow::Result`; domain error types surface
//!   through their `Display` impls.

pub mod check;
pub mod promote;
pub mod review;
pub mod validate;
