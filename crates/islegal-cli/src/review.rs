//! # Review-Apply Subcommand
//!
//! Applies a human-prepared review file to one jurisdiction. Quality
//! defects defer the profile back into `needs_review` with a diagnostic
//! note; an attempted downgrade of a trusted profile is fatal.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;

use islegal_core::{JurisdictionKey, Timestamp};
use islegal_engine::{JsonDirStore, JurisdictionStore};
use islegal_review::{apply_review, ReviewOutcome, ReviewPolicy, ReviewUpdate};

/// Arguments for the review-apply subcommand.
#[derive(Args, Debug)]
pub struct ReviewApplyArgs {
    /// Corpus directory of per-jurisdiction profile documents.
    #[arg(long, default_value = "data/laws")]
    pub dir: PathBuf,

    /// Jurisdiction key, e.g. `DE` or `US-CO`.
    #[arg(long)]
    pub key: String,

    /// Path to the review file (a JSON `ReviewUpdate` document).
    #[arg(long)]
    pub file: PathBuf,

    /// Require an effective date for promotion.
    #[arg(long)]
    pub require_effective_date: bool,
}

/// Apply one review file.
pub fn run(args: &ReviewApplyArgs) -> anyhow::Result<()> {
    let key = JurisdictionKey::new(&args.key)?;
    let store = JsonDirStore::open(&args.dir)
        .with_context(|| format!("cannot open corpus at {}", args.dir.display()))?;

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read review file {}", args.file.display()))?;
    let update: ReviewUpdate = serde_json::from_str(&content)
        .with_context(|| format!("invalid review file {}", args.file.display()))?;

    let Some(mut profile) = store.get(&key)? else {
        bail!("no stored profile for {key}");
    };

    let policy = ReviewPolicy {
        require_effective_date: args.require_effective_date,
    };
    let outcome = apply_review(&mut profile, update, policy, Timestamp::now())?;
    store.put(&profile)?;

    match outcome {
        ReviewOutcome::Promoted { confidence } => {
            println!("{key} reviewed ({confidence:?} confidence)");
        }
        ReviewOutcome::Deferred(defect) => {
            println!("{key} deferred: {}", defect.note());
        }
    }
    Ok(())
}
