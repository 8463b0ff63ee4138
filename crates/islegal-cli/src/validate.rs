//! # Validate Subcommand
//!
//! Schema-checks every profile document in a corpus directory and
//! reports structured violations per file.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;

use islegal_schema::ProfileValidator;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Corpus directory of per-jurisdiction profile documents.
    #[arg(long, default_value = "data/laws")]
    pub dir: PathBuf,
}

/// Validate every `*.json` document under the corpus directory.
pub fn run(args: &ValidateArgs) -> anyhow::Result<()> {
    let validator = ProfileValidator::new()?;

    let mut checked = 0usize;
    let mut failures = Vec::new();
    let entries = std::fs::read_dir(&args.dir)
        .with_context(|| format!("cannot read corpus directory {}", args.dir.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    for path in paths {
        checked += 1;
        if let Err(err) = validator.validate_file(&path) {
            eprintln!("{err}");
            failures.push(path);
        }
    }

    if !failures.is_empty() {
        bail!("{} of {checked} profile documents failed validation", failures.len());
    }
    println!("{checked} profile documents valid");
    Ok(())
}
