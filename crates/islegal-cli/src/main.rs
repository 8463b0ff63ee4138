//! # islegal CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Legality engine CLI.
///
/// Validates the profile corpus, drives the review pipeline, and
/// resolves jurisdictions to trusted answers.
#[derive(Parser, Debug)]
#[command(name = "islegal", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Schema-check every profile document in a corpus directory.
    Validate(islegal_cli::validate::ValidateArgs),
    /// Promote a seeded batch of provisional profiles to needs_review.
    Promote(islegal_cli::promote::PromoteArgs),
    /// Apply a review file to one jurisdiction.
    ReviewApply(islegal_cli::review::ReviewApplyArgs),
    /// Resolve a jurisdiction and print the full answer.
    Check(islegal_cli::check::CheckArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => islegal_cli::validate::run(&args),
        Commands::Promote(args) => islegal_cli::promote::run(&args),
        Commands::ReviewApply(args) => islegal_cli::review::run(&args),
        Commands::Check(args) => islegal_cli::check::run(&args),
    }
}
