//! # Check Subcommand
//!
//! Resolves one jurisdiction against the corpus and prints the full
//! answer as JSON: status, verification, nearest-better jurisdiction,
//! and cache/location metadata.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use islegal_core::JurisdictionKey;
use islegal_engine::{JsonDirStore, ResolveRequest, Resolver};
use islegal_geo::GeoPoint;
use islegal_verify::{CommandVerifier, Verifier, VerifyOutcome, VerifyReason};

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Corpus directory of per-jurisdiction profile documents.
    #[arg(long, default_value = "data/laws")]
    pub dir: PathBuf,

    /// ISO country code, e.g. `DE` or `US`.
    pub country: String,

    /// Region code for sub-national jurisdictions, e.g. `CO`.
    #[arg(long)]
    pub region: Option<String>,

    /// GPS latitude; with --lon, resolves as a GPS-sourced request.
    #[arg(long, requires = "lon")]
    pub lat: Option<f64>,

    /// GPS longitude.
    #[arg(long, requires = "lat")]
    pub lon: Option<f64>,

    /// Path to the external verification runner; stale evidence stays
    /// pending (OFFLINE) when omitted.
    #[arg(long)]
    pub verifier: Option<PathBuf>,
}

/// Verifier used when no external runner is configured.
struct DisabledVerifier;

impl Verifier for DisabledVerifier {
    fn verify(&self, _key: &JurisdictionKey) -> VerifyOutcome {
        VerifyOutcome::pending(VerifyReason::Offline)
    }
}

/// Resolve one jurisdiction and print the answer.
pub fn run(args: &CheckArgs) -> anyhow::Result<()> {
    let store = JsonDirStore::open(&args.dir)
        .with_context(|| format!("cannot open corpus at {}", args.dir.display()))?;
    let verifier: Box<dyn Verifier> = match &args.verifier {
        Some(program) => Box::new(CommandVerifier::new(program)),
        None => Box::new(DisabledVerifier),
    };
    let resolver = Resolver::new(Box::new(store), verifier);

    let request = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => ResolveRequest::gps(
            args.country.as_str(),
            args.region.clone(),
            GeoPoint { lat, lon },
        ),
        _ => ResolveRequest::manual(args.country.as_str(), args.region.clone()),
    };

    let resolution = resolver.resolve(&request)?;
    println!("{}", serde_json::to_string_pretty(&resolution)?);
    Ok(())
}
