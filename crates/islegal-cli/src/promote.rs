//! # Promote Subcommand
//!
//! Selects a seeded batch of provisional profiles and promotes them to
//! `needs_review`, attaching the curated sources from the per-country
//! registry. Reproducible: the same corpus, registry, and seed always
//! yield the same batch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Deserialize;

use islegal_core::{JurisdictionKey, ReviewSource, Timestamp};
use islegal_engine::{JsonDirStore, JurisdictionStore};
use islegal_review::{promote_to_needs_review, select_promotion_batch};

/// Arguments for the promote subcommand.
#[derive(Args, Debug)]
pub struct PromoteArgs {
    /// Corpus directory of per-jurisdiction profile documents.
    #[arg(long, default_value = "data/laws")]
    pub dir: PathBuf,

    /// Per-country source registry attached at promotion.
    #[arg(long, default_value = "data/sources/registry.json")]
    pub registry: PathBuf,

    /// Maximum number of profiles to promote.
    #[arg(long, default_value_t = 5)]
    pub count: usize,

    /// Shuffle seed; rerun with the same seed to reproduce a batch.
    #[arg(long, default_value_t = 1337)]
    pub seed: u64,

    /// Select and print the batch without writing.
    #[arg(long)]
    pub dry_run: bool,
}

/// One entry in the source registry. The `*` entry, when present,
/// supplies fallback sources for codes without their own.
#[derive(Debug, Deserialize)]
struct RegistryEntry {
    country: String,
    #[serde(default)]
    sources: Vec<ReviewSource>,
}

/// Curated per-country review sources.
#[derive(Debug, Default)]
struct SourceRegistry {
    by_code: BTreeMap<String, Vec<ReviewSource>>,
    fallback: Option<Vec<ReviewSource>>,
}

impl SourceRegistry {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read source registry at {}", path.display()))?;
        let entries: Vec<RegistryEntry> = serde_json::from_str(&content)
            .with_context(|| format!("invalid source registry at {}", path.display()))?;
        let mut registry = Self::default();
        for entry in entries {
            let code = entry.country.to_uppercase();
            if code == "*" {
                registry.fallback = Some(entry.sources);
            } else {
                registry.by_code.insert(code, entry.sources);
            }
        }
        Ok(registry)
    }

    /// Sources for a key: exact key, then bare country, then the `*`
    /// fallback.
    fn sources_for(&self, key: &JurisdictionKey) -> Option<&[ReviewSource]> {
        self.by_code
            .get(key.as_str())
            .or_else(|| self.by_code.get(key.country()))
            .or(self.fallback.as_ref())
            .map(Vec::as_slice)
    }
}

/// Promote a batch of provisional profiles to `needs_review`.
pub fn run(args: &PromoteArgs) -> anyhow::Result<()> {
    let store = JsonDirStore::open(&args.dir)
        .with_context(|| format!("cannot open corpus at {}", args.dir.display()))?;
    let registry = SourceRegistry::load(&args.registry)?;

    let mut candidates = Vec::new();
    for key in store.keys()? {
        // Codes absent from the registry never enter a batch.
        if registry.sources_for(&key).is_none() {
            tracing::warn!(key = %key, "no registry sources; skipping");
            continue;
        }
        if let Some(profile) = store.get(&key)? {
            candidates.push((key, profile.review_status));
        }
    }
    let batch = select_promotion_batch(&candidates, args.count, args.seed);
    if batch.is_empty() {
        println!("no provisional profiles with registry sources");
        return Ok(());
    }

    for key in &batch {
        if args.dry_run {
            println!("would promote {key}");
            continue;
        }
        let mut profile = store
            .get(key)?
            .with_context(|| format!("profile {key} disappeared during batch"))?;
        let sources = registry
            .sources_for(key)
            .map(<[ReviewSource]>::to_vec)
            .with_context(|| format!("no registry sources for {key}"))?;
        promote_to_needs_review(&mut profile, sources, Timestamp::now())
            .with_context(|| format!("promotion refused for {key}"))?;
        store.put(&profile)?;
        println!("promoted {key} ({:?})", profile.review_confidence);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use islegal_core::{ConfidenceLevel, JurisdictionProfile, ReviewStatus};

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("islegal-promote-test")
            .join(format!("{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn seed_provisional(store: &JsonDirStore, key: &str) {
        let mut p = JurisdictionProfile::placeholder(JurisdictionKey::new(key).unwrap());
        p.review_status = ReviewStatus::Provisional;
        store.put(&p).unwrap();
    }

    fn write_registry(root: &Path, content: &str) -> PathBuf {
        let path = root.join("registry.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn args(root: &Path, registry: PathBuf) -> PromoteArgs {
        PromoteArgs {
            dir: root.join("laws"),
            registry,
            count: 5,
            seed: 7,
            dry_run: false,
        }
    }

    fn load(root: &Path, key: &str) -> JurisdictionProfile {
        let store = JsonDirStore::open(root.join("laws")).unwrap();
        store
            .get(&JurisdictionKey::new(key).unwrap())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_promotion_attaches_registry_sources() {
        let root = temp_root("attach");
        let store = JsonDirStore::open(root.join("laws")).unwrap();
        seed_provisional(&store, "DE");
        let registry = write_registry(
            &root,
            r#"[{ "country": "DE", "sources": [
                { "title": "Federal portal", "url": "https://example.gov/de", "kind": "official" }
            ]}]"#,
        );

        run(&args(&root, registry)).unwrap();

        let promoted = load(&root, "DE");
        assert_eq!(promoted.review_status, ReviewStatus::NeedsReview);
        // One official registry source lifts confidence to medium.
        assert_eq!(promoted.review_confidence, ConfidenceLevel::Medium);
        assert_eq!(promoted.review_sources.len(), 1);
        assert_eq!(promoted.review_sources[0].url, "https://example.gov/de");
    }

    #[test]
    fn test_unregistered_code_is_never_promoted() {
        let root = temp_root("skip");
        let store = JsonDirStore::open(root.join("laws")).unwrap();
        seed_provisional(&store, "FR");
        let registry = write_registry(&root, r#"[{ "country": "DE", "sources": [] }]"#);

        run(&args(&root, registry)).unwrap();

        assert_eq!(load(&root, "FR").review_status, ReviewStatus::Provisional);
    }

    #[test]
    fn test_fallback_entry_covers_unlisted_codes() {
        let root = temp_root("fallback");
        let store = JsonDirStore::open(root.join("laws")).unwrap();
        seed_provisional(&store, "FR");
        let registry = write_registry(
            &root,
            r#"[{ "country": "*", "sources": [
                { "title": "World index", "url": "https://example.org/fr", "kind": "neutral" }
            ]}]"#,
        );

        run(&args(&root, registry)).unwrap();

        let promoted = load(&root, "FR");
        assert_eq!(promoted.review_status, ReviewStatus::NeedsReview);
        // No official source among the fallbacks: confidence stays low.
        assert_eq!(promoted.review_confidence, ConfidenceLevel::Low);
        assert_eq!(promoted.review_sources[0].url, "https://example.org/fr");
    }

    #[test]
    fn test_regional_key_prefers_exact_registry_entry() {
        let mut registry = SourceRegistry::default();
        registry.by_code.insert(
            "US".into(),
            vec![ReviewSource {
                title: "Country".into(),
                url: "https://example.gov/us".into(),
                kind: islegal_core::SourceKind::Official,
            }],
        );
        registry.by_code.insert(
            "US-CO".into(),
            vec![ReviewSource {
                title: "State".into(),
                url: "https://example.gov/us-co".into(),
                kind: islegal_core::SourceKind::Official,
            }],
        );
        let key = JurisdictionKey::new("US-CO").unwrap();
        let sources = registry.sources_for(&key).unwrap();
        assert_eq!(sources[0].url, "https://example.gov/us-co");
        let country = JurisdictionKey::new("US").unwrap();
        assert_eq!(
            registry.sources_for(&country).unwrap()[0].url,
            "https://example.gov/us"
        );
    }
}
