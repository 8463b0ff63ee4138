//! # Jurisdiction & Evidence Stores
//!
//! The engine consumes two external key-value stores: the jurisdiction
//! corpus (one profile document per key) and the machine-collected
//! evidence blocks. Both are modeled as capability traits with an
//! in-memory implementation for tests and a JSON-directory
//! implementation matching the on-disk corpus layout.
//!
//! ## Write Discipline
//!
//! Writes are last-writer-wins per jurisdiction key, serialized by a
//! per-key lock so two promotions of the same key never interleave.
//! Every write re-checks the no-silent-downgrade invariant against the
//! stored document: a put that would reduce trust without an appended
//! history entry is rejected as [`StoreError::IllegalDemotion`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use islegal_core::{JurisdictionKey, JurisdictionProfile, MachineVerified};

/// Errors raised by store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The write would reduce trust on a reviewed/known profile without
    /// an explicit history append. Fatal to the write operation.
    #[error("illegal demotion for {key}: stored profile is {from} and may not be silently downgraded")]
    IllegalDemotion {
        /// Jurisdiction key.
        key: String,
        /// The trusted state that would have been overwritten.
        from: String,
    },

    /// A stored document could not be parsed or a profile could not be
    /// serialized.
    #[error("serialization error for {key}: {reason}")]
    Serialization {
        /// Jurisdiction key or file path.
        key: String,
        /// Underlying reason.
        reason: String,
    },

    /// IO error reading or writing the corpus directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read/write access to the jurisdiction corpus.
pub trait JurisdictionStore: Send + Sync {
    /// Load the profile for a key, if one is stored.
    fn get(&self, key: &JurisdictionKey) -> Result<Option<JurisdictionProfile>, StoreError>;

    /// Store a profile under its key, last-writer-wins.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IllegalDemotion`] if the write would lower
    /// the stored trust state without an appended history entry.
    fn put(&self, profile: &JurisdictionProfile) -> Result<(), StoreError>;

    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<JurisdictionKey>, StoreError>;
}

/// Read access to machine-collected evidence blocks.
pub trait EvidenceStore: Send + Sync {
    /// Load the evidence block for a key, if one exists.
    fn get(&self, key: &JurisdictionKey) -> Result<Option<MachineVerified>, StoreError>;
}

/// The no-silent-downgrade check applied on every put.
///
/// A lower-ranked incoming status is legal only when the incoming
/// history is longer than the stored one — an explicit demotion always
/// appends. The stored history tail participates in the rank check so a
/// status field edited out of band cannot defeat the guard.
fn guard_put(
    existing: Option<&JurisdictionProfile>,
    incoming: &JurisdictionProfile,
) -> Result<(), StoreError> {
    let Some(old) = existing else {
        return Ok(());
    };
    let tail = old
        .review_status_history
        .last()
        .map(|e| e.status.rank())
        .unwrap_or(0);
    let old_rank = old.review_status.rank().max(tail);
    let appended = incoming.review_status_history.len() > old.review_status_history.len();
    if incoming.review_status.rank() < old_rank && !appended {
        tracing::error!(
            key = %incoming.id,
            from = %old.review_status,
            to = %incoming.review_status,
            "rejected silent trust downgrade"
        );
        return Err(StoreError::IllegalDemotion {
            key: incoming.id.to_string(),
            from: old.review_status.to_string(),
        });
    }
    Ok(())
}

fn relock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ─── In-Memory Stores ────────────────────────────────────────────────

/// In-memory jurisdiction store for tests and small corpora.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: Mutex<BTreeMap<JurisdictionKey, JurisdictionProfile>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile without the demotion guard. Test setup only.
    pub fn seed(&self, profile: JurisdictionProfile) {
        relock(&self.profiles).insert(profile.id.clone(), profile);
    }
}

impl JurisdictionStore for MemoryStore {
    fn get(&self, key: &JurisdictionKey) -> Result<Option<JurisdictionProfile>, StoreError> {
        Ok(relock(&self.profiles).get(key).cloned())
    }

    fn put(&self, profile: &JurisdictionProfile) -> Result<(), StoreError> {
        let mut profiles = relock(&self.profiles);
        guard_put(profiles.get(&profile.id), profile)?;
        profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<JurisdictionKey>, StoreError> {
        Ok(relock(&self.profiles).keys().cloned().collect())
    }
}

/// In-memory evidence store.
#[derive(Debug, Default)]
pub struct MemoryEvidenceStore {
    blocks: Mutex<BTreeMap<JurisdictionKey, MachineVerified>>,
}

impl MemoryEvidenceStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an evidence block.
    pub fn insert(&self, key: JurisdictionKey, block: MachineVerified) {
        relock(&self.blocks).insert(key, block);
    }
}

impl EvidenceStore for MemoryEvidenceStore {
    fn get(&self, key: &JurisdictionKey) -> Result<Option<MachineVerified>, StoreError> {
        Ok(relock(&self.blocks).get(key).cloned())
    }
}

// ─── JSON Directory Store ────────────────────────────────────────────

/// Jurisdiction store over a directory of `<KEY>.json` documents, the
/// on-disk corpus layout.
///
/// Writes go through a per-key mutex and land atomically (write to a
/// sibling temp file, then rename), so concurrent promotions of the same
/// key serialize and readers never observe a torn document.
#[derive(Debug)]
pub struct JsonDirStore {
    root: PathBuf,
    locks: Mutex<BTreeMap<String, Arc<Mutex<()>>>>,
}

impl JsonDirStore {
    /// Open a store over `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            locks: Mutex::new(BTreeMap::new()),
        })
    }

    /// The corpus directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &JurisdictionKey) -> PathBuf {
        self.root.join(format!("{}.json", key.as_str()))
    }

    fn key_lock(&self, key: &JurisdictionKey) -> Arc<Mutex<()>> {
        let mut locks = relock(&self.locks);
        locks
            .entry(key.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn read_profile(&self, key: &JurisdictionKey) -> Result<Option<JurisdictionProfile>, StoreError> {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let profile = serde_json::from_str(&content).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            reason: format!("invalid profile document: {e}"),
        })?;
        Ok(Some(profile))
    }
}

impl JurisdictionStore for JsonDirStore {
    fn get(&self, key: &JurisdictionKey) -> Result<Option<JurisdictionProfile>, StoreError> {
        self.read_profile(key)
    }

    fn put(&self, profile: &JurisdictionProfile) -> Result<(), StoreError> {
        let lock = self.key_lock(&profile.id);
        let _guard = relock(&lock);

        guard_put(self.read_profile(&profile.id)?.as_ref(), profile)?;

        let json =
            serde_json::to_string_pretty(profile).map_err(|e| StoreError::Serialization {
                key: profile.id.to_string(),
                reason: e.to_string(),
            })?;
        let path = self.path_for(&profile.id);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<JurisdictionKey>, StoreError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Stray files that are not jurisdiction documents are skipped.
            if let Ok(key) = JurisdictionKey::new(stem) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use islegal_core::{ReviewStatus, Timestamp};

    fn profile(key: &str, status: ReviewStatus) -> JurisdictionProfile {
        let mut p = JurisdictionProfile::placeholder(JurisdictionKey::new(key).unwrap());
        p.review_status = status;
        p
    }

    fn temp_store(name: &str) -> JsonDirStore {
        let dir = std::env::temp_dir()
            .join("islegal-store-test")
            .join(format!("{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        JsonDirStore::open(dir).unwrap()
    }

    #[test]
    fn test_memory_round_trip() {
        let store = MemoryStore::new();
        let key = JurisdictionKey::new("DE").unwrap();
        assert!(store.get(&key).unwrap().is_none());
        store.put(&profile("DE", ReviewStatus::Provisional)).unwrap();
        assert_eq!(store.get(&key).unwrap().unwrap().country, "DE");
        assert_eq!(store.keys().unwrap(), vec![key]);
    }

    #[test]
    fn test_memory_rejects_silent_downgrade() {
        let store = MemoryStore::new();
        store.seed(profile("DE", ReviewStatus::Known));
        let err = store
            .put(&profile("DE", ReviewStatus::Provisional))
            .unwrap_err();
        assert!(matches!(err, StoreError::IllegalDemotion { .. }));
        // The stored document is untouched.
        let stored = store
            .get(&JurisdictionKey::new("DE").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(stored.review_status, ReviewStatus::Known);
    }

    #[test]
    fn test_explicit_demotion_with_appended_history_accepted() {
        let store = MemoryStore::new();
        store.seed(profile("DE", ReviewStatus::Known));
        let mut demoted = profile("DE", ReviewStatus::NeedsReview);
        demoted
            .review_status_history
            .push(ReviewStatus::Known, Timestamp::now());
        demoted
            .review_status_history
            .push(ReviewStatus::NeedsReview, Timestamp::now());
        demoted.review_notes = Some("source retracted".into());
        store.put(&demoted).unwrap();
    }

    #[test]
    fn test_downgrade_guard_checks_history_tail() {
        let store = MemoryStore::new();
        let mut stored = profile("DE", ReviewStatus::Provisional);
        stored
            .review_status_history
            .push(ReviewStatus::Reviewed, Timestamp::now());
        store.seed(stored);
        let err = store
            .put(&profile("DE", ReviewStatus::Provisional))
            .unwrap_err();
        assert!(matches!(err, StoreError::IllegalDemotion { .. }));
    }

    #[test]
    fn test_upgrade_always_accepted() {
        let store = MemoryStore::new();
        store.seed(profile("DE", ReviewStatus::Provisional));
        store.put(&profile("DE", ReviewStatus::NeedsReview)).unwrap();
        store.put(&profile("DE", ReviewStatus::Reviewed)).unwrap();
    }

    #[test]
    fn test_dir_store_round_trip() {
        let store = temp_store("round-trip");
        let key = JurisdictionKey::new("US-CO").unwrap();
        assert!(store.get(&key).unwrap().is_none());
        store.put(&profile("US-CO", ReviewStatus::Known)).unwrap();
        let loaded = store.get(&key).unwrap().unwrap();
        assert_eq!(loaded.id, key);
        assert_eq!(loaded.review_status, ReviewStatus::Known);
        assert!(store.root().join("US-CO.json").exists());
    }

    #[test]
    fn test_dir_store_keys_sorted_and_filtered() {
        let store = temp_store("keys");
        store.put(&profile("US-TX", ReviewStatus::Provisional)).unwrap();
        store.put(&profile("DE", ReviewStatus::Provisional)).unwrap();
        // A stray non-profile file is ignored.
        std::fs::write(store.root().join("README.md"), "notes").unwrap();
        std::fs::write(store.root().join("lowercase.json"), "{}").unwrap();
        let keys = store.keys().unwrap();
        assert_eq!(
            keys,
            vec![
                JurisdictionKey::new("DE").unwrap(),
                JurisdictionKey::new("US-TX").unwrap(),
            ]
        );
    }

    #[test]
    fn test_dir_store_rejects_silent_downgrade() {
        let store = temp_store("downgrade");
        store.put(&profile("DE", ReviewStatus::Known)).unwrap();
        let err = store
            .put(&profile("DE", ReviewStatus::NeedsReview))
            .unwrap_err();
        assert!(matches!(err, StoreError::IllegalDemotion { .. }));
    }

    #[test]
    fn test_dir_store_invalid_document_is_serialization_error() {
        let store = temp_store("invalid");
        std::fs::write(store.root().join("DE.json"), "not json").unwrap();
        let err = store.get(&JurisdictionKey::new("DE").unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Serialization { .. }));
    }

    #[test]
    fn test_evidence_store_round_trip() {
        use islegal_core::{ConfidenceLevel, EvidenceKind, LawStatus};
        let store = MemoryEvidenceStore::new();
        let key = JurisdictionKey::new("DE").unwrap();
        assert!(store.get(&key).unwrap().is_none());
        store.insert(
            key.clone(),
            MachineVerified {
                status_recreational: LawStatus::Restricted,
                status_medical: LawStatus::Allowed,
                evidence: Vec::new(),
                evidence_kind: EvidenceKind::Law,
                source_url: None,
                snapshot_path: None,
                confidence: ConfidenceLevel::Medium,
                official_source_ok: true,
                retrieved_at: None,
                generated_at: None,
                verified_at: None,
            },
        );
        assert!(store.get(&key).unwrap().is_some());
    }
}
