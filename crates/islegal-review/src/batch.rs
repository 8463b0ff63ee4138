//! # Promotion Batch Selection
//!
//! Picks which provisional profiles enter review next. Candidates are
//! sorted by key and then shuffled with a seeded RNG, so a batch run is
//! reproducible given the same corpus and seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use islegal_core::{JurisdictionKey, ReviewStatus};

/// Select up to `count` provisional jurisdictions for promotion.
///
/// Only `provisional` entries are eligible. The eligible set is sorted
/// by key before the seeded shuffle, so iteration order of the caller's
/// map cannot change the outcome.
pub fn select_promotion_batch(
    candidates: &[(JurisdictionKey, ReviewStatus)],
    count: usize,
    seed: u64,
) -> Vec<JurisdictionKey> {
    let mut eligible: Vec<&JurisdictionKey> = candidates
        .iter()
        .filter(|(_, status)| *status == ReviewStatus::Provisional)
        .map(|(key, _)| key)
        .collect();
    eligible.sort();
    eligible.dedup();

    let mut rng = StdRng::seed_from_u64(seed);
    eligible.shuffle(&mut rng);
    eligible.into_iter().take(count).cloned().collect()
}
