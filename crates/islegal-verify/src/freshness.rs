//! # Evidence Freshness
//!
//! An evidence record is fresh while the most recent of its verification
//! timestamps is within the TTL. A stale record triggers one on-demand
//! re-verification attempt per request (see [`crate::verifier`]); it
//! never blocks the answer.

use islegal_core::{MachineVerified, Timestamp};

/// Default evidence TTL in days.
pub const FRESHNESS_TTL_DAYS: i64 = 45;

/// Whether the evidence block is still fresh at `now`.
///
/// Fresh iff `now - max(verified_at, retrieved_at, generated_at)` is at
/// most `ttl_days`. A block carrying none of the three timestamps is
/// stale.
pub fn evidence_is_fresh(mv: &MachineVerified, now: Timestamp, ttl_days: i64) -> bool {
    let newest = [mv.verified_at, mv.retrieved_at, mv.generated_at]
        .into_iter()
        .flatten()
        .max();
    match newest {
        Some(ts) => ts.days_until(now) <= ttl_days,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use islegal_core::{ConfidenceLevel, EvidenceKind, LawStatus};

    fn block() -> MachineVerified {
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
        }
    }

    #[test]
    fn test_fresh_within_ttl() {
        let now = Timestamp::parse("2025-06-01T00:00:00Z").unwrap();
        let mut mv = block();
        mv.retrieved_at = Some(now.minus_days(10));
        assert!(evidence_is_fresh(&mv, now, FRESHNESS_TTL_DAYS));
    }

    #[test]
    fn test_stale_beyond_ttl() {
        let now = Timestamp::parse("2025-06-01T00:00:00Z").unwrap();
        let mut mv = block();
        mv.retrieved_at = Some(now.minus_days(46));
        assert!(!evidence_is_fresh(&mv, now, FRESHNESS_TTL_DAYS));
    }

    #[test]
    fn test_newest_timestamp_wins() {
        let now = Timestamp::parse("2025-06-01T00:00:00Z").unwrap();
        let mut mv = block();
        mv.generated_at = Some(now.minus_days(200));
        mv.retrieved_at = Some(now.minus_days(90));
        mv.verified_at = Some(now.minus_days(5));
        assert!(evidence_is_fresh(&mv, now, FRESHNESS_TTL_DAYS));
    }

    #[test]
    fn test_no_timestamps_is_stale() {
        let now = Timestamp::now();
        assert!(!evidence_is_fresh(&block(), now, FRESHNESS_TTL_DAYS));
    }

    #[test]
    fn test_ttl_boundary_is_inclusive() {
        let now = Timestamp::parse("2025-06-01T00:00:00Z").unwrap();
        let mut mv = block();
        mv.verified_at = Some(now.minus_days(45));
        assert!(evidence_is_fresh(&mv, now, FRESHNESS_TTL_DAYS));
    }
}
