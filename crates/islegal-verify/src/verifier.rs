//! # On-Demand Verifier Capability
//!
//! The external scraping/verification runner is modeled as a capability
//! trait injected into the engine, so core logic is testable without
//! spawning real subprocesses.
//!
//! The subprocess implementation runs the external runner with a bounded
//! timeout. Any failure mode — missing binary, non-zero exit, timeout —
//! degrades to `Pending` with a reason code. The caller attempts at most
//! one verification per request and never propagates a failure.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use islegal_core::JurisdictionKey;

/// Default bound on an on-demand verification run.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(20);

/// Result status of an on-demand verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyStatus {
    /// The runner confirmed the evidence.
    Verified,
    /// Verification did not complete; the answer ships with the stale
    /// evidence flagged.
    Pending,
}

/// Machine-readable reason attached to a `Pending` outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerifyReason {
    /// Completed normally.
    Ok,
    /// The jurisdiction key failed ISO validation on the runner side.
    InvalidIso,
    /// The runner has no network access.
    Offline,
    /// The runner exceeded its time bound.
    Timeout,
    /// Any other failure.
    Unknown,
}

/// Outcome of one verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    /// Whether verification completed.
    pub status: VerifyStatus,
    /// Reason code.
    pub reason: VerifyReason,
}

impl VerifyOutcome {
    /// A successful outcome.
    pub fn verified() -> Self {
        Self {
            status: VerifyStatus::Verified,
            reason: VerifyReason::Ok,
        }
    }

    /// A degraded outcome with the given reason.
    pub fn pending(reason: VerifyReason) -> Self {
        Self {
            status: VerifyStatus::Pending,
            reason,
        }
    }
}

/// Capability interface to the external verification runner.
pub trait Verifier: Send + Sync {
    /// Attempt to re-verify evidence for one jurisdiction.
    ///
    /// Implementations must not panic and must bound their own run time;
    /// a failed or overlong attempt reports `Pending`, never an error.
    fn verify(&self, key: &JurisdictionKey) -> VerifyOutcome;
}

// ─── Subprocess Runner ───────────────────────────────────────────────

/// Runs the external verification runner as a subprocess with a bounded
/// wait, polling `try_wait` and killing the child at the deadline.
#[derive(Debug, Clone)]
pub struct CommandVerifier {
    program: PathBuf,
    timeout: Duration,
}

impl CommandVerifier {
    /// A verifier invoking `program --iso <KEY>` with the default
    /// timeout.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: VERIFY_TIMEOUT,
        }
    }

    /// Override the time bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Verifier for CommandVerifier {
    fn verify(&self, key: &JurisdictionKey) -> VerifyOutcome {
        let child = Command::new(&self.program)
            .arg("--iso")
            .arg(key.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "verify runner failed to spawn");
                return VerifyOutcome::pending(VerifyReason::Unknown);
            }
        };

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    return if status.success() {
                        VerifyOutcome::verified()
                    } else {
                        // Runner exit codes: 1 reports an invalid ISO
                        // key, 2 marks an offline run.
                        let reason = match status.code() {
                            Some(1) => VerifyReason::InvalidIso,
                            Some(2) => VerifyReason::Offline,
                            _ => VerifyReason::Unknown,
                        };
                        tracing::debug!(key = %key, code = ?status.code(), "verify runner pending");
                        VerifyOutcome::pending(reason)
                    };
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        tracing::warn!(key = %key, "verify runner timed out");
                        return VerifyOutcome::pending(VerifyReason::Timeout);
                    }
                    std::thread::sleep(Duration::from_millis(25));
                }
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "verify runner wait failed");
                    return VerifyOutcome::pending(VerifyReason::Unknown);
                }
            }
        }
    }
}

// ─── Mock ────────────────────────────────────────────────────────────

/// Canned verifier for tests. Records how many times it was invoked.
#[derive(Debug, Default)]
pub struct MockVerifier {
    outcome: Option<VerifyOutcome>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockVerifier {
    /// A mock returning `outcome` on every call.
    pub fn returning(outcome: VerifyOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of times `verify` was called.
    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Verifier for MockVerifier {
    fn verify(&self, _key: &JurisdictionKey) -> VerifyOutcome {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.outcome
            .unwrap_or_else(|| VerifyOutcome::pending(VerifyReason::Offline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> JurisdictionKey {
        JurisdictionKey::new(s).unwrap()
    }

    #[test]
    fn test_mock_records_calls() {
        let mock = MockVerifier::returning(VerifyOutcome::verified());
        assert_eq!(mock.call_count(), 0);
        let outcome = mock.verify(&key("DE"));
        assert_eq!(outcome.status, VerifyStatus::Verified);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_default_mock_is_offline_pending() {
        let mock = MockVerifier::default();
        let outcome = mock.verify(&key("DE"));
        assert_eq!(outcome, VerifyOutcome::pending(VerifyReason::Offline));
    }

    #[test]
    fn test_missing_program_degrades_to_pending() {
        let verifier = CommandVerifier::new("/nonexistent/verify-runner")
            .with_timeout(Duration::from_millis(100));
        let outcome = verifier.verify(&key("DE"));
        assert_eq!(outcome.status, VerifyStatus::Pending);
        assert_eq!(outcome.reason, VerifyReason::Unknown);
    }

    #[cfg(unix)]
    fn fake_runner(name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let dir = std::env::temp_dir().join("islegal-verify-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}-{}.sh", std::process::id()));
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_runner_exit_codes_map_to_reasons() {
        let timeout = Duration::from_secs(5);
        let ok = CommandVerifier::new(fake_runner("ok", "exit 0")).with_timeout(timeout);
        assert_eq!(ok.verify(&key("DE")), VerifyOutcome::verified());

        let invalid =
            CommandVerifier::new(fake_runner("invalid-iso", "exit 1")).with_timeout(timeout);
        assert_eq!(
            invalid.verify(&key("DE")),
            VerifyOutcome::pending(VerifyReason::InvalidIso)
        );

        let offline = CommandVerifier::new(fake_runner("offline", "exit 2")).with_timeout(timeout);
        assert_eq!(
            offline.verify(&key("DE")),
            VerifyOutcome::pending(VerifyReason::Offline)
        );

        let failed = CommandVerifier::new(fake_runner("failed", "exit 9")).with_timeout(timeout);
        assert_eq!(
            failed.verify(&key("DE")),
            VerifyOutcome::pending(VerifyReason::Unknown)
        );
    }

    #[test]
    fn test_reason_serde_shape() {
        assert_eq!(
            serde_json::to_string(&VerifyReason::InvalidIso).unwrap(),
            "\"INVALID_ISO\""
        );
        assert_eq!(
            serde_json::to_string(&VerifyReason::Timeout).unwrap(),
            "\"TIMEOUT\""
        );
    }
}
