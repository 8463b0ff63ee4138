//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp enforcing ISO8601 with Z
//! suffix, truncated to seconds precision.
//!
//! Profile fingerprints hash `updated_at` / `verified_at` values, so two
//! renderings of the same instant (`+00:00` vs `Z`, with and without
//! sub-seconds) would produce different fingerprints and spurious cache
//! misses. Non-UTC inputs are rejected at construction — there is no
//! silent conversion.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating
///   sub-seconds.
/// - [`Timestamp::parse()`] — from an ISO8601 string, rejecting non-Z
///   offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse from an RFC 3339 string.
    ///
    /// **Rejects non-UTC inputs.** Only the `Z` suffix is accepted; even
    /// `+00:00` is rejected so that the canonical rendering of an instant
    /// is unique.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the string is not valid
    /// RFC 3339 or uses a non-Z offset.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::Validation {
                field: "timestamp".to_string(),
                reason: format!("must use Z suffix (UTC only), got {s:?}"),
            });
        }
        let parsed = DateTime::parse_from_rfc3339(s).map_err(|e| CoreError::Validation {
            field: "timestamp".to_string(),
            reason: format!("not RFC 3339: {e}"),
        })?;
        Ok(Self(truncate_to_seconds(parsed.with_timezone(&Utc))))
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Render the date component as `YYYY-MM-DD`.
    pub fn to_date_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// The underlying `DateTime<Utc>`.
    pub fn as_utc(&self) -> DateTime<Utc> {
        self.0
    }

    /// Whole minutes elapsed from `self` to `now`. Negative when `self`
    /// is in the future.
    pub fn minutes_until(&self, now: Timestamp) -> i64 {
        (now.0 - self.0).num_minutes()
    }

    /// Whole days elapsed from `self` to `now`.
    pub fn days_until(&self, now: Timestamp) -> i64 {
        (now.0 - self.0).num_days()
    }

    /// A timestamp `minutes` before this one. Used by tests to age cache
    /// entries.
    pub fn minus_minutes(&self, minutes: i64) -> Self {
        Self(self.0 - Duration::minutes(minutes))
    }

    /// A timestamp `days` before this one.
    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl TryFrom<String> for Timestamp {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_iso8601()
    }
}
