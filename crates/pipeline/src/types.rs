//! Shared value types for the PRSentry domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants and participate in domain decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Permission grants
// ---------------------------------------------------------------------------

/// Access level granted on one resource class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// No access granted.
    None,
    /// Read-only access.
    Read,
    /// Read and write access.
    Write,
}

impl Access {
    /// Returns `true` if this grant is at least `required`.
    pub fn allows(self, required: Access) -> bool {
        self >= required
    }
}

/// The capability grant attached to a run's access token.
///
/// The default grant mirrors what the analysis needs: write on pull requests
/// (close, request changes), write on issues (comments, labels — pull request
/// comments travel over the issues surface), read on repository contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Grant on the pull-requests surface.
    pub pull_requests: Access,
    /// Grant on repository contents.
    pub contents: Access,
    /// Grant on the issues surface.
    pub issues: Access,
}

impl Default for PermissionSet {
    fn default() -> Self {
        Self {
            pull_requests: Access::Write,
            contents: Access::Read,
            issues: Access::Write,
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
