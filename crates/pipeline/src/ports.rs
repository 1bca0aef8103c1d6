//! Port trait definitions implemented by infrastructure crates.
//!
//! The domain sees only these traits; transport details (REST endpoints,
//! authentication, pagination) live in the adapter crates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CommitSha, LabelName, PullRequestNumber};

// ---------------------------------------------------------------------------
// Host-side data
// ---------------------------------------------------------------------------

/// Pull request metadata as fetched from the hosting platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestDetails {
    /// The pull request number.
    pub number: PullRequestNumber,

    /// Title at fetch time.
    pub title: String,

    /// Body at fetch time; empty when the author supplied none.
    pub body: String,

    /// Labels currently applied.
    pub labels: Vec<String>,

    /// Head commit of the pull request branch.
    pub head_sha: CommitSha,

    /// `true` while the pull request is open.
    pub open: bool,
}

/// Status of one file within a pull request diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// File added by the pull request.
    Added,
    /// File modified by the pull request.
    Modified,
    /// File removed by the pull request.
    Removed,
    /// File renamed by the pull request.
    Renamed,
    /// Any status this system does not model.
    #[serde(other)]
    Other,
}

/// One changed file within a pull request diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file relative to the repository root.
    pub filename: String,

    /// How the pull request touched the file.
    pub status: FileStatus,

    /// Unified-diff patch hunk, when the platform supplies one (omitted for
    /// binary files and very large diffs).
    pub patch: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a host operation, as surfaced to the domain.
#[derive(Debug, Error)]
pub enum HostError {
    /// The platform answered with a non-success status.
    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status code returned.
        status: u16,
        /// Message body or reason phrase.
        message: String,
    },

    /// The request never produced a response (connection, TLS, timeout).
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The response body could not be decoded into the expected shape.
    #[error("Response decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Port trait
// ---------------------------------------------------------------------------

/// Operations the quality gate performs against the hosting platform.
///
/// The trait is the boundary between analysis logic and the platform API; it
/// maps one-to-one onto the capabilities of the run's permission grant
/// (pull-requests write, issues write, contents read).
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Fetches metadata for one pull request.
    async fn pull_request(
        &self,
        number: PullRequestNumber,
    ) -> Result<PullRequestDetails, HostError>;

    /// Lists the files changed by one pull request.
    async fn changed_files(
        &self,
        number: PullRequestNumber,
    ) -> Result<Vec<ChangedFile>, HostError>;

    /// Posts a comment on the pull request's discussion thread.
    async fn create_comment(
        &self,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<(), HostError>;

    /// Applies a label to the pull request.
    async fn add_label(
        &self,
        number: PullRequestNumber,
        label: &LabelName,
    ) -> Result<(), HostError>;

    /// Closes the pull request without merging.
    async fn close_pull_request(&self, number: PullRequestNumber) -> Result<(), HostError>;
}
