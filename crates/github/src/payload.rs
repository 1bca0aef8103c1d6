//! Wire types for the `pull_request` webhook payload.
//!
//! These structs mirror the platform's JSON shape and are converted into the
//! domain [`pipeline::TriggerEvent`] before anything else sees them. Fields
//! the gate does not use are simply not declared; unknown event actions
//! deserialise without error and are filtered out by the trigger set.

use std::path::Path;

use serde::Deserialize;

use pipeline::{
    BranchName, CommitSha, EventAction, PullRequestNumber, RepositoryId, SentryError, TriggerEvent,
};

/// Top-level `pull_request` event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEventPayload {
    /// The action this event represents.
    pub action: EventAction,

    /// The pull request number this event corresponds to.
    pub number: u64,

    /// The pull request this event corresponds to.
    pub pull_request: PullRequestPayload,

    /// The repository this event corresponds to.
    pub repository: RepositoryPayload,
}

/// The `pull_request` object within the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    /// Title at event time.
    pub title: String,

    /// Body at event time; the platform sends `null` when there is none.
    pub body: Option<String>,

    /// Head ref of the pull request branch.
    pub head: RefPayload,

    /// `"open"` or `"closed"`.
    pub state: String,
}

/// A branch reference within the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RefPayload {
    /// Branch name.
    #[serde(rename = "ref")]
    pub branch: String,

    /// Commit SHA the ref points at.
    pub sha: String,
}

/// The `repository` object within the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    /// Qualified `owner/name` identifier.
    pub full_name: String,
}

impl PullRequestEventPayload {
    /// Parses a payload from raw JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SentryError> {
        serde_json::from_slice(bytes).map_err(|e| SentryError::InvalidEvent {
            message: format!("payload is not a pull_request event: {e}"),
        })
    }

    /// Reads and parses a payload from an event file (the delivered-payload
    /// path handed to the runner, in the manner of `GITHUB_EVENT_PATH`).
    pub fn from_file(path: &Path) -> Result<Self, SentryError> {
        let bytes = std::fs::read(path).map_err(|e| SentryError::InvalidEvent {
            message: format!("cannot read event file {}: {e}", path.display()),
        })?;
        Self::from_json(&bytes)
    }

    /// Converts the wire payload into the domain event, validating the
    /// identifying fields.
    pub fn into_trigger_event(self) -> Result<TriggerEvent, SentryError> {
        let number =
            PullRequestNumber::new(self.number).ok_or_else(|| SentryError::InvalidEvent {
                message: "pull request number must be positive".to_string(),
            })?;
        let repository = RepositoryId::new(&self.repository.full_name).ok_or_else(|| {
            SentryError::InvalidEvent {
                message: format!(
                    "repository identifier '{}' is not of the form owner/name",
                    self.repository.full_name
                ),
            }
        })?;
        let head_sha =
            CommitSha::new(&self.pull_request.head.sha).ok_or_else(|| SentryError::InvalidEvent {
                message: "head commit SHA is empty".to_string(),
            })?;
        let head_branch = BranchName::new(&self.pull_request.head.branch).ok_or_else(|| {
            SentryError::InvalidEvent {
                message: "head branch name is empty".to_string(),
            }
        })?;

        Ok(TriggerEvent {
            action: self.action,
            number,
            repository,
            head_sha,
            head_branch,
            title: self.pull_request.title,
            body: self.pull_request.body.unwrap_or_default(),
        })
    }
}
