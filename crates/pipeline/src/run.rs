//! Run lifecycle and the environment contract handed to the analysis script.
//!
//! Each qualifying event produces one independent run. A run moves
//! `Triggered → Running → {Succeeded, Failed}` and never leaves a terminal
//! state; there is no transition back to `Running` and no retry.

use serde::{Deserialize, Serialize};

use crate::{PullRequestNumber, RepositoryId, RunId, SentryError};

/// Environment variable carrying the platform-issued access token.
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
/// Environment variable carrying the pull request number.
pub const ENV_PR_NUMBER: &str = "PR_NUMBER";
/// Environment variable carrying the `owner/name` repository identifier.
pub const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";

// ---------------------------------------------------------------------------
// Access token
// ---------------------------------------------------------------------------

/// A short-lived, permission-scoped access credential granted per run.
///
/// The token value is deliberately excluded from `Debug` output so it cannot
/// leak through spans or error messages.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates an access token, returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Exposes the secret value. Callers must only pass it to the process
    /// environment or an `Authorization` header, never to logs.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(****)")
    }
}

// ---------------------------------------------------------------------------
// Run context
// ---------------------------------------------------------------------------

/// The identifying context one run passes through to the invoked script.
///
/// All three values must be present and valid for the script to function;
/// construction of the individual fields enforces that.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Access credential scoped to the run's permission grant.
    pub token: AccessToken,

    /// The pull request the run was triggered for.
    pub pr_number: PullRequestNumber,

    /// The repository the pull request belongs to.
    pub repository: RepositoryId,
}

impl RunContext {
    /// Returns the exact environment exposed to the analysis script:
    /// `GITHUB_TOKEN`, `PR_NUMBER`, and `GITHUB_REPOSITORY`.
    pub fn env(&self) -> Vec<(String, String)> {
        vec![
            (ENV_TOKEN.to_string(), self.token.expose().to_string()),
            (ENV_PR_NUMBER.to_string(), self.pr_number.to_string()),
            (ENV_REPOSITORY.to_string(), self.repository.to_string()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Run state machine
// ---------------------------------------------------------------------------

/// Lifecycle state of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// A qualifying event arrived; the step sequence has not started.
    Triggered,
    /// Steps are executing.
    Running,
    /// Every step, including the script invocation, completed successfully.
    Succeeded,
    /// A step failed; no further steps were executed.
    Failed,
}

impl RunState {
    /// Returns `true` for the two terminal states.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }

    /// Attempts the transition to `next`, rejecting anything the lifecycle
    /// does not permit (in particular, leaving a terminal state).
    pub fn advance(self, next: RunState) -> Result<RunState, SentryError> {
        let permitted = matches!(
            (self, next),
            (RunState::Triggered, RunState::Running)
                | (RunState::Running, RunState::Succeeded)
                | (RunState::Running, RunState::Failed)
        );
        if permitted {
            Ok(next)
        } else {
            Err(SentryError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunState::Triggered => "triggered",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A freshly triggered run: its identifier plus the context it will carry.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Identifier correlating all activity of this run.
    pub run_id: RunId,

    /// Context handed to the script step.
    pub context: RunContext,
}

impl RunRequest {
    /// Creates a run request with a fresh random [`RunId`].
    pub fn new(context: RunContext) -> Self {
        Self {
            run_id: RunId::new_random(),
            context,
        }
    }
}
