//! Top-level error types for the PRSentry domain.
//!
//! [`SentryError`] covers the two failure classes of a run — environment
//! provisioning and script execution — plus the conditions that stop a run
//! from starting at all. Both run-time classes propagate identically: the run
//! halts immediately, no compensating action is taken, and the failure
//! surfaces as a failed status. There is no retry channel at this layer.
//!
//! Component-level errors (GitHub API failures, subprocess spawn errors) are
//! defined in their respective crates and wrapped into these variants at the
//! orchestration boundary.

use thiserror::Error;

use crate::{RunState, StepName};

/// Errors that fail a run or prevent one from starting.
#[derive(Debug, Error)]
pub enum SentryError {
    /// An environment-provisioning step failed before the script was reached
    /// (source checkout, runtime setup, dependency install).
    #[error("Provisioning step '{step}' failed: {message}")]
    Provisioning {
        /// The step that failed.
        step: StepName,
        /// Description of the underlying failure.
        message: String,
    },

    /// The analysis script itself exited non-zero or could not be started.
    #[error("Analysis script failed with exit code {exit_code}")]
    ScriptFailure {
        /// Exit code of the script process; `-1` when the process was killed
        /// or never produced one.
        exit_code: i32,
    },

    /// The delivered payload could not be interpreted as a pull-request event.
    #[error("Invalid event payload: {message}")]
    InvalidEvent {
        /// Description of what was malformed.
        message: String,
    },

    /// The workflow configuration is invalid.
    ///
    /// Produced at load time; a run never starts with an invalid config.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// A lifecycle transition the state machine does not permit.
    #[error("Invalid run state transition: {from} -> {to}")]
    InvalidTransition {
        /// State the run was in.
        from: RunState,
        /// State the caller attempted to move to.
        to: RunState,
    },
}

impl SentryError {
    /// Returns `true` for the provisioning failure class, `false` for
    /// script-execution failures and pre-run errors.
    pub fn is_provisioning(&self) -> bool {
        matches!(self, SentryError::Provisioning { .. })
    }
}
