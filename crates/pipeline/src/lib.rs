//! Core orchestration domain for PRSentry.
//!
//! This crate contains every domain concept, newtype identifier, shared
//! primitive type, and cross-cutting error type used throughout the quality
//! gate. Infrastructure crates implement the traits defined here; they never
//! add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`PullRequestNumber`, `RunId`, etc.) |
//! | [`event`] | Trigger events and the trigger-set contract |
//! | [`run`] | Run lifecycle state machine and the script environment contract |
//! | [`types`] | Shared value types (`PermissionSet`, `Timestamp`) |
//! | [`errors`] | Top-level error taxonomy |
//! | [`ports`] | Traits implemented by the infrastructure layer |

pub mod errors;
pub mod event;
pub mod identifiers;
pub mod ports;
pub mod run;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::SentryError;
pub use event::{EventAction, TriggerEvent, TriggerSet};
pub use identifiers::{
    BranchName, CommitSha, LabelName, PullRequestNumber, RepositoryId, RunId, StepName,
};
pub use ports::{ChangedFile, FileStatus, HostError, PullRequestDetails, PullRequestHost};
pub use run::{
    AccessToken, RunContext, RunRequest, RunState, ENV_PR_NUMBER, ENV_REPOSITORY, ENV_TOKEN,
};
pub use types::{Access, PermissionSet, Timestamp};
