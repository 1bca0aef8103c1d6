//! Trigger events and the trigger-set contract.
//!
//! A [`TriggerEvent`] is the platform-neutral view of one delivered
//! pull-request event. The [`TriggerSet`] decides whether an event qualifies:
//! for every event whose action is in the set, exactly one run is initiated;
//! for every other event, none.

use serde::{Deserialize, Serialize};

use crate::{BranchName, CommitSha, PullRequestNumber, RepositoryId};

// ---------------------------------------------------------------------------
// Event actions
// ---------------------------------------------------------------------------

/// The action kind of a pull-request event.
///
/// Only a subset of the platform's action vocabulary is meaningful here;
/// anything else deserialises to [`EventAction::Unknown`] and never triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// A new pull request was opened.
    Opened,
    /// A previously closed pull request was reopened.
    Reopened,
    /// New commits were pushed to an existing pull request.
    Synchronize,
    /// The pull request was closed (merged or not).
    Closed,
    /// Title or body was edited.
    Edited,
    /// Any action kind this system does not model.
    #[serde(other)]
    Unknown,
}

impl EventAction {
    /// Returns the action name as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            EventAction::Opened => "opened",
            EventAction::Reopened => "reopened",
            EventAction::Synchronize => "synchronize",
            EventAction::Closed => "closed",
            EventAction::Edited => "edited",
            EventAction::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Trigger event
// ---------------------------------------------------------------------------

/// One delivered pull-request event, reduced to the fields the runner and the
/// analysis need.
///
/// Constructed by the infrastructure layer from the raw webhook payload;
/// construction guarantees the repository identifier is a well-formed
/// `owner/name` pair and the pull request number is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// What happened to the pull request.
    pub action: EventAction,

    /// The pull request the event refers to.
    pub number: PullRequestNumber,

    /// Repository the pull request belongs to.
    pub repository: RepositoryId,

    /// Commit SHA of the pull request head at event time.
    pub head_sha: CommitSha,

    /// Branch name of the pull request head at event time.
    pub head_branch: BranchName,

    /// Pull request title at event time.
    pub title: String,

    /// Pull request body at event time. Empty when the author supplied none.
    pub body: String,
}

// ---------------------------------------------------------------------------
// Trigger set
// ---------------------------------------------------------------------------

/// The set of event actions that initiate a run.
///
/// The default set is `{opened, reopened, synchronize}`: new pull request,
/// reopened pull request, or new commits pushed to an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSet(Vec<EventAction>);

impl TriggerSet {
    /// Creates a trigger set from an explicit list of actions.
    pub fn new(actions: impl Into<Vec<EventAction>>) -> Self {
        Self(actions.into())
    }

    /// Returns `true` if an event with this action initiates a run.
    pub fn admits(&self, event: &TriggerEvent) -> bool {
        self.0.contains(&event.action)
    }

    /// Returns the actions in this set.
    pub fn actions(&self) -> &[EventAction] {
        &self.0
    }
}

impl Default for TriggerSet {
    fn default() -> Self {
        Self(vec![
            EventAction::Opened,
            EventAction::Reopened,
            EventAction::Synchronize,
        ])
    }
}
