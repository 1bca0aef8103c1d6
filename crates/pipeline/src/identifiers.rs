//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging — for example —
//! a [`PullRequestNumber`] with a plain count even though both are `u64` under
//! the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — GitHub-integer-backed
// ---------------------------------------------------------------------------

/// Identifies a pull request within a repository.
///
/// Wraps the pull request number assigned by the hosting platform (positive
/// integer). This is the value exposed to the analysis script as `PR_NUMBER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Creates a pull request number, returning `None` for zero (the platform
    /// never assigns it).
    pub fn new(value: u64) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PullRequestNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single triggered run (one execution of the step sequence).
///
/// Generated fresh for every qualifying event; propagated through spans so all
/// activity from a single run can be correlated. Runs are independent — a new
/// event always produces a new [`RunId`], never a reused one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`RunId`] from an existing UUID (e.g. deserialised from a report).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed
// ---------------------------------------------------------------------------

/// Identifies a repository in `"owner/name"` format.
///
/// The qualified name is validated on construction: exactly one `/`, with a
/// non-empty owner and name on either side. This is the value exposed to the
/// analysis script as `GITHUB_REPOSITORY`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId(String);

impl RepositoryId {
    /// Creates a repository identifier, returning `None` unless the value is a
    /// well-formed `owner/name` pair.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        match v.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Some(Self(v))
            }
            _ => None,
        }
    }

    /// Returns the qualified name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the owner half of the qualified name.
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map(|(o, _)| o).unwrap_or(&self.0)
    }

    /// Returns the repository-name half of the qualified name.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(_, n)| n).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

string_id! {
    /// A Git commit SHA identifying the event's head revision.
    CommitSha
}

string_id! {
    /// A Git branch name (e.g. `"main"`, `"fix/ticket-35108"`).
    BranchName
}

string_id! {
    /// Identifies one step of the triggered run by its configured name.
    ///
    /// Step names are unique within a run plan (e.g. `"checkout"`,
    /// `"install_dependencies"`, `"run_script"`).
    StepName
}

string_id! {
    /// A label name applied to a pull request (e.g. `"possibly-tutorial-pr"`).
    LabelName
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_request_number_rejects_zero() {
        assert!(PullRequestNumber::new(0).is_none());
        assert_eq!(PullRequestNumber::new(42).unwrap().as_u64(), 42);
    }

    #[test]
    fn repository_id_requires_owner_and_name() {
        assert!(RepositoryId::new("org/proj").is_some());
        assert!(RepositoryId::new("org").is_none());
        assert!(RepositoryId::new("/proj").is_none());
        assert!(RepositoryId::new("org/").is_none());
        assert!(RepositoryId::new("org/proj/extra").is_none());
        assert!(RepositoryId::new("").is_none());
    }

    #[test]
    fn repository_id_exposes_halves() {
        let id = RepositoryId::new("org/proj").unwrap();
        assert_eq!(id.owner(), "org");
        assert_eq!(id.name(), "proj");
        assert_eq!(id.to_string(), "org/proj");
    }

    #[test]
    fn string_ids_reject_empty() {
        assert!(CommitSha::new("").is_none());
        assert!(StepName::new("checkout").is_some());
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new_random(), RunId::new_random());
    }
}
