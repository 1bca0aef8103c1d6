//! PRSentry analysis engine.
//!
//! The checks the quality gate performs once it has a pull request in hand:
//!
//! - [`check`] — tutorial/placeholder detection over title and body, plus the
//!   missing-ticket check, producing structured [`check::QualityIssue`]s.
//! - [`actions`] — turning issues into a plan of side effects (label, close,
//!   report comment) and applying it through [`pipeline::PullRequestHost`].
//! - [`coverage`] — deciding whether the change ought to ship tests, and
//!   rendering the recommendation comment when it should.
//!
//! ## Architectural Layer
//!
//! **Business logic.** Everything here is pure computation over fetched pull
//! request data; the only I/O is the host port handed to
//! [`actions::apply_actions`].

pub mod actions;
pub mod check;
pub mod coverage;

pub use actions::{apply_actions, plan_actions, Action, ActionOptions, DEFAULT_FLAG_LABEL};
pub use check::{
    check_pull_request, Confidence, IssueKind, MatchLocation, PatternMatch, QualityIssue, Severity,
};
pub use coverage::{
    CoverageAnalyzer, CoverageConfig, CoverageDetails, CoverageInput, CoverageReport,
    ModuleMapEntry,
};
