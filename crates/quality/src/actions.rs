//! Action planning and application.
//!
//! Quality issues are turned into a plan of side effects — label, auto-close,
//! report comment — which is then applied against a [`PullRequestHost`].
//! Planning is pure and fully testable; application is where the granted
//! write permissions are actually exercised.

use tracing::{info, warn};

use pipeline::{LabelName, PullRequestHost, PullRequestNumber};

use crate::check::QualityIssue;

/// Label applied to flagged pull requests unless overridden.
pub const DEFAULT_FLAG_LABEL: &str = "possibly-tutorial-pr";

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One side effect to perform on the pull request.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Nothing to do; the pull request passed every check.
    AllClear,
    /// Apply a label.
    Label(LabelName),
    /// Close the pull request without merging.
    Close,
    /// Post the quality report as a comment.
    Comment(String),
}

/// Toggles controlling which side effects the plan may include.
#[derive(Debug, Clone)]
pub struct ActionOptions {
    /// Label applied to flagged pull requests; `None` disables labelling.
    pub flag_label: Option<LabelName>,

    /// Whether auto-close is permitted at all.
    pub allow_close: bool,
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self {
            flag_label: LabelName::new(DEFAULT_FLAG_LABEL),
            allow_close: true,
        }
    }
}

/// Builds the action plan for a set of quality issues.
///
/// No issues yields a single [`Action::AllClear`]. Otherwise the plan is
/// label (if enabled), close (if any issue warrants it and closing is
/// permitted), then the report comment — always last, so the comment can
/// mention the close.
pub fn plan_actions(issues: &[QualityIssue], options: &ActionOptions) -> Vec<Action> {
    if issues.is_empty() {
        return vec![Action::AllClear];
    }

    let mut actions = Vec::new();
    if let Some(label) = &options.flag_label {
        actions.push(Action::Label(label.clone()));
    }

    let should_close = options.allow_close && issues.iter().any(QualityIssue::should_auto_close);

    let mut comment = String::from("## PR Quality Check ⚠️\n\nThis PR may need attention:\n");
    for issue in issues {
        comment.push_str(&format!(
            "\n### {} (Severity: {})\n",
            issue.message,
            issue.severity.as_str()
        ));
        if !issue.matches.is_empty() {
            comment.push_str("Matches found:\n");
            for m in &issue.matches {
                comment.push_str(&format!("- In {}: `{}`\n", m.location.as_str(), m.context));
            }
        }
    }

    if should_close {
        comment.push_str(
            "\n⚠️ This PR will be automatically closed based on the detected patterns.",
        );
        actions.push(Action::Close);
    }

    actions.push(Action::Comment(comment));
    actions
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Applies a plan against the hosting platform.
///
/// A failed action is logged and the remaining actions still run; one flaky
/// API call should not swallow the report comment. Returns the number of
/// actions that failed.
pub async fn apply_actions(
    host: &dyn PullRequestHost,
    number: PullRequestNumber,
    actions: &[Action],
) -> usize {
    let mut failures = 0;
    for action in actions {
        let outcome = match action {
            Action::AllClear => {
                info!(pr = %number, "no quality issues detected");
                Ok(())
            }
            Action::Label(label) => host.add_label(number, label).await,
            Action::Close => host.close_pull_request(number).await,
            Action::Comment(body) => {
                info!(pr = %number, "quality issues detected, posting report");
                host.create_comment(number, body).await
            }
        };
        if let Err(e) = outcome {
            warn!(pr = %number, error = %e, ?action, "action failed");
            failures += 1;
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{Confidence, IssueKind, MatchLocation, PatternMatch, QualityIssue, Severity};
    use async_trait::async_trait;
    use pipeline::{ChangedFile, HostError, PullRequestDetails};
    use std::sync::Mutex;

    fn pattern_match(
        pattern: &str,
        location: MatchLocation,
        confidence: Confidence,
        context: &str,
    ) -> PatternMatch {
        PatternMatch {
            pattern: pattern.to_string(),
            matched_text: pattern.to_string(),
            location,
            confidence,
            context: context.to_string(),
        }
    }

    fn tutorial_issue(matches: Vec<PatternMatch>) -> QualityIssue {
        QualityIssue {
            kind: IssueKind::Tutorial,
            severity: Severity::Medium,
            message: "Tutorial PR".to_string(),
            matches,
        }
    }

    // -- planning -----------------------------------------------------------

    #[test]
    fn no_issues_plans_all_clear() {
        let actions = plan_actions(&[], &ActionOptions::default());
        assert_eq!(actions, vec![Action::AllClear]);
    }

    #[test]
    fn auto_close_plans_label_close_comment() {
        let issues = vec![tutorial_issue(vec![pattern_match(
            "99999",
            MatchLocation::Title,
            Confidence::High,
            "test PR #99999",
        )])];
        let actions = plan_actions(&issues, &ActionOptions::default());

        assert_eq!(actions.len(), 3);
        assert_eq!(
            actions[0],
            Action::Label(LabelName::new(DEFAULT_FLAG_LABEL).unwrap())
        );
        assert_eq!(actions[1], Action::Close);
        let Action::Comment(comment) = &actions[2] else {
            panic!("expected a comment");
        };
        assert!(comment.contains("automatically closed"));
    }

    #[test]
    fn low_confidence_single_match_does_not_plan_close() {
        let issues = vec![tutorial_issue(vec![pattern_match(
            r"\btest\b",
            MatchLocation::Title,
            Confidence::Low,
            "test context",
        )])];
        let actions = plan_actions(&issues, &ActionOptions::default());

        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], Action::Label(_)));
        let Action::Comment(comment) = &actions[1] else {
            panic!("expected a comment");
        };
        assert!(!comment.contains("automatically closed"));
    }

    #[test]
    fn close_toggle_suppresses_close() {
        let issues = vec![tutorial_issue(vec![
            pattern_match("tutorial", MatchLocation::Title, Confidence::Medium, "my tutorial"),
            pattern_match("learning", MatchLocation::Body, Confidence::Medium, "I am learning"),
        ])];
        let options = ActionOptions {
            allow_close: false,
            ..ActionOptions::default()
        };
        let actions = plan_actions(&issues, &options);
        assert!(!actions.contains(&Action::Close));
    }

    #[test]
    fn label_toggle_suppresses_label() {
        let issues = vec![tutorial_issue(vec![pattern_match(
            r"\btest\b",
            MatchLocation::Title,
            Confidence::Low,
            "test context",
        )])];
        let options = ActionOptions {
            flag_label: None,
            ..ActionOptions::default()
        };
        let actions = plan_actions(&issues, &options);
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], Action::Comment(_)));
    }

    #[test]
    fn comment_includes_match_transparency() {
        let issues = vec![tutorial_issue(vec![
            pattern_match("tutorial", MatchLocation::Title, Confidence::Medium, "my tutorial"),
            pattern_match(
                "learning",
                MatchLocation::Body,
                Confidence::Medium,
                "I am learning the framework",
            ),
        ])];
        let actions = plan_actions(&issues, &ActionOptions::default());
        let Action::Comment(comment) = actions.last().unwrap() else {
            panic!("expected a comment");
        };

        assert!(comment.contains("## PR Quality Check ⚠️"));
        assert!(comment.contains("### Tutorial PR (Severity: medium)"));
        assert!(comment.contains("Matches found:"));
        assert!(comment.contains("- In title: `my tutorial`"));
        assert!(comment.contains("- In body: `I am learning the framework`"));
    }

    // -- application --------------------------------------------------------

    #[derive(Default)]
    struct RecordingHost {
        calls: Mutex<Vec<String>>,
        fail_labels: bool,
    }

    #[async_trait]
    impl PullRequestHost for RecordingHost {
        async fn pull_request(
            &self,
            _number: PullRequestNumber,
        ) -> Result<PullRequestDetails, HostError> {
            unimplemented!("not exercised by action application")
        }

        async fn changed_files(
            &self,
            _number: PullRequestNumber,
        ) -> Result<Vec<ChangedFile>, HostError> {
            unimplemented!("not exercised by action application")
        }

        async fn create_comment(
            &self,
            _number: PullRequestNumber,
            body: &str,
        ) -> Result<(), HostError> {
            self.calls.lock().unwrap().push(format!("comment:{body}"));
            Ok(())
        }

        async fn add_label(
            &self,
            _number: PullRequestNumber,
            label: &LabelName,
        ) -> Result<(), HostError> {
            if self.fail_labels {
                return Err(HostError::Api {
                    status: 403,
                    message: "forbidden".to_string(),
                });
            }
            self.calls.lock().unwrap().push(format!("label:{label}"));
            Ok(())
        }

        async fn close_pull_request(&self, _number: PullRequestNumber) -> Result<(), HostError> {
            self.calls.lock().unwrap().push("close".to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn applies_actions_in_plan_order() {
        let host = RecordingHost::default();
        let number = PullRequestNumber::new(42).unwrap();
        let actions = vec![
            Action::Label(LabelName::new(DEFAULT_FLAG_LABEL).unwrap()),
            Action::Close,
            Action::Comment("report".to_string()),
        ];

        let failures = apply_actions(&host, number, &actions).await;
        assert_eq!(failures, 0);

        let calls = host.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            [
                "label:possibly-tutorial-pr",
                "close",
                "comment:report",
            ]
        );
    }

    #[tokio::test]
    async fn failed_action_does_not_abort_the_rest() {
        let host = RecordingHost {
            fail_labels: true,
            ..RecordingHost::default()
        };
        let number = PullRequestNumber::new(42).unwrap();
        let actions = vec![
            Action::Label(LabelName::new(DEFAULT_FLAG_LABEL).unwrap()),
            Action::Comment("report".to_string()),
        ];

        let failures = apply_actions(&host, number, &actions).await;
        assert_eq!(failures, 1);

        let calls = host.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), ["comment:report"]);
    }

    #[tokio::test]
    async fn all_clear_touches_nothing() {
        let host = RecordingHost::default();
        let number = PullRequestNumber::new(42).unwrap();

        let failures = apply_actions(&host, number, &[Action::AllClear]).await;
        assert_eq!(failures, 0);
        assert!(host.calls.lock().unwrap().is_empty());
    }
}
