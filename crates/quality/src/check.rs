//! Pull-request quality checks.
//!
//! Scans a pull request's title and body for signs that it is a tutorial
//! artefact rather than a real contribution (a practice run against a public
//! repository, a placeholder ticket number, a "my first PR" exercise), and
//! for a missing ticket reference in the title.
//!
//! Each tell is a pattern with a confidence tier. The title is scanned for
//! every pattern; the body only for high-confidence ones, since low-tier
//! words like "test" are common in legitimate descriptions.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Characters of surrounding text captured on either side of a body match.
const CONTEXT_CHARS: usize = 40;

// ---------------------------------------------------------------------------
// Finding model
// ---------------------------------------------------------------------------

/// Confidence tier of a tutorial pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Common word; meaningful only in aggregate.
    Low,
    /// Suggestive on its own.
    Medium,
    /// Near-certain tutorial tell.
    High,
}

/// Where within the pull request a pattern matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLocation {
    /// The pull request title.
    Title,
    /// The pull request body.
    Body,
}

impl MatchLocation {
    /// Lower-case name used in rendered reports.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchLocation::Title => "title",
            MatchLocation::Body => "body",
        }
    }
}

/// One matched pattern, with enough context to explain the finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// Source text of the pattern that matched.
    pub pattern: String,

    /// The exact text that matched.
    pub matched_text: String,

    /// Where the match was found.
    pub location: MatchLocation,

    /// Confidence tier of the matched pattern.
    pub confidence: Confidence,

    /// Surrounding text, for transparency in the posted report.
    pub context: String,
}

/// Severity of a quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Warrants maintainer attention promptly.
    High,
    /// Worth flagging.
    Medium,
    /// Informational.
    Low,
}

impl Severity {
    /// Lower-case name used in rendered reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// Kind of quality issue detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The pull request looks like a tutorial or learning exercise.
    Tutorial,
    /// The title carries no ticket reference.
    MissingTicket,
}

/// A quality issue found in a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    /// What kind of issue this is.
    pub kind: IssueKind,

    /// How severe the issue is.
    pub severity: Severity,

    /// Human-readable summary included in the report.
    pub message: String,

    /// Pattern matches backing the finding; empty for issues that are the
    /// absence of something (e.g. a missing ticket reference).
    pub matches: Vec<PatternMatch>,
}

impl QualityIssue {
    /// Whether this issue alone warrants auto-closing the pull request.
    ///
    /// Only tutorial findings close: either more than one pattern matched, or
    /// a single match came from a high-confidence pattern. A missing ticket
    /// reference never closes on its own.
    pub fn should_auto_close(&self) -> bool {
        if self.kind != IssueKind::Tutorial {
            return false;
        }
        match self.matches.as_slice() {
            [] => false,
            [only] => only.confidence == Confidence::High,
            _ => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern table
// ---------------------------------------------------------------------------

struct TutorialPattern {
    source: &'static str,
    confidence: Confidence,
    regex: Regex,
}

static TUTORIAL_PATTERNS: LazyLock<Vec<TutorialPattern>> = LazyLock::new(|| {
    // `99999` is the placeholder ticket number used throughout contribution
    // tutorials; its presence in a real PR is a reliable tell.
    let table: &[(&str, Confidence)] = &[
        (r"\btest\b", Confidence::Low),
        ("learning", Confidence::Medium),
        ("first contribution", Confidence::High),
        ("first pr", Confidence::High),
        ("tutorial", Confidence::Medium),
        ("toast", Confidence::High),
        ("first patch", Confidence::High),
        ("getting started", Confidence::Medium),
        ("99999", Confidence::High),
    ];
    table
        .iter()
        .map(|&(source, confidence)| TutorialPattern {
            source,
            confidence,
            regex: RegexBuilder::new(source)
                .case_insensitive(true)
                .build()
                .expect("tutorial pattern must compile"),
        })
        .collect()
});

static TICKET_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[0-9]+").expect("ticket pattern must compile"));

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Extracts the text surrounding a match, clamped to the string and trimmed.
///
/// `start` and `end` are byte offsets as reported by the regex engine; the
/// window edges are snapped back to character boundaries.
pub fn surrounding_context(text: &str, start: usize, end: usize, context_chars: usize) -> String {
    let mut lo = start.saturating_sub(context_chars);
    let mut hi = std::cmp::min(text.len(), end + context_chars);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    while !text.is_char_boundary(hi) {
        hi += 1;
    }
    text[lo..hi].trim().to_string()
}

/// Runs all quality checks over a pull request's title and body.
///
/// Returns the issues found, in a stable order: missing ticket reference
/// first (when applicable), then the tutorial finding aggregating every
/// pattern match.
pub fn check_pull_request(title: &str, body: &str) -> Vec<QualityIssue> {
    let mut issues = Vec::new();

    if !TICKET_REFERENCE.is_match(title) {
        issues.push(QualityIssue {
            kind: IssueKind::MissingTicket,
            severity: Severity::High,
            message: "Missing ticket reference in PR title".to_string(),
            matches: Vec::new(),
        });
    }

    let mut matches = Vec::new();
    for pattern in TUTORIAL_PATTERNS.iter() {
        // Title: one match per pattern is enough; the full title is the context.
        if let Some(m) = pattern.regex.find(title) {
            matches.push(PatternMatch {
                pattern: pattern.source.to_string(),
                matched_text: m.as_str().to_string(),
                location: MatchLocation::Title,
                confidence: pattern.confidence,
                context: title.trim().to_string(),
            });
        }

        // Body: only high-confidence patterns, every occurrence.
        if pattern.confidence == Confidence::High && !body.is_empty() {
            for m in pattern.regex.find_iter(body) {
                matches.push(PatternMatch {
                    pattern: pattern.source.to_string(),
                    matched_text: m.as_str().to_string(),
                    location: MatchLocation::Body,
                    confidence: pattern.confidence,
                    context: surrounding_context(body, m.start(), m.end(), CONTEXT_CHARS),
                });
            }
        }
    }

    if !matches.is_empty() {
        issues.push(QualityIssue {
            kind: IssueKind::Tutorial,
            severity: Severity::Medium,
            message: "PR appears to be a test or learning exercise".to_string(),
            matches,
        });
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tutorial_issue(issues: &[QualityIssue]) -> &QualityIssue {
        issues
            .iter()
            .find(|i| i.kind == IssueKind::Tutorial)
            .expect("expected a tutorial issue")
    }

    // -- surrounding_context ------------------------------------------------

    #[test]
    fn context_normal_case() {
        let text = "This is a test string for context extraction";
        assert_eq!(surrounding_context(text, 10, 14, 5), "is a test stri");
    }

    #[test]
    fn context_at_start() {
        assert_eq!(surrounding_context("test string", 0, 4, 5), "test stri");
    }

    #[test]
    fn context_at_end() {
        assert_eq!(surrounding_context("string test", 7, 11, 5), "ring test");
    }

    #[test]
    fn context_short_text() {
        assert_eq!(surrounding_context("test", 0, 4, 10), "test");
    }

    #[test]
    fn context_strips_whitespace() {
        assert_eq!(surrounding_context("  test string  ", 2, 6, 2), "test s");
    }

    #[test]
    fn context_zero_window() {
        assert_eq!(surrounding_context("hello world", 6, 11, 0), "world");
    }

    #[test]
    fn context_respects_char_boundaries() {
        // "é" is two bytes; a window edge landing inside it must not panic.
        let text = "héllo toast héllo";
        let m = Regex::new("toast").unwrap().find(text).unwrap();
        let ctx = surrounding_context(text, m.start(), m.end(), 3);
        assert!(ctx.contains("toast"));
    }

    // -- auto-close rule ----------------------------------------------------

    fn title_match(pattern: &str, confidence: Confidence) -> PatternMatch {
        PatternMatch {
            pattern: pattern.to_string(),
            matched_text: pattern.to_string(),
            location: MatchLocation::Title,
            confidence,
            context: format!("{pattern} context"),
        }
    }

    #[test]
    fn missing_ticket_never_auto_closes() {
        let issue = QualityIssue {
            kind: IssueKind::MissingTicket,
            severity: Severity::High,
            message: "Missing ticket reference in PR title".to_string(),
            matches: Vec::new(),
        };
        assert!(!issue.should_auto_close());
    }

    #[test]
    fn tutorial_without_matches_does_not_auto_close() {
        let issue = QualityIssue {
            kind: IssueKind::Tutorial,
            severity: Severity::Medium,
            message: "Tutorial PR".to_string(),
            matches: Vec::new(),
        };
        assert!(!issue.should_auto_close());
    }

    #[test]
    fn multiple_matches_auto_close() {
        let issue = QualityIssue {
            kind: IssueKind::Tutorial,
            severity: Severity::Medium,
            message: "Tutorial PR".to_string(),
            matches: vec![
                title_match(r"\btest\b", Confidence::Low),
                title_match("learning", Confidence::Medium),
            ],
        };
        assert!(issue.should_auto_close());
    }

    #[test]
    fn single_high_confidence_match_auto_closes() {
        let issue = QualityIssue {
            kind: IssueKind::Tutorial,
            severity: Severity::Medium,
            message: "Tutorial PR".to_string(),
            matches: vec![title_match("99999", Confidence::High)],
        };
        assert!(issue.should_auto_close());
    }

    #[test]
    fn single_low_confidence_match_does_not_auto_close() {
        let issue = QualityIssue {
            kind: IssueKind::Tutorial,
            severity: Severity::Medium,
            message: "Tutorial PR".to_string(),
            matches: vec![title_match(r"\btest\b", Confidence::Low)],
        };
        assert!(!issue.should_auto_close());
    }

    // -- check_pull_request -------------------------------------------------

    #[test]
    fn clean_pr_with_ticket_raises_nothing() {
        let issues = check_pull_request(
            "Fixed bug in authentication #12345",
            "This PR fixes the authentication issue described in ticket #12345",
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn missing_ticket_reference_is_flagged() {
        let issues = check_pull_request(
            "Fixed bug in authentication",
            "This PR fixes the authentication issue",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingTicket);
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[test]
    fn tutorial_pattern_in_title() {
        let issues = check_pull_request(
            "My learning experience with the framework #12345",
            "This is a real fix",
        );
        let issue = tutorial_issue(&issues);
        assert_eq!(issue.matches.len(), 1);
        assert_eq!(issue.matches[0].pattern, "learning");
        assert_eq!(issue.matches[0].location, MatchLocation::Title);
    }

    #[test]
    fn high_confidence_pattern_found_in_body() {
        let issues = check_pull_request(
            "Fix authentication bug #12345",
            "This is a toast notification. I followed some guide.",
        );
        let issue = tutorial_issue(&issues);
        assert_eq!(issue.matches.len(), 1);
        assert_eq!(issue.matches[0].pattern, "toast");
        assert_eq!(issue.matches[0].location, MatchLocation::Body);
    }

    #[test]
    fn low_confidence_pattern_ignored_in_body() {
        let issues = check_pull_request(
            "Add test for authentication #12345",
            "This adds a comprehensive test suite for the authentication module",
        );
        let issue = tutorial_issue(&issues);
        // "test" matches in the title only; the body occurrence is below the
        // confidence bar for body scanning.
        assert_eq!(issue.matches.len(), 1);
        assert_eq!(issue.matches[0].location, MatchLocation::Title);
        assert_eq!(issue.matches[0].pattern, r"\btest\b");
    }

    #[test]
    fn multiple_patterns_in_title_all_reported() {
        let issues =
            check_pull_request("My tutorial about learning the test runner #1", "Real change");
        let issue = tutorial_issue(&issues);
        assert_eq!(issue.matches.len(), 3);

        let patterns: Vec<&str> = issue.matches.iter().map(|m| m.pattern.as_str()).collect();
        assert!(patterns.contains(&"tutorial"));
        assert!(patterns.contains(&"learning"));
        assert!(patterns.contains(&r"\btest\b"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let issues = check_pull_request("My LEARNING experience #1", "");
        let issue = tutorial_issue(&issues);
        assert_eq!(issue.matches.len(), 1);
        assert_eq!(issue.matches[0].matched_text, "LEARNING");
    }

    #[test]
    fn placeholder_ticket_number_is_high_confidence() {
        let issues = check_pull_request("Test PR #99999", "This is just a test");
        let issue = tutorial_issue(&issues);
        assert_eq!(issue.matches.len(), 2);

        let patterns: Vec<&str> = issue.matches.iter().map(|m| m.pattern.as_str()).collect();
        assert!(patterns.contains(&"99999"));
        assert!(patterns.contains(&r"\btest\b"));
        assert!(issue.should_auto_close());
    }

    #[test]
    fn getting_started_pattern_in_title() {
        let issues = check_pull_request(
            "Getting started with contributing #12345",
            "This is my first attempt",
        );
        let issue = tutorial_issue(&issues);
        assert_eq!(issue.matches.len(), 1);
        assert_eq!(issue.matches[0].pattern, "getting started");
        assert_eq!(issue.matches[0].location, MatchLocation::Title);
    }

    #[test]
    fn empty_body_is_not_scanned() {
        let issues = check_pull_request("Fix widget #123", "");
        assert!(issues.is_empty());
    }

    #[test]
    fn body_context_is_windowed() {
        let long_tail = "x".repeat(200);
        let body = format!("prefix toast {long_tail}");
        let issues = check_pull_request("Fix widget #123", &body);
        let issue = tutorial_issue(&issues);
        assert!(issue.matches[0].context.len() < body.len());
        assert!(issue.matches[0].context.contains("toast"));
    }
}
