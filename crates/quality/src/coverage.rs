//! Test-coverage recommendations.
//!
//! Looks at what a pull request changes and decides whether it ought to ship
//! tests: trivial changes (docs, generated files, whitespace-only hunks) are
//! excused, while bug fixes, new features, new public definitions, and edits
//! to existing logic each argue for coverage. When tests are wanted, the
//! analyzer renders a recommendation comment with suggested test locations
//! taken from a configurable module map.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use pipeline::{ChangedFile, FileStatus, SentryError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One entry mapping a source-module prefix to its test directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMapEntry {
    /// Source path prefix (e.g. `"django/utils/"`, `"crates/pipeline/"`).
    pub module: String,

    /// Test directories where coverage for this module conventionally lives.
    pub test_dirs: Vec<String>,
}

/// Coverage-analysis configuration.
///
/// Defaults cover a generic Python or Rust repository; real deployments set
/// the prefixes and module map to match their tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Path prefixes considered project source.
    pub source_prefixes: Vec<String>,

    /// File suffixes considered code (anything else is ignored).
    pub source_suffixes: Vec<String>,

    /// Path prefixes considered test code.
    pub test_prefixes: Vec<String>,

    /// File extensions that mark a change as documentation.
    pub doc_extensions: Vec<String>,

    /// Path fragments that mark a file as generated (never needs tests).
    pub generated_markers: Vec<String>,

    /// Regex matching a new definition on an added line; capture group 1 is
    /// the definition name. Names starting with `_` are treated as private.
    pub definition_pattern: String,

    /// Label that dismisses the coverage check entirely.
    pub dismiss_label: String,

    /// Module-to-test-directory suggestions.
    pub module_map: Vec<ModuleMapEntry>,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            source_prefixes: vec!["src/".to_string()],
            source_suffixes: vec![".rs".to_string(), ".py".to_string()],
            test_prefixes: vec!["tests/".to_string()],
            doc_extensions: vec![".txt".to_string(), ".rst".to_string(), ".md".to_string()],
            generated_markers: vec!["/migrations/".to_string(), "/generated/".to_string()],
            definition_pattern: r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:def|class|fn|struct|enum|trait)\s+(\w+)".to_string(),
            dismiss_label: "no-tests-needed".to_string(),
            module_map: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Counters backing a coverage verdict, kept for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDetails {
    /// Source files touched by the pull request.
    pub source_files: usize,
    /// Test files touched by the pull request.
    pub test_files: usize,
    /// Source changes judged significant.
    pub significant_changes: usize,
    /// Source changes judged trivial.
    pub trivial_changes: usize,
    /// Whether the title/body reads as a bug fix.
    pub is_bug_fix: bool,
    /// Whether the title/body reads as a new feature.
    pub is_new_feature: bool,
    /// Whether new public definitions were added.
    pub has_new_code: bool,
    /// Whether existing logic was modified.
    pub has_logic_changes: bool,
}

/// Outcome of the coverage analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Whether the pull request ought to include tests and does not.
    pub needs_tests: bool,

    /// Human-readable justification of the verdict.
    pub reason: String,

    /// Rendered recommendation comment; `None` when no comment is warranted.
    pub comment: Option<String>,

    /// Counters, present whenever significant analysis ran.
    pub details: Option<CoverageDetails>,
}

impl CoverageReport {
    fn dismissed(reason: impl Into<String>) -> Self {
        Self {
            needs_tests: false,
            reason: reason.into(),
            comment: None,
            details: None,
        }
    }
}

/// What the analyzer needs to know about the pull request.
#[derive(Debug, Clone)]
pub struct CoverageInput<'a> {
    /// Pull request title.
    pub title: &'a str,
    /// Pull request body.
    pub body: &'a str,
    /// Labels currently applied.
    pub labels: &'a [String],
    /// Files changed by the pull request.
    pub files: &'a [ChangedFile],
}

// ---------------------------------------------------------------------------
// Text heuristics
// ---------------------------------------------------------------------------

static BUG_FIX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bfix(es|ed)?\b.*#\d+",
        r"#\d+.*\bfix(es|ed)?\b",
        r"\b(bug|issue)\b.*#\d+",
        r"#\d+.*\b(bug|issue)\b",
        r"\b(resolv(es|ed)|clos(es|ed))\b.*#\d+",
        r"regression.*fix",
        r"fix.*regression",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("bug-fix pattern must compile"))
    .collect()
});

static FEATURE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\badd(s|ed)?\b.*feature",
        r"\bnew\b.*feature",
        r"\bimplement(s|ed)?\b",
        r"\bintroduc(es|ed)\b",
        r"\benhance(s|d|ment)?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("feature pattern must compile"))
    .collect()
});

/// Returns `true` when the title/body reads as a bug fix.
pub fn is_bug_fix(title: &str, body: &str) -> bool {
    let text = format!("{title} {body}").to_lowercase();
    BUG_FIX_PATTERNS.iter().any(|p| p.is_match(&text))
}

/// Returns `true` when the title/body reads as a new feature.
pub fn is_new_feature(title: &str, body: &str) -> bool {
    let text = format!("{title} {body}").to_lowercase();
    FEATURE_PATTERNS.iter().any(|p| p.is_match(&text))
}

// ---------------------------------------------------------------------------
// Patch heuristics
// ---------------------------------------------------------------------------

fn changed_lines(patch: &str) -> impl Iterator<Item = &str> {
    patch.lines().filter(|l| {
        (l.starts_with('+') || l.starts_with('-'))
            && !l.starts_with("+++")
            && !l.starts_with("---")
    })
}

fn is_comment_or_blank(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('#')
        || line.starts_with("//")
        || line.starts_with("\"\"\"")
        || line.starts_with("'''")
}

struct SignificantChange {
    filename: String,
    has_new_definitions: bool,
    modifies_logic: bool,
    expected_test_dirs: Vec<String>,
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Coverage analyzer with its compiled configuration.
pub struct CoverageAnalyzer {
    config: CoverageConfig,
    definition_regex: Regex,
}

impl CoverageAnalyzer {
    /// Compiles the configuration, rejecting an invalid definition pattern.
    pub fn new(config: CoverageConfig) -> Result<Self, SentryError> {
        let definition_regex = RegexBuilder::new(&config.definition_pattern)
            .multi_line(true)
            .build()
            .map_err(|e| SentryError::ConfigurationError {
                message: format!("invalid coverage definition pattern: {e}"),
            })?;
        Ok(Self {
            config,
            definition_regex,
        })
    }

    /// Test directories conventionally covering `filename`, per the module map.
    pub fn expected_test_dirs(&self, filename: &str) -> Vec<String> {
        for entry in &self.config.module_map {
            if filename.starts_with(&entry.module) {
                return entry.test_dirs.clone();
            }
        }
        Vec::new()
    }

    /// Whether a change is trivial and exempt from coverage expectations.
    pub fn is_trivial_change(&self, file: &ChangedFile) -> bool {
        let name = &file.filename;
        if self.config.doc_extensions.iter().any(|ext| name.ends_with(ext)) {
            return true;
        }
        if self.config.generated_markers.iter().any(|m| name.contains(m)) {
            return true;
        }
        if let Some(patch) = &file.patch {
            let meaningful = changed_lines(patch)
                .map(|l| l[1..].trim())
                .any(|l| !is_comment_or_blank(l));
            if !meaningful {
                return true;
            }
        }
        false
    }

    /// Whether the patch adds public definitions (functions, types, classes).
    pub fn has_new_definitions(&self, file: &ChangedFile) -> bool {
        let Some(patch) = &file.patch else {
            return false;
        };
        let added: String = patch
            .lines()
            .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
            .map(|l| &l[1..])
            .collect::<Vec<_>>()
            .join("\n");

        self.definition_regex
            .captures_iter(&added)
            .filter_map(|c| c.get(1))
            .any(|name| !name.as_str().starts_with('_'))
    }

    /// Whether the patch modifies existing logic (deletes as well as adds).
    pub fn modifies_existing_logic(&self, file: &ChangedFile) -> bool {
        let Some(patch) = &file.patch else {
            return false;
        };
        let mut additions = 0;
        let mut deletions = 0;
        for line in changed_lines(patch) {
            if line.starts_with('+') {
                additions += 1;
            } else {
                deletions += 1;
            }
        }
        additions > 0 && deletions > 0
    }

    fn is_touched_code(&self, file: &ChangedFile) -> bool {
        matches!(file.status, FileStatus::Added | FileStatus::Modified)
            && self
                .config
                .source_suffixes
                .iter()
                .any(|s| file.filename.ends_with(s))
    }

    /// Runs the full analysis.
    pub fn analyze(&self, input: &CoverageInput<'_>) -> CoverageReport {
        if input.labels.iter().any(|l| l == &self.config.dismiss_label) {
            return CoverageReport::dismissed(format!(
                "{} label present",
                self.config.dismiss_label
            ));
        }

        let source_files: Vec<&ChangedFile> = input
            .files
            .iter()
            .filter(|f| {
                self.is_touched_code(f)
                    && self
                        .config
                        .source_prefixes
                        .iter()
                        .any(|p| f.filename.starts_with(p))
                    && !self
                        .config
                        .test_prefixes
                        .iter()
                        .any(|p| f.filename.starts_with(p))
            })
            .collect();

        let test_files: Vec<&ChangedFile> = input
            .files
            .iter()
            .filter(|f| {
                self.is_touched_code(f)
                    && self
                        .config
                        .test_prefixes
                        .iter()
                        .any(|p| f.filename.starts_with(p))
            })
            .collect();

        if source_files.is_empty() {
            return CoverageReport::dismissed("no source changes");
        }
        if !test_files.is_empty() {
            return CoverageReport::dismissed("tests already included");
        }

        let mut significant = Vec::new();
        let mut trivial = 0usize;
        for file in &source_files {
            if self.is_trivial_change(file) {
                trivial += 1;
            } else {
                significant.push(SignificantChange {
                    filename: file.filename.clone(),
                    has_new_definitions: self.has_new_definitions(file),
                    modifies_logic: self.modifies_existing_logic(file),
                    expected_test_dirs: self.expected_test_dirs(&file.filename),
                });
            }
        }

        if significant.is_empty() {
            return CoverageReport::dismissed(
                "all changes are trivial (docs, comments, whitespace)",
            );
        }

        let bug_fix = is_bug_fix(input.title, input.body);
        let new_feature = is_new_feature(input.title, input.body);
        let has_new_code = significant.iter().any(|c| c.has_new_definitions);
        let has_logic_changes = significant.iter().any(|c| c.modifies_logic);

        let details = CoverageDetails {
            source_files: source_files.len(),
            test_files: test_files.len(),
            significant_changes: significant.len(),
            trivial_changes: trivial,
            is_bug_fix: bug_fix,
            is_new_feature: new_feature,
            has_new_code,
            has_logic_changes,
        };

        if !(bug_fix || new_feature || has_new_code || has_logic_changes) {
            return CoverageReport {
                needs_tests: false,
                reason: "changes appear to be refactoring or style improvements".to_string(),
                comment: None,
                details: Some(details),
            };
        }

        let mut reasons = Vec::new();
        if bug_fix {
            reasons.push("**Bug fix detected** - regression tests recommended");
        }
        if new_feature {
            reasons.push("**New feature detected** - feature tests recommended");
        }
        if has_new_code {
            reasons.push("**New functions/types added** - unit tests recommended");
        }
        if has_logic_changes {
            reasons.push("**Existing logic modified** - tests should be updated");
        }

        let comment = self.render_comment(&significant, &reasons);

        CoverageReport {
            needs_tests: true,
            reason: format!("significant changes detected: {}", reasons.join(", ")),
            comment: Some(comment),
            details: Some(details),
        }
    }

    fn render_comment(&self, significant: &[SignificantChange], reasons: &[&str]) -> String {
        let mut suggested: Vec<&str> = significant
            .iter()
            .flat_map(|c| c.expected_test_dirs.iter().map(String::as_str))
            .collect();
        suggested.sort_unstable();
        suggested.dedup();

        let mut comment = String::from("## Test Coverage Recommendation\n\n");
        comment.push_str("This PR modifies project source but doesn't include tests.\n\n");

        comment.push_str("**Modified source files:**\n");
        for change in significant {
            comment.push_str(&format!("- `{}`\n", change.filename));
        }

        comment.push_str("\n**Why tests are recommended:**\n");
        for reason in reasons {
            comment.push_str(&format!("- {reason}\n"));
        }

        if !suggested.is_empty() {
            comment.push_str("\n**Suggested test locations:**\n");
            for dir in suggested {
                comment.push_str(&format!("- `{dir}`\n"));
            }
        }

        comment.push_str(&format!(
            "\n**If tests aren't needed:**\n\
             - Add the `{}` label to dismiss this check\n\
             - Common exceptions: pure refactoring, documentation fixes, code style changes\n",
            self.config.dismiss_label
        ));
        comment
    }
}
