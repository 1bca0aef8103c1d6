//! The `run` and `check` subcommands.
//!
//! Both return the process exit code as a plain number so the contract is
//! directly testable; `main` converts it to an [`std::process::ExitCode`].

use std::path::Path;

use anyhow::{anyhow, bail, Context};
use tracing::{error, info, warn};

use github::{GithubClient, PullRequestEventPayload};
use pipeline::{
    AccessToken, PullRequestHost, PullRequestNumber, RepositoryId, RunContext, RunRequest,
    RunState,
};
use quality::{apply_actions, check_pull_request, plan_actions, CoverageAnalyzer, CoverageInput};
use runner::{workflow_steps, TriggerRunner};

use crate::config::CliConfig;

/// Exit code reported for a successful run, a non-qualifying event, or a
/// completed check.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code reported for a failed run or failed host operations.
pub const EXIT_FAILURE: u8 = 1;

fn token_from_env(config: &CliConfig) -> anyhow::Result<AccessToken> {
    let var = &config.github.token_env;
    let value = std::env::var(var)
        .map_err(|_| anyhow!("environment variable {var} is required"))?;
    AccessToken::new(value).ok_or_else(|| anyhow!("environment variable {var} is empty"))
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Consumes a delivered event payload and, if it qualifies, drives one run.
pub async fn run(config: &CliConfig, event_path: &Path) -> anyhow::Result<u8> {
    let payload = PullRequestEventPayload::from_file(event_path)
        .with_context(|| format!("loading event payload from {}", event_path.display()))?;
    let event = payload.into_trigger_event()?;

    let triggers = config.trigger.trigger_set();
    if !triggers.admits(&event) {
        info!(
            action = %event.action,
            pr = %event.number,
            "event does not qualify, no run"
        );
        return Ok(EXIT_SUCCESS);
    }

    let context = RunContext {
        token: token_from_env(config)?,
        pr_number: event.number,
        repository: event.repository.clone(),
    };
    let steps = workflow_steps(&config.runtime.workflow(), &event.head_sha, &context)?;
    let request = RunRequest::new(context);

    let report = TriggerRunner::run(&request, steps).await?;

    match report.state {
        RunState::Succeeded => Ok(EXIT_SUCCESS),
        _ => {
            if let Some(failure) = &report.failure {
                warn!(
                    step = %failure.step,
                    class = ?failure.class,
                    "run failed: {}", failure.message
                );
            }
            Ok(EXIT_FAILURE)
        }
    }
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

/// Fetches a pull request and runs the built-in quality and coverage checks.
///
/// Host API failures (fetching or applying) report exit code 1, not a
/// configuration error: the check was correctly requested and could not be
/// completed.
pub async fn check(config: &CliConfig, repo: &str, pr: u64) -> anyhow::Result<u8> {
    let repository = RepositoryId::new(repo)
        .ok_or_else(|| anyhow!("repository must be in owner/name form, got {repo:?}"))?;
    let number = PullRequestNumber::new(pr)
        .ok_or_else(|| anyhow!("pull request number must be positive"))?;
    let token = token_from_env(config)?;

    let client = GithubClient::new(repository, token, config.github.api_url.as_deref())?;
    let details = match client.pull_request(number).await {
        Ok(details) => details,
        Err(e) => {
            error!(pr = %number, error = %e, "fetching pull request failed");
            return Ok(EXIT_FAILURE);
        }
    };

    if !details.open {
        bail!("pull request #{number} is not open");
    }

    info!(pr = %number, title = %details.title, "checking pull request quality");

    let issues = check_pull_request(&details.title, &details.body);
    let actions = plan_actions(&issues, &config.actions.options());
    let mut failures = apply_actions(&client, number, &actions).await;

    // Coverage recommendation; advisory, rendered as its own comment.
    let files = match client.changed_files(number).await {
        Ok(files) => files,
        Err(e) => {
            error!(pr = %number, error = %e, "listing changed files failed");
            return Ok(EXIT_FAILURE);
        }
    };
    let analyzer = CoverageAnalyzer::new(config.coverage.clone())?;
    let report = analyzer.analyze(&CoverageInput {
        title: &details.title,
        body: &details.body,
        labels: &details.labels,
        files: &files,
    });
    info!(
        needs_tests = report.needs_tests,
        reason = %report.reason,
        "coverage analysis complete"
    );
    if let Some(comment) = &report.comment {
        if let Err(e) = client.create_comment(number, comment).await {
            warn!(error = %e, "posting coverage recommendation failed");
            failures += 1;
        }
    }

    if failures > 0 {
        Ok(EXIT_FAILURE)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
