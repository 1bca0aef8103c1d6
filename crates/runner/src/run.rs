//! The sequential, fail-fast run driver.
//!
//! One qualifying event produces one run: every enabled step executes in plan
//! order, and the first failure — provisioning or script — halts the
//! remainder. There is no retry and no compensating action; the failure class
//! and the failed step are recorded in the report, and the run's terminal
//! state is what gets surfaced as the check result.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use pipeline::{RunId, RunRequest, RunState, SentryError, StepName, Timestamp};

use crate::execute::{execute_step, StepResult};
use crate::step::{StepConfig, StepPhase};

/// Failure class recorded in a failed run's report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Checkout, runtime setup, or dependency install failed.
    Provisioning,
    /// The analysis script exited non-zero or could not be started.
    Script,
}

/// Details of the step that failed a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFailure {
    /// The step that failed.
    pub step: StepName,

    /// Which failure class the step belongs to.
    pub class: FailureClass,

    /// Exit code, when the process produced one.
    pub exit_code: Option<i32>,

    /// Human-readable description of the failure.
    pub message: String,
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier correlating all activity of this run.
    pub run_id: RunId,

    /// Terminal state: [`RunState::Succeeded`] or [`RunState::Failed`].
    pub state: RunState,

    /// Wall-clock time the run was triggered.
    pub started_at: Timestamp,

    /// Results of the steps that executed, in order. Steps after a failure
    /// never execute and have no entry.
    pub steps: Vec<StepResult>,

    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// Present exactly when `state` is [`RunState::Failed`].
    pub failure: Option<RunFailure>,
}

impl RunReport {
    /// Whether every step passed and the run succeeded.
    pub fn succeeded(&self) -> bool {
        self.state == RunState::Succeeded
    }
}

/// Drives one run to a terminal state.
pub struct TriggerRunner;

impl TriggerRunner {
    /// Executes the plan sequentially, aborting on the first failure.
    ///
    /// The only error path is a lifecycle violation, which indicates a bug in
    /// the driver itself; every step-level failure is reported through
    /// [`RunReport::failure`] instead.
    pub async fn run(
        request: &RunRequest,
        steps: Vec<StepConfig>,
    ) -> Result<RunReport, SentryError> {
        let start = Instant::now();
        let started_at = Timestamp::now();
        let run_id = request.run_id;

        let mut state = RunState::Triggered;
        info!(
            run_id = %run_id,
            repository = %request.context.repository,
            pr = %request.context.pr_number,
            state = %state,
            "run triggered"
        );

        state = state.advance(RunState::Running)?;
        info!(run_id = %run_id, state = %state, "run started");

        let mut results = Vec::new();
        let mut failure = None;

        for step in &steps {
            if !step.enabled {
                info!(run_id = %run_id, step = %step.name, "skipping disabled step");
                continue;
            }

            info!(run_id = %run_id, step = %step.name, "executing step");
            match execute_step(step).await {
                Ok(result) if result.passed() => {
                    info!(
                        run_id = %run_id,
                        step = %step.name,
                        duration_ms = result.duration_ms,
                        "step passed"
                    );
                    results.push(result);
                }
                Ok(result) => {
                    error!(
                        run_id = %run_id,
                        step = %step.name,
                        exit_code = result.exit_code,
                        "step failed, aborting run"
                    );
                    failure = Some(RunFailure {
                        step: step.name.clone(),
                        class: classify(step.phase),
                        exit_code: Some(result.exit_code),
                        message: failure_message(step, &result),
                    });
                    results.push(result);
                    break;
                }
                Err(e) => {
                    error!(
                        run_id = %run_id,
                        step = %step.name,
                        error = %e,
                        "step could not execute, aborting run"
                    );
                    failure = Some(RunFailure {
                        step: step.name.clone(),
                        class: classify(step.phase),
                        exit_code: None,
                        message: e.to_string(),
                    });
                    break;
                }
            }
        }

        state = match &failure {
            None => state.advance(RunState::Succeeded)?,
            Some(_) => state.advance(RunState::Failed)?,
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        info!(run_id = %run_id, state = %state, duration_ms, "run finished");

        Ok(RunReport {
            run_id,
            state,
            started_at,
            steps: results,
            duration_ms,
            failure,
        })
    }
}

fn classify(phase: StepPhase) -> FailureClass {
    match phase {
        StepPhase::Provision => FailureClass::Provisioning,
        StepPhase::Script => FailureClass::Script,
    }
}

fn failure_message(step: &StepConfig, result: &StepResult) -> String {
    let detail = if result.stderr.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", result.stderr.trim())
    };
    format!(
        "step '{}' exited with code {}{detail}",
        step.name, result.exit_code
    )
}
