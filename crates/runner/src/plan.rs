//! Planning the ordered step sequence for one run.
//!
//! The plan reproduces the reference workflow's shape: acquire the source at
//! the event's commit, provision a pinned interpreter, upgrade the packaging
//! tool, install the analysis dependencies, then invoke the script with the
//! run's environment contract. Steps execute strictly in this order.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use pipeline::{CommitSha, RunContext, SentryError};

use crate::step::{BuiltinStep, StepConfig};

/// Default per-step timeout.
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 600;

/// What the planner needs to know about the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Interpreter binary of the pinned minor version (e.g. `"python3.12"`).
    pub interpreter: String,

    /// Packages installed before the script runs.
    pub dependencies: Vec<String>,

    /// Path of the analysis script, relative to the checkout.
    pub script: PathBuf,

    /// Working directory for every step; inherits the runner's when `None`.
    pub workdir: Option<PathBuf>,

    /// Per-step timeout in seconds.
    pub step_timeout_secs: u64,
}

impl WorkflowConfig {
    /// Validates the fields a plan cannot be built without.
    pub fn validate(&self) -> Result<(), SentryError> {
        if self.interpreter.is_empty() {
            return Err(SentryError::ConfigurationError {
                message: "runtime interpreter must not be empty".to_string(),
            });
        }
        if self.script.as_os_str().is_empty() {
            return Err(SentryError::ConfigurationError {
                message: "analysis script path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Builds the ordered step sequence for one run.
///
/// The final step — and only the final step — carries the three-variable
/// environment contract from `context`.
pub fn workflow_steps(
    config: &WorkflowConfig,
    head_sha: &CommitSha,
    context: &RunContext,
) -> Result<Vec<StepConfig>, SentryError> {
    config.validate()?;

    let interpreter = config.interpreter.clone();
    let timeout = config.step_timeout_secs;

    let mut steps = vec![
        StepConfig::from_builtin(
            BuiltinStep::FetchSource,
            vec![
                "git".to_string(),
                "fetch".to_string(),
                "--force".to_string(),
                "origin".to_string(),
                head_sha.as_str().to_string(),
            ],
            timeout,
        ),
        StepConfig::from_builtin(
            BuiltinStep::Checkout,
            vec![
                "git".to_string(),
                "checkout".to_string(),
                "--force".to_string(),
                "--detach".to_string(),
                head_sha.as_str().to_string(),
            ],
            timeout,
        ),
        StepConfig::from_builtin(
            BuiltinStep::SetupRuntime,
            vec![interpreter.clone(), "--version".to_string()],
            timeout,
        ),
        StepConfig::from_builtin(
            BuiltinStep::UpgradePackaging,
            vec![
                interpreter.clone(),
                "-m".to_string(),
                "pip".to_string(),
                "install".to_string(),
                "--upgrade".to_string(),
                "pip".to_string(),
            ],
            timeout,
        ),
    ];

    // A workflow with nothing to install skips the step rather than running
    // a no-op pip invocation.
    let mut install = vec![
        interpreter.clone(),
        "-m".to_string(),
        "pip".to_string(),
        "install".to_string(),
    ];
    install.extend(config.dependencies.iter().cloned());
    let install_step = StepConfig::from_builtin(BuiltinStep::InstallDependencies, install, timeout);
    steps.push(if config.dependencies.is_empty() {
        install_step.disabled()
    } else {
        install_step
    });

    steps.push(
        StepConfig::from_builtin(
            BuiltinStep::RunScript,
            vec![interpreter, config.script.display().to_string()],
            timeout,
        )
        .with_env(context.env()),
    );

    if let Some(dir) = &config.workdir {
        for step in &mut steps {
            step.workdir = Some(dir.clone());
        }
    }

    Ok(steps)
}
