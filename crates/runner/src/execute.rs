//! Subprocess execution for a single step.

use std::process::Stdio;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;

use crate::step::StepConfig;

/// Execution failed before an exit status could be observed.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The step declared no command at all.
    #[error("step '{step}' has an empty command")]
    EmptyCommand {
        /// Name of the misconfigured step.
        step: String,
    },

    /// The process could not be spawned (missing binary, permissions).
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        /// The executable that failed to start.
        command: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The process outlived its timeout.
    #[error("step '{step}' timed out after {timeout_secs} seconds")]
    Timeout {
        /// Name of the step that timed out.
        step: String,
        /// The configured timeout.
        timeout_secs: u64,
    },

    /// Waiting on the process failed.
    #[error("failed to collect output of '{command}': {source}")]
    Wait {
        /// The executable being waited on.
        command: String,
        /// Underlying OS error.
        source: std::io::Error,
    },
}

/// Result of one executed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Step name.
    pub step_name: String,

    /// Exit code (`0` = success, `-1` when the process was killed by a signal).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// Whether the process exited successfully.
    pub success: bool,
}

impl StepResult {
    /// Whether this step passed (clean exit, code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }
}

/// Executes one step to completion and captures its output.
pub async fn execute_step(config: &StepConfig) -> Result<StepResult, ExecError> {
    let start = Instant::now();

    let Some((exe, args)) = config.command.split_first() else {
        return Err(ExecError::EmptyCommand {
            step: config.name.to_string(),
        });
    };

    let mut command = Command::new(exe);
    command
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // A timed-out step must not leave its process running.
        .kill_on_drop(true);
    if let Some(dir) = &config.workdir {
        command.current_dir(dir);
    }
    for (key, value) in &config.env {
        command.env(key, value);
    }

    let child = command.spawn().map_err(|source| ExecError::Spawn {
        command: exe.clone(),
        source,
    })?;

    let output = if config.timeout_secs > 0 {
        tokio::time::timeout(
            std::time::Duration::from_secs(config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| ExecError::Timeout {
            step: config.name.to_string(),
            timeout_secs: config.timeout_secs,
        })?
    } else {
        child.wait_with_output().await
    }
    .map_err(|source| ExecError::Wait {
        command: exe.clone(),
        source,
    })?;

    Ok(StepResult {
        step_name: config.name.to_string(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration_ms: start.elapsed().as_millis() as u64,
        success: output.status.success(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::BuiltinStep;
    use pipeline::StepName;

    fn step(name: &str, command: &[&str]) -> StepConfig {
        StepConfig::custom(
            StepName::new(name).unwrap(),
            command.iter().map(|s| s.to_string()).collect(),
            60,
        )
    }

    #[test]
    fn passed_requires_clean_zero_exit() {
        let ok = StepResult {
            step_name: "checkout".to_string(),
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms: 5,
            success: true,
        };
        assert!(ok.passed());

        let failed = StepResult {
            exit_code: 1,
            success: false,
            ..ok.clone()
        };
        assert!(!failed.passed());
    }

    #[tokio::test]
    async fn executes_a_simple_command() {
        let result = execute_step(&step("echo", &["echo", "hello"])).await.unwrap();
        assert!(result.passed());
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn captures_a_failing_exit_code() {
        let result = execute_step(&step("fail", &["false"])).await.unwrap();
        assert!(!result.passed());
        assert_ne!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn injected_environment_reaches_the_process() {
        let config = StepConfig::from_builtin(
            BuiltinStep::RunScript,
            vec!["sh".to_string(), "-c".to_string(), "echo \"$PR_NUMBER\"".to_string()],
            60,
        )
        .with_env(vec![("PR_NUMBER".to_string(), "42".to_string())]);

        let result = execute_step(&config).await.unwrap();
        assert!(result.passed());
        assert_eq!(result.stdout.trim(), "42");
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let err = execute_step(&step("ghost", &["definitely-not-a-binary-xyz"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let err = execute_step(&step("empty", &[])).await.unwrap_err();
        assert!(matches!(err, ExecError::EmptyCommand { .. }));
    }

    #[tokio::test]
    async fn timeout_kills_a_hung_step() {
        let mut config = step("hang", &["sleep", "5"]);
        config.timeout_secs = 1;
        let err = execute_step(&config).await.unwrap_err();
        assert!(matches!(err, ExecError::Timeout { timeout_secs: 1, .. }));
    }
}
