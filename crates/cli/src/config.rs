//! Configuration for the `prsentry` binary.
//!
//! Loaded from `.prsentry/config.toml` (or a path given with `--config`).
//! Every section has working defaults, so an empty file is a valid
//! configuration; validation rejects the combinations a run cannot start
//! with. A run never begins on an invalid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pipeline::{EventAction, SentryError, TriggerSet};
use quality::CoverageConfig;
use runner::{WorkflowConfig, DEFAULT_STEP_TIMEOUT_SECS};

/// Default location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".prsentry/config.toml";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Which event actions start a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerSection {
    /// Qualifying actions; anything else is ignored without a run.
    pub actions: Vec<EventAction>,
}

impl Default for TriggerSection {
    fn default() -> Self {
        Self {
            actions: vec![
                EventAction::Opened,
                EventAction::Reopened,
                EventAction::Synchronize,
            ],
        }
    }
}

impl TriggerSection {
    /// The trigger set derived from this section.
    pub fn trigger_set(&self) -> TriggerSet {
        TriggerSet::new(self.actions.clone())
    }
}

/// Runtime provisioning and the analysis script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSection {
    /// Interpreter binary of the pinned minor version.
    pub interpreter: String,

    /// Packages installed before the script runs.
    pub dependencies: Vec<String>,

    /// Path of the analysis script, relative to the checkout.
    pub script: PathBuf,

    /// Working directory for every step; inherits the runner's when absent.
    pub workdir: Option<PathBuf>,

    /// Per-step timeout in seconds; `0` disables the timeout.
    pub step_timeout_secs: u64,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            interpreter: "python3.12".to_string(),
            dependencies: vec!["requests".to_string()],
            script: PathBuf::from(".github/scripts/check_pr_quality.py"),
            workdir: None,
            step_timeout_secs: DEFAULT_STEP_TIMEOUT_SECS,
        }
    }
}

impl RuntimeSection {
    /// The workflow configuration the runner plans from.
    pub fn workflow(&self) -> WorkflowConfig {
        WorkflowConfig {
            interpreter: self.interpreter.clone(),
            dependencies: self.dependencies.clone(),
            script: self.script.clone(),
            workdir: self.workdir.clone(),
            step_timeout_secs: self.step_timeout_secs,
        }
    }
}

/// Hosting platform access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSection {
    /// API root; the public instance when absent.
    pub api_url: Option<String>,

    /// Environment variable the access token is read from.
    pub token_env: String,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            api_url: None,
            token_env: pipeline::ENV_TOKEN.to_string(),
        }
    }
}

/// Side-effect toggles for the built-in quality check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsSection {
    /// Label applied to flagged pull requests; empty disables labelling.
    pub flag_label: String,

    /// Whether auto-close is permitted.
    pub allow_close: bool,
}

impl Default for ActionsSection {
    fn default() -> Self {
        Self {
            flag_label: quality::DEFAULT_FLAG_LABEL.to_string(),
            allow_close: true,
        }
    }
}

impl ActionsSection {
    /// The options handed to the action planner.
    pub fn options(&self) -> quality::ActionOptions {
        quality::ActionOptions {
            flag_label: pipeline::LabelName::new(self.flag_label.clone()),
            allow_close: self.allow_close,
        }
    }
}

/// Telemetry export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySection {
    /// OTLP endpoint; export is disabled when absent.
    pub otlp_endpoint: Option<String>,

    /// Emit log lines as JSON instead of human-readable text.
    pub json_output: bool,
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// The full `.prsentry/config.toml` contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub trigger: TriggerSection,
    pub runtime: RuntimeSection,
    pub github: GithubSection,
    pub actions: ActionsSection,
    pub coverage: CoverageConfig,
    pub telemetry: TelemetrySection,
}

impl CliConfig {
    /// Parses a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, SentryError> {
        let config: CliConfig =
            toml::from_str(text).map_err(|e| SentryError::ConfigurationError {
                message: format!("invalid configuration: {e}"),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a config file.
    pub fn from_file(path: &Path) -> Result<Self, SentryError> {
        let text = std::fs::read_to_string(path).map_err(|e| SentryError::ConfigurationError {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_toml(&text)
    }

    /// Loads the config at `path`, or the defaults when the default location
    /// does not exist and no explicit path was given.
    pub fn load(path: Option<&Path>) -> Result<Self, SentryError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<(), SentryError> {
        if self.trigger.actions.is_empty() {
            return Err(SentryError::ConfigurationError {
                message: "trigger.actions must name at least one action".to_string(),
            });
        }
        if self.github.token_env.is_empty() {
            return Err(SentryError::ConfigurationError {
                message: "github.token_env must not be empty".to_string(),
            });
        }
        self.runtime.workflow().validate()?;
        Ok(())
    }
}
