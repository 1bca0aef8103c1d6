//! Step definitions and configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use pipeline::StepName;

/// Which failure class a step belongs to.
///
/// Everything before the script invocation is environment provisioning; the
/// script step itself is the analysis. The two classes surface differently in
/// the run report but halt the run identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    /// Source acquisition, runtime setup, dependency install.
    Provision,
    /// The analysis script invocation.
    Script,
}

/// The built-in steps of the trigger runner, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinStep {
    /// `git fetch` of the event's head commit.
    FetchSource,
    /// `git checkout` of the fetched commit (detached, read-only use).
    Checkout,
    /// Probe that the pinned interpreter is present.
    SetupRuntime,
    /// Upgrade of the packaging tool.
    UpgradePackaging,
    /// Install of the analysis dependencies.
    InstallDependencies,
    /// Invocation of the analysis script.
    RunScript,
}

impl BuiltinStep {
    /// The step name used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinStep::FetchSource => "fetch_source",
            BuiltinStep::Checkout => "checkout",
            BuiltinStep::SetupRuntime => "setup_runtime",
            BuiltinStep::UpgradePackaging => "upgrade_packaging",
            BuiltinStep::InstallDependencies => "install_dependencies",
            BuiltinStep::RunScript => "run_script",
        }
    }

    /// The failure class of this step.
    pub fn phase(self) -> StepPhase {
        match self {
            BuiltinStep::RunScript => StepPhase::Script,
            _ => StepPhase::Provision,
        }
    }
}

/// Configuration for one step of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Step name, unique within a plan.
    pub name: StepName,

    /// Failure class.
    pub phase: StepPhase,

    /// Command to execute (first element is the executable).
    pub command: Vec<String>,

    /// Extra environment injected into the subprocess.
    pub env: Vec<(String, String)>,

    /// Working directory; inherits the runner's when `None`.
    pub workdir: Option<PathBuf>,

    /// Timeout in seconds; `0` disables the timeout.
    pub timeout_secs: u64,

    /// Whether this step is enabled.
    pub enabled: bool,
}

impl StepConfig {
    /// Creates a step from a builtin, with no extra environment.
    pub fn from_builtin(step: BuiltinStep, command: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            name: StepName::new(step.name()).expect("builtin step names are non-empty"),
            phase: step.phase(),
            command,
            env: Vec::new(),
            workdir: None,
            timeout_secs,
            enabled: true,
        }
    }

    /// Creates a custom provisioning step.
    pub fn custom(name: StepName, command: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            name,
            phase: StepPhase::Provision,
            command,
            env: Vec::new(),
            workdir: None,
            timeout_secs,
            enabled: true,
        }
    }

    /// Attaches environment variables to the subprocess.
    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    /// Sets the working directory.
    pub fn in_dir(mut self, dir: PathBuf) -> Self {
        self.workdir = Some(dir);
        self
    }

    /// Disables this step.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
