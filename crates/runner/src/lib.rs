//! Step planning and execution for triggered runs.
//!
//! This crate turns a workflow configuration plus a run's context into an
//! ordered step plan, executes the plan sequentially with fail-fast
//! semantics, and reports the terminal outcome.
//!
//! ## Architectural Layer
//!
//! Sits above `pipeline` (domain types) and below the CLI. It owns process
//! spawning and is the only crate that touches the local filesystem and
//! subprocess machinery.
//!
//! | Module    | Responsibility                                             |
//! |-----------|------------------------------------------------------------|
//! | `step`    | Step definitions: builtin steps, phases, step configuration |
//! | `plan`    | Orders the builtin steps into one run's executable plan     |
//! | `execute` | Spawns one step's process and captures its result           |
//! | `run`     | Drives a full plan to a terminal state, fail-fast           |

pub mod execute;
pub mod plan;
pub mod run;
pub mod step;

pub use execute::{execute_step, ExecError, StepResult};
pub use plan::{workflow_steps, WorkflowConfig, DEFAULT_STEP_TIMEOUT_SECS};
pub use run::{FailureClass, RunFailure, RunReport, TriggerRunner};
pub use step::{BuiltinStep, StepConfig, StepPhase};
