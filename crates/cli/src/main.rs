//! PRSentry CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration** — load `.prsentry/config.toml` and validate it.
//! 2. **Wire observability** — configure `tracing-subscriber` with an
//!    env-filter, a fmt layer (JSON optional), and an optional OpenTelemetry
//!    OTLP exporter. All `tracing` spans and structured events emitted by
//!    every crate in the workspace flow through this subscriber.
//! 3. **Select subcommand**:
//!    - `run` — consume a delivered pull-request event payload, decide whether
//!      it qualifies, and if so drive the provisioning-plus-script step
//!      sequence to a terminal state. The process exit code mirrors the run
//!      status; a non-qualifying event exits 0 without a run.
//!    - `check` — the built-in counterpart of the external analysis script:
//!      fetch the pull request, run the quality and coverage checks, and apply
//!      the resulting actions through the hosting platform API.
//!
//! Exit codes: `0` success (or no run), `1` failed run or failed host
//! operations, `2` configuration or payload errors.

mod commands;
mod config;
mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use crate::config::CliConfig;
use crate::telemetry::Telemetry;

#[derive(Parser)]
#[command(name = "prsentry")]
#[command(about = "Pull-request quality gate: event-triggered runs and built-in analysis")]
#[command(version)]
struct Cli {
    /// Configuration file (default: .prsentry/config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consume a delivered pull-request event and run the step sequence.
    Run {
        /// Path to the event payload JSON (e.g. the file named by
        /// GITHUB_EVENT_PATH).
        #[arg(long)]
        event: PathBuf,
    },
    /// Fetch a pull request and run the built-in quality and coverage checks.
    Check {
        /// Repository in owner/name form.
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repo: String,

        /// Pull request number.
        #[arg(long, env = "PR_NUMBER")]
        pr: u64,
    },
}

/// Exit code for configuration and payload errors.
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let telemetry = match Telemetry::init(&config.telemetry) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let outcome = match cli.command {
        Commands::Run { event } => commands::run(&config, &event).await,
        Commands::Check { repo, pr } => commands::check(&config, &repo, pr).await,
    };

    let code = match outcome {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(error = %format!("{e:#}"), "command failed");
            ExitCode::from(EXIT_CONFIG)
        }
    };

    telemetry.shutdown();
    code
}
