//! End-to-end tests of the run driver over real subprocesses.

use pipeline::{
    AccessToken, PullRequestNumber, RepositoryId, RunContext, RunRequest, RunState, StepName,
    Timestamp,
};
use runner::{FailureClass, StepConfig, StepPhase, TriggerRunner};

fn request() -> RunRequest {
    RunRequest::new(RunContext {
        token: AccessToken::new("ghs_test").unwrap(),
        pr_number: PullRequestNumber::new(7).unwrap(),
        repository: RepositoryId::new("org/proj").unwrap(),
    })
}

fn shell_step(name: &str, phase: StepPhase, script: &str) -> StepConfig {
    let mut step = StepConfig::custom(
        StepName::new(name).unwrap(),
        vec!["sh".to_string(), "-c".to_string(), script.to_string()],
        30,
    );
    step.phase = phase;
    step
}

#[tokio::test]
async fn all_steps_passing_terminates_in_succeeded() {
    let steps = vec![
        shell_step("fetch-source", StepPhase::Provision, "true"),
        shell_step("setup-runtime", StepPhase::Provision, "true"),
        shell_step("run-script", StepPhase::Script, "true"),
    ];

    let before = Timestamp::now();
    let report = TriggerRunner::run(&request(), steps).await.unwrap();

    assert_eq!(report.state, RunState::Succeeded);
    assert!(report.succeeded());
    assert!(report.failure.is_none());
    assert_eq!(report.steps.len(), 3);
    assert!(report.steps.iter().all(|s| s.passed()));
    assert!(report.started_at >= before);
    assert!(report.started_at <= Timestamp::now());
}

#[tokio::test]
async fn failing_provision_step_aborts_before_later_steps() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("script-ran");
    let steps = vec![
        shell_step("fetch-source", StepPhase::Provision, "true"),
        shell_step("install-dependencies", StepPhase::Provision, "exit 3"),
        shell_step(
            "run-script",
            StepPhase::Script,
            &format!("touch {}", marker.display()),
        ),
    ];

    let report = TriggerRunner::run(&request(), steps).await.unwrap();

    assert_eq!(report.state, RunState::Failed);
    let failure = report.failure.unwrap();
    assert_eq!(failure.step.as_str(), "install-dependencies");
    assert_eq!(failure.class, FailureClass::Provisioning);
    assert_eq!(failure.exit_code, Some(3));
    // Only the two executed steps have results; the script never ran.
    assert_eq!(report.steps.len(), 2);
    assert!(!marker.exists());
}

#[tokio::test]
async fn script_failure_is_classified_as_script() {
    let steps = vec![
        shell_step("fetch-source", StepPhase::Provision, "true"),
        shell_step("run-script", StepPhase::Script, "exit 1"),
    ];

    let report = TriggerRunner::run(&request(), steps).await.unwrap();

    assert_eq!(report.state, RunState::Failed);
    let failure = report.failure.unwrap();
    assert_eq!(failure.class, FailureClass::Script);
    assert_eq!(failure.exit_code, Some(1));
}

#[tokio::test]
async fn unstartable_step_fails_the_run_without_an_exit_code() {
    let mut missing = StepConfig::custom(
        StepName::new("run-script").unwrap(),
        vec!["prsentry-no-such-binary".to_string()],
        30,
    );
    missing.phase = StepPhase::Script;
    let steps = vec![missing];

    let report = TriggerRunner::run(&request(), steps).await.unwrap();

    assert_eq!(report.state, RunState::Failed);
    let failure = report.failure.unwrap();
    assert_eq!(failure.class, FailureClass::Script);
    assert_eq!(failure.exit_code, None);
    assert!(report.steps.is_empty());
}

#[tokio::test]
async fn disabled_steps_are_skipped() {
    let steps = vec![
        shell_step("fetch-source", StepPhase::Provision, "true"),
        shell_step("install-dependencies", StepPhase::Provision, "exit 9").disabled(),
        shell_step("run-script", StepPhase::Script, "true"),
    ];

    let report = TriggerRunner::run(&request(), steps).await.unwrap();

    assert_eq!(report.state, RunState::Succeeded);
    assert_eq!(report.steps.len(), 2);
}

#[tokio::test]
async fn script_step_sees_the_run_context_environment() {
    let request = request();
    let steps = vec![shell_step(
        "run-script",
        StepPhase::Script,
        "test \"$GITHUB_TOKEN\" = ghs_test \
         && test \"$PR_NUMBER\" = 7 \
         && test \"$GITHUB_REPOSITORY\" = org/proj",
    )
    .with_env(request.context.env())];

    let report = TriggerRunner::run(&request, steps).await.unwrap();

    assert_eq!(report.state, RunState::Succeeded);
}
