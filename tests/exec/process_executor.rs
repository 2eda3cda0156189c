use std::time::Duration;

use scriptpilot::error::ExecError;
use scriptpilot::exec::{Environment, ExecutionRequest, ExecutionResult, ProcessExecutor, ScriptExecutor};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const MARKER: &str = "TASK COMPLETE";

fn shell(timeout: Duration) -> ProcessExecutor {
    ProcessExecutor::new(vec!["sh".into(), "-c".into()], timeout, 64 * 1024)
}

async fn run_in(
    executor: &ProcessExecutor,
    env: &Environment,
    code: &str,
) -> Result<ExecutionResult, ExecError> {
    let cancel = CancellationToken::new();
    executor
        .execute(ExecutionRequest {
            code,
            env,
            terminal_marker: MARKER,
            cancel: &cancel,
        })
        .await
}

#[tokio::test]
async fn stdout_is_captured_and_marker_detected() {
    let tmp = TempDir::new().unwrap();
    let env = Environment::new(tmp.path());

    let result = run_in(&shell(Duration::from_secs(10)), &env, "echo hello; echo 'TASK COMPLETE'")
        .await
        .unwrap();

    assert!(result.is_completed());
    assert!(result.has_terminal_marker());
    assert_eq!(result.output(), "hello\nTASK COMPLETE\n");
}

#[tokio::test]
async fn stderr_is_captured_in_arrival_order() {
    let tmp = TempDir::new().unwrap();
    let env = Environment::new(tmp.path());

    let result = run_in(
        &shell(Duration::from_secs(10)),
        &env,
        "echo first; sleep 0.2; echo second >&2; sleep 0.2; echo third",
    )
    .await
    .unwrap();

    assert!(!result.has_terminal_marker());
    assert_eq!(result.output(), "first\nsecond\nthird\n");
}

#[tokio::test]
async fn non_zero_exit_is_failed_with_status() {
    let tmp = TempDir::new().unwrap();
    let env = Environment::new(tmp.path());

    let result = run_in(
        &shell(Duration::from_secs(10)),
        &env,
        "echo 'No such file: data.csv' >&2; echo TASK COMPLETE; exit 3",
    )
    .await
    .unwrap();

    let ExecutionResult::Failed { error_text } = &result else {
        panic!("expected failure, got {result:?}");
    };
    assert!(error_text.starts_with("No such file: data.csv\n"));
    assert!(error_text.ends_with("Process exited with status 3"));
    // Failures never count as completion, even if the marker was printed.
    assert!(!result.has_terminal_marker());
}

#[tokio::test]
async fn timeout_kills_and_keeps_partial_output() {
    let tmp = TempDir::new().unwrap();
    let env = Environment::new(tmp.path());

    let started = std::time::Instant::now();
    let result = run_in(&shell(Duration::from_millis(300)), &env, "echo started; sleep 30")
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    let ExecutionResult::TimedOut {
        timeout,
        partial_output,
    } = result
    else {
        panic!("expected timeout");
    };
    assert_eq!(timeout, Duration::from_millis(300));
    assert_eq!(partial_output, "started\n");
}

#[cfg(unix)]
#[tokio::test]
async fn timeout_kills_grandchildren_too() {
    let tmp = TempDir::new().unwrap();
    let env = Environment::new(tmp.path());

    let result = run_in(
        &shell(Duration::from_millis(300)),
        &env,
        "(sleep 1; touch late.txt) & sleep 30",
    )
    .await
    .unwrap();
    assert!(matches!(result, ExecutionResult::TimedOut { .. }));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!tmp.path().join("late.txt").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn background_child_holding_the_pipe_does_not_block() {
    let tmp = TempDir::new().unwrap();
    let env = Environment::new(tmp.path());

    let started = std::time::Instant::now();
    let result = run_in(&shell(Duration::from_secs(30)), &env, "sleep 20 & echo done")
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(result.is_completed());
    assert_eq!(result.output(), "done\n");
}

#[tokio::test]
async fn cancellation_reports_interrupted() {
    let tmp = TempDir::new().unwrap();
    let env = Environment::new(tmp.path());
    let executor = shell(Duration::from_secs(30));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let result = executor
        .execute(ExecutionRequest {
            code: "echo waiting; sleep 30",
            env: &env,
            terminal_marker: MARKER,
            cancel: &cancel,
        })
        .await
        .unwrap();

    let ExecutionResult::Failed { error_text } = result else {
        panic!("expected failure");
    };
    assert_eq!(error_text, "waiting\ninterrupted by user");
}

#[tokio::test]
async fn runs_in_environment_directory_with_overrides() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("nasdaq.csv"), "Date,Close\n").unwrap();
    let mut env = Environment::new(tmp.path());
    env.set_var("PILOT_TEST_VALUE", "42");

    let result = run_in(
        &shell(Duration::from_secs(10)),
        &env,
        "ls; echo \"value=$PILOT_TEST_VALUE\"",
    )
    .await
    .unwrap();

    assert_eq!(result.output(), "nasdaq.csv\nvalue=42\n");
}

#[tokio::test]
async fn environment_changes_persist_between_runs() {
    let tmp = TempDir::new().unwrap();
    let mut env = Environment::new(tmp.path());
    let executor = shell(Duration::from_secs(10));

    run_in(&executor, &env, "mkdir out && echo one > out/a.txt")
        .await
        .unwrap();
    env.set_cwd(tmp.path().join("out"));
    let result = run_in(&executor, &env, "cat a.txt").await.unwrap();

    assert_eq!(result.output(), "one\n");
}

#[tokio::test]
async fn output_is_capped() {
    let tmp = TempDir::new().unwrap();
    let env = Environment::new(tmp.path());
    let executor = ProcessExecutor::new(vec!["sh".into(), "-c".into()], Duration::from_secs(10), 100);

    let result = run_in(&executor, &env, "i=0; while [ $i -lt 100 ]; do echo 0123456789; i=$((i+1)); done")
        .await
        .unwrap();

    assert!(result.output().starts_with("0123456789\n"));
    assert!(result.output().ends_with("[output truncated at 100 bytes]"));
}

#[tokio::test]
async fn missing_interpreter_is_an_environment_error() {
    let tmp = TempDir::new().unwrap();
    let env = Environment::new(tmp.path());
    let executor = ProcessExecutor::new(
        vec!["scriptpilot-no-such-interpreter".into(), "-c".into()],
        Duration::from_secs(5),
        1024,
    );

    let err = run_in(&executor, &env, "print(1)").await.unwrap_err();
    assert!(matches!(err, ExecError::Spawn { ref program, .. } if program == "scriptpilot-no-such-interpreter"));
}

#[tokio::test]
async fn empty_interpreter_and_missing_directory_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let env = Environment::new(tmp.path());
    let empty = ProcessExecutor::new(Vec::new(), Duration::from_secs(5), 1024);
    assert!(matches!(
        run_in(&empty, &env, "true").await,
        Err(ExecError::EmptyInterpreter)
    ));

    let gone = Environment::new(tmp.path().join("does-not-exist"));
    assert!(matches!(
        run_in(&shell(Duration::from_secs(5)), &gone, "true").await,
        Err(ExecError::MissingWorkingDir(_))
    ));
}
