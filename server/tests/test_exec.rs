//! Subprocess execution tests

use skiffd::deploy::exec::{run_step, CommandSpec};
use skiffd::transcript::Transcript;

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh", vec!["-c".to_string(), script.to_string()])
}

#[tokio::test]
async fn test_captures_exit_code_and_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut transcript = Transcript::new();

    let execution = run_step(&sh("echo hello; exit 3"), dir.path(), &mut transcript)
        .await
        .unwrap();

    assert_eq!(execution.exit_code, 3);
    assert!(!execution.success());
    assert!(execution.output.contains("hello"));
}

#[tokio::test]
async fn test_captures_both_streams() {
    let dir = tempfile::tempdir().unwrap();
    let mut transcript = Transcript::new();

    let execution = run_step(
        &sh("echo to-stdout; echo to-stderr 1>&2"),
        dir.path(),
        &mut transcript,
    )
    .await
    .unwrap();

    assert!(execution.success());
    assert!(execution.output.contains("to-stdout"));
    assert!(execution.output.contains("to-stderr"));
    // Chunks land in the transcript as they arrive
    assert!(transcript.as_str().contains("to-stdout"));
    assert!(transcript.as_str().contains("to-stderr"));
}

#[tokio::test]
async fn test_runs_in_given_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut transcript = Transcript::new();

    run_step(&sh("touch marker"), dir.path(), &mut transcript)
        .await
        .unwrap();

    assert!(dir.path().join("marker").exists());
}

#[tokio::test]
async fn test_extra_envs_are_passed() {
    let dir = tempfile::tempdir().unwrap();
    let mut transcript = Transcript::new();

    let spec = sh("printf '%s' \"$PROBE\"")
        .with_envs(vec![("PROBE".to_string(), "probe-value".to_string())]);
    let execution = run_step(&spec, dir.path(), &mut transcript).await.unwrap();

    assert_eq!(execution.output, "probe-value");
}

#[tokio::test]
async fn test_missing_program_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut transcript = Transcript::new();

    let spec = CommandSpec::new("definitely-not-a-real-program", vec![]);
    assert!(run_step(&spec, dir.path(), &mut transcript).await.is_err());
}
