//! End-to-end pipeline tests
//!
//! These exercise the pipeline against a real `git` binary, with local
//! `file://` repositories; the per-stage behavior is covered by the
//! exec, installer, and runner tests. The success path additionally
//! needs `node` on the PATH.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use skiffd::deploy::manifest::Framework;
use skiffd::deploy::pipeline::{deploy, PipelineOptions};
use skiffd::deploy::registry::DeploymentRegistry;
use skiffd::deploy::runner::LaunchOptions;
use skiffd::errors::SkiffError;
use skiffd::utils::CooldownOptions;

fn test_options(workspace_root: std::path::PathBuf) -> PipelineOptions {
    PipelineOptions {
        workspace_root,
        embed_credentials: false,
        install_primary: vec!["true".to_string()],
        install_secondary: vec!["true".to_string()],
        launch: LaunchOptions::default(),
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

/// A free port with nothing listening on it
async fn unused_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_success_transcript_ordering() {
    let root = tempfile::tempdir().unwrap();
    let port = unused_port().await;

    // A minimal express-style repo whose entry point answers HTTP on
    // the configured port
    let src = root.path().join("tiny-app");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(
        src.join("package.json"),
        r#"{"name": "tiny-app", "main": "server.js", "dependencies": {"express": "4.18.0"}}"#,
    )
    .unwrap();
    std::fs::write(
        src.join("server.js"),
        format!(
            "require('http').createServer((req, res) => res.end('ok')).listen({});",
            port
        ),
    )
    .unwrap();
    git(&src, &["init", "-q"]);
    git(&src, &["add", "."]);
    git(
        &src,
        &[
            "-c", "user.email=ci@skiff.sh",
            "-c", "user.name=ci",
            "commit", "-qm", "init",
        ],
    );

    let mut options = test_options(root.path().join("workspaces"));
    options.launch = LaunchOptions {
        port,
        readiness_attempts: 20,
        cooldown: CooldownOptions {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            multiplier: 2.0,
        },
    };
    let registry = Arc::new(DeploymentRegistry::new());

    let result = deploy(
        &format!("file://{}", src.display()),
        "tiny-app",
        None,
        &options,
        registry.clone(),
    )
    .await
    .unwrap();

    assert!(result.success);
    assert_eq!(result.framework, Framework::Express);
    assert_eq!(result.url, format!("http://localhost:{}", port));
    assert_eq!(registry.len().await, 1);

    // The transcript markers appear in pipeline order and agree with
    // the returned fields
    let clone_pos = result.log.find("> Cloning repository...").unwrap();
    let framework_pos = result.log.find("Detected framework: express").unwrap();
    let success_pos = result
        .log
        .find(&format!(
            "> Success! Your repo is being served at {}",
            result.url
        ))
        .unwrap();
    assert!(clone_pos < framework_pos);
    assert!(framework_pos < success_pos);

    registry.teardown_all().await;
}

#[tokio::test]
async fn test_clone_failure_preserves_transcript() {
    let root = tempfile::tempdir().unwrap();
    let options = test_options(root.path().join("workspaces"));
    let registry = Arc::new(DeploymentRegistry::new());

    let result = deploy(
        "file:///definitely/does/not/exist",
        "ghost",
        None,
        &options,
        registry.clone(),
    )
    .await;

    let failure = result.unwrap_err();
    assert!(matches!(
        failure.error,
        SkiffError::SourceAcquisitionError(_)
    ));
    // The transcript collected before the failure is preserved, with
    // the error appended as the final line
    assert!(failure.log.contains("> Cloning repository..."));
    assert!(failure.log.contains("> Error:"));
    // Nothing was registered
    assert_eq!(registry.len().await, 0);
}

#[tokio::test]
async fn test_manifest_missing_after_clone() {
    // An empty repository clones fine but has no package.json
    let root = tempfile::tempdir().unwrap();
    let bare = root.path().join("bare.git");
    let status = std::process::Command::new("git")
        .args(["init", "--bare", "-q"])
        .arg(&bare)
        .status()
        .unwrap();
    assert!(status.success());

    let options = test_options(root.path().join("workspaces"));
    let registry = Arc::new(DeploymentRegistry::new());

    let result = deploy(
        &format!("file://{}", bare.display()),
        "empty-repo",
        None,
        &options,
        registry,
    )
    .await;

    let failure = result.unwrap_err();
    assert!(matches!(failure.error, SkiffError::ManifestMissing));
    assert!(failure.log.contains("> Reading package.json..."));
    assert!(failure.log.contains("No package.json found"));
}
