//! Deployment registry tests

use std::process::Stdio;
use std::time::Duration;

use skiffd::deploy::manifest::Framework;
use skiffd::deploy::registry::{DeploymentRecord, DeploymentRegistry};
use skiffd::errors::SkiffError;
use tokio::process::Command;

fn spawn_sleeper() -> tokio::process::Child {
    Command::new("sh")
        .args(["-c", "sleep 30"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

async fn make_record(root: &std::path::Path, name: &str) -> DeploymentRecord {
    let workspace = root.join(name);
    tokio::fs::create_dir_all(&workspace).await.unwrap();
    DeploymentRecord::new(
        name.to_string(),
        Framework::Node,
        "http://localhost:5000".to_string(),
        workspace,
        spawn_sleeper(),
    )
}

#[tokio::test]
async fn test_register_and_list() {
    let root = tempfile::tempdir().unwrap();
    let registry = DeploymentRegistry::new();

    let id = registry.register(make_record(root.path(), "app").await).await;

    let deployments = registry.list().await;
    assert_eq!(deployments.len(), 1);
    assert_eq!(deployments[0].id, id);
    assert_eq!(deployments[0].repo_name, "app");

    registry.teardown_all().await;
}

#[tokio::test]
async fn test_teardown_reclaims_workspace() {
    let root = tempfile::tempdir().unwrap();
    let registry = DeploymentRegistry::new();

    let record = make_record(root.path(), "app").await;
    let workspace = record.workspace.clone();
    let id = registry.register(record).await;
    assert!(workspace.exists());

    registry.teardown(&id).await.unwrap();

    assert!(!workspace.exists());
    assert_eq!(registry.len().await, 0);
}

#[tokio::test]
async fn test_teardown_unknown_id() {
    let registry = DeploymentRegistry::new();
    let result = registry.teardown("no-such-id").await;
    assert!(matches!(result, Err(SkiffError::NotFound(_))));
}

#[tokio::test]
async fn test_sweep_reclaims_only_expired() {
    let root = tempfile::tempdir().unwrap();
    let registry = DeploymentRegistry::new();
    registry.register(make_record(root.path(), "app").await).await;

    // A generous TTL reclaims nothing
    assert_eq!(registry.sweep(Duration::from_secs(3600)).await, 0);
    assert_eq!(registry.len().await, 1);

    // A zero TTL reclaims everything already created
    assert_eq!(registry.sweep(Duration::ZERO).await, 1);
    assert_eq!(registry.len().await, 0);
}

#[tokio::test]
async fn test_sweep_unrepresentable_ttl_reclaims_nothing() {
    let root = tempfile::tempdir().unwrap();
    let registry = DeploymentRegistry::new();
    registry.register(make_record(root.path(), "app").await).await;

    // A TTL beyond chrono's range can never expire anything
    assert_eq!(registry.sweep(Duration::MAX).await, 0);
    assert_eq!(registry.len().await, 1);

    registry.teardown_all().await;
}
