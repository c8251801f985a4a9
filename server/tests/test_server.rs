//! HTTP API tests

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use skiffd::deploy::pipeline::PipelineOptions;
use skiffd::deploy::registry::DeploymentRegistry;
use skiffd::deploy::runner::LaunchOptions;
use skiffd::server::serve::router;
use skiffd::server::state::ServerState;
use tower::ServiceExt;

fn test_router(workspace_root: std::path::PathBuf) -> axum::Router {
    let pipeline = PipelineOptions {
        workspace_root,
        embed_credentials: false,
        install_primary: vec!["true".to_string()],
        install_secondary: vec!["true".to_string()],
        launch: LaunchOptions::default(),
    };
    let state = Arc::new(ServerState::new(
        pipeline,
        Arc::new(DeploymentRegistry::new()),
    ));
    router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let root = tempfile::tempdir().unwrap();
    let app = test_router(root.path().join("workspaces"));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "skiffd");
}

#[tokio::test]
async fn test_deploy_missing_fields() {
    let root = tempfile::tempdir().unwrap();
    let workspace_root = root.path().join("workspaces");
    let app = test_router(workspace_root.clone());

    let request = Request::post("/deploy")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"repoUrl": "https://github.com/org/repo"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing repoUrl or repoName");
    // Validation fails before any side effect: no workspace was created
    assert!(!workspace_root.exists());
}

#[tokio::test]
async fn test_deploy_empty_fields() {
    let root = tempfile::tempdir().unwrap();
    let app = test_router(root.path().join("workspaces"));

    let request = Request::post("/deploy")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"repoUrl": "", "repoName": ""}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deployments_empty() {
    let root = tempfile::tempdir().unwrap();
    let app = test_router(root.path().join("workspaces"));

    let response = app
        .oneshot(Request::get("/deployments").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_teardown_unknown_deployment() {
    let root = tempfile::tempdir().unwrap();
    let app = test_router(root.path().join("workspaces"));

    let response = app
        .oneshot(
            Request::delete("/deployments/no-such-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
