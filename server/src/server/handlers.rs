//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::deploy::pipeline;
use crate::deploy::registry::DeploymentSummary;
use crate::errors::SkiffError;
use crate::models::deployment::DeployRequest;
use crate::server::state::ServerState;
use crate::utils::version_info;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "skiffd".to_string(),
        version: version.version,
    })
}

/// Version response
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Deploy handler
///
/// Validation failures return 400 before any workspace is created.
/// Pipeline failures return 500 with the transcript as the error body;
/// success returns the transcript, URL, framework, and registry id.
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<DeployRequest>,
) -> impl IntoResponse {
    let (repo_url, repo_name) = match request.validate() {
        Ok(fields) => fields,
        Err(e) => {
            let message = match &e {
                SkiffError::ValidationError(msg) => msg.clone(),
                other => other.to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message })));
        }
    };

    match pipeline::deploy(
        &repo_url,
        &repo_name,
        request.token(),
        &state.pipeline,
        state.registry.clone(),
    )
    .await
    {
        Ok(result) => (StatusCode::OK, Json(json!(result))),
        Err(failure) => {
            error!("Deployment of {} failed: {}", repo_name, failure.error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": failure.log })),
            )
        }
    }
}

/// Deployments list response
#[derive(Debug, Serialize)]
pub struct DeploymentsResponse {
    pub deployments: Vec<DeploymentSummary>,
    pub total: usize,
}

/// Deployments list handler
pub async fn deployments_handler(
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let deployments = state.registry.list().await;
    let total = deployments.len();
    Json(DeploymentsResponse { deployments, total })
}

/// Teardown handler: terminate the serve process and reclaim the
/// workspace of one deployment
pub async fn teardown_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.registry.teardown(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
