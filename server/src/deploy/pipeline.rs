//! End-to-end deployment pipeline
//!
//! Strictly linear per request: provision, acquire, inspect, install,
//! build, launch, verify. Every step appends to the request's transcript;
//! a failing step aborts the pipeline and the transcript collected so far
//! travels with the error. Side effects of completed steps are not rolled
//! back; reclamation happens through the registry.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::deploy::exec::CommandSpec;
use crate::deploy::git;
use crate::deploy::installer;
use crate::deploy::manifest;
use crate::deploy::profiles::profile_for;
use crate::deploy::registry::{DeploymentRecord, DeploymentRegistry};
use crate::deploy::runner::{build_and_launch, LaunchOptions};
use crate::deploy::workspace;
use crate::errors::SkiffError;
use crate::models::deployment::DeploymentResult;
use crate::storage::settings::DeploySettings;
use crate::transcript::Transcript;
use crate::utils::CooldownOptions;

/// Pipeline configuration, fixed for the lifetime of the server
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Root directory for per-deployment workspaces
    pub workspace_root: PathBuf,

    /// Use the legacy URL-embedded credential transport
    pub embed_credentials: bool,

    /// Primary install command (argv)
    pub install_primary: Vec<String>,

    /// Fallback install command (argv)
    pub install_secondary: Vec<String>,

    /// Launch and readiness configuration
    pub launch: LaunchOptions,
}

impl PipelineOptions {
    /// Build pipeline options from settings
    pub fn from_settings(settings: &DeploySettings, workspace_root: PathBuf) -> Self {
        Self {
            workspace_root,
            embed_credentials: settings.embed_credentials,
            install_primary: settings.install_primary.clone(),
            install_secondary: settings.install_secondary.clone(),
            launch: LaunchOptions {
                port: settings.serve_port,
                readiness_attempts: settings.readiness_attempts,
                cooldown: CooldownOptions {
                    base_delay: std::time::Duration::from_millis(
                        settings.readiness_base_delay_ms,
                    ),
                    ..Default::default()
                },
            },
        }
    }
}

/// A pipeline failure carrying the transcript collected so far
#[derive(Debug)]
pub struct PipelineFailure {
    pub error: SkiffError,
    pub log: String,
}

/// Run the full pipeline for one validated request
pub async fn deploy(
    repo_url: &str,
    repo_name: &str,
    access_token: Option<&str>,
    options: &PipelineOptions,
    registry: Arc<DeploymentRegistry>,
) -> Result<DeploymentResult, PipelineFailure> {
    let mut transcript = Transcript::new();

    match run_steps(
        repo_url,
        repo_name,
        access_token,
        options,
        registry,
        &mut transcript,
    )
    .await
    {
        Ok((url, framework, deployment_id)) => Ok(DeploymentResult {
            success: true,
            log: transcript.into_string(),
            url,
            framework,
            deployment_id,
        }),
        Err(error) => {
            transcript.error(&error.to_string());
            Err(PipelineFailure {
                error,
                log: transcript.into_string(),
            })
        }
    }
}

async fn run_steps(
    repo_url: &str,
    repo_name: &str,
    access_token: Option<&str>,
    options: &PipelineOptions,
    registry: Arc<DeploymentRegistry>,
    transcript: &mut Transcript,
) -> Result<(String, manifest::Framework, String), SkiffError> {
    info!("Deploying {} ({})", repo_name, repo_url);

    // 1. Provision workspace
    let workspace = workspace::allocate(&options.workspace_root, repo_name).await?;

    // 2. Clone repository
    git::acquire(
        repo_url,
        access_token,
        options.embed_credentials,
        workspace.path(),
        transcript,
    )
    .await?;

    // 3. Inspect manifest
    transcript.step("\n> Reading package.json...");
    let manifest = manifest::inspect(workspace.path()).await?;
    let framework = manifest.detect_framework();
    transcript.line(&format!("Detected framework: {}", framework));
    info!("Detected framework: {}", framework);

    // 4. Install dependencies
    let primary = CommandSpec::from_argv(&options.install_primary)?;
    let secondary = CommandSpec::from_argv(&options.install_secondary)?;
    installer::install(workspace.path(), &primary, &secondary, transcript).await?;

    // 5. Build and launch
    let profile = profile_for(framework);
    let launched = build_and_launch(profile, &manifest, &workspace, &options.launch, transcript).await?;

    transcript.step(&format!(
        "\n> Success! Your repo is being served at {}",
        launched.url
    ));

    // 6. Register for later teardown
    let url = launched.url.clone();
    let record = DeploymentRecord::new(
        repo_name.to_string(),
        framework,
        launched.url,
        workspace.into_path(),
        launched.child,
    );
    let deployment_id = registry.register(record).await;

    Ok((url, framework, deployment_id))
}
