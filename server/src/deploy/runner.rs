//! Build and launch orchestration

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::deploy::exec::{run_step, CommandSpec};
use crate::deploy::fsm::{LaunchEvent, LaunchFsm};
use crate::deploy::manifest::PackageManifest;
use crate::deploy::profiles::FrameworkProfile;
use crate::deploy::workspace::Workspace;
use crate::errors::SkiffError;
use crate::transcript::Transcript;
use crate::utils::{calc_exp_backoff, CooldownOptions};

/// Launch configuration for one deployment
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Port the serve command binds
    pub port: u16,

    /// Readiness probes before giving up
    pub readiness_attempts: u32,

    /// Backoff between probes
    pub cooldown: CooldownOptions,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            port: 5000,
            readiness_attempts: 10,
            cooldown: CooldownOptions::default(),
        }
    }
}

/// A launched, readiness-verified serve process
pub struct LaunchedApp {
    /// Child handle, retained so the registry can terminate it later
    pub child: Child,

    /// Reachable URL of the running application
    pub url: String,
}

/// Run the framework's build step (if any), launch its serve command,
/// and verify the service is reachable before reporting success.
///
/// A non-zero build exit aborts before any spawn. The spawned process
/// is killed again if the readiness probes are exhausted; success is
/// only reported once the service answered a probe.
pub async fn build_and_launch(
    profile: &FrameworkProfile,
    manifest: &PackageManifest,
    workspace: &Workspace,
    options: &LaunchOptions,
    transcript: &mut Transcript,
) -> Result<LaunchedApp, SkiffError> {
    let mut fsm = LaunchFsm::new();

    // Build step, synchronous and fully awaited
    if let Some(build_spec) = profile.build_spec() {
        transcript.step(profile.build_headline.unwrap_or("\n> Building app..."));
        fsm.process(LaunchEvent::BuildStarted)
            .map_err(SkiffError::ServerError)?;

        info!("Building {} app: {}", profile.framework, build_spec.display());
        let execution = run_step(&build_spec, workspace.path(), transcript).await?;
        if !execution.success() {
            let reason = format!("{} exited with code {}", build_spec.display(), execution.exit_code);
            fsm.process(LaunchEvent::BuildFailed(reason.clone()))
                .map_err(SkiffError::ServerError)?;
            return Err(SkiffError::BuildError(reason));
        }
        fsm.process(LaunchEvent::BuildSucceeded)
            .map_err(SkiffError::ServerError)?;
    } else {
        fsm.process(LaunchEvent::LaunchStarted)
            .map_err(SkiffError::ServerError)?;
    }

    // Launch the serve command with discarded standard streams
    let serve_spec = profile.serve_spec(manifest, options.port);
    transcript.step(&profile.serve_headline_for(options.port));
    info!("Launching {} app: {}", profile.framework, serve_spec.display());

    let mut child = match spawn_serve(&serve_spec, workspace) {
        Ok(child) => child,
        Err(e) => {
            fsm.process(LaunchEvent::SpawnFailed(e.to_string()))
                .map_err(SkiffError::ServerError)?;
            return Err(SkiffError::LaunchError(e.to_string()));
        }
    };
    fsm.process(LaunchEvent::Spawned)
        .map_err(SkiffError::ServerError)?;

    // Verify readiness before reporting success
    let url = profile.url(options.port);
    transcript.step("\n> Waiting for the app to become ready...");
    match poll_ready(&url, options.readiness_attempts, &options.cooldown, &mut child).await {
        Ok(()) => {
            fsm.process(LaunchEvent::Confirmed)
                .map_err(SkiffError::ServerError)?;
            info!("Application ready at {}", url);
            Ok(LaunchedApp { child, url })
        }
        Err(reason) => {
            warn!("Readiness verification failed: {}", reason);
            if let Err(e) = child.kill().await {
                warn!("Failed to kill unverified serve process: {}", e);
            }
            fsm.process(LaunchEvent::ProbesExhausted(reason.clone()))
                .map_err(SkiffError::ServerError)?;
            Err(SkiffError::LaunchUnverified(reason))
        }
    }
}

fn spawn_serve(spec: &CommandSpec, workspace: &Workspace) -> std::io::Result<Child> {
    Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(workspace.path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

/// Poll the URL until it answers, the process dies, or attempts run out
pub async fn poll_ready(
    url: &str,
    attempts: u32,
    cooldown: &CooldownOptions,
    child: &mut Child,
) -> Result<(), String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .map_err(|e| e.to_string())?;

    for attempt in 0..attempts {
        // A dead serve process will never answer
        if let Ok(Some(status)) = child.try_wait() {
            return Err(format!(
                "serve process exited with code {} before becoming ready",
                status.code().unwrap_or(-1)
            ));
        }

        // Any HTTP response counts as reachable
        match client.get(url).send().await {
            Ok(response) => {
                debug!("Readiness probe answered: {} {}", url, response.status());
                return Ok(());
            }
            Err(e) => {
                debug!("Readiness probe {} failed: {}", attempt + 1, e);
            }
        }

        // No backoff after the last probe
        if attempt + 1 == attempts {
            break;
        }
        tokio::time::sleep(calc_exp_backoff(cooldown, attempt)).await;
    }

    Err(format!("no response from {} after {} probes", url, attempts))
}
