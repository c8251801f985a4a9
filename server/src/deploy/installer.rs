//! Dependency installation with a single fallback

use std::path::Path;

use tracing::{info, warn};

use crate::deploy::exec::{run_step, CommandExecution, CommandSpec};
use crate::errors::SkiffError;
use crate::transcript::Transcript;

/// Install project dependencies.
///
/// Runs the primary command; on any non-zero exit (tool missing, network
/// failure, or genuine dependency conflict, no distinction made) retries
/// exactly once with the secondary command, unchanged arguments. Both
/// attempts' output ends up in the transcript.
pub async fn install(
    workspace: &Path,
    primary: &CommandSpec,
    secondary: &CommandSpec,
    transcript: &mut Transcript,
) -> Result<CommandExecution, SkiffError> {
    transcript.step("\n> Installing dependencies...");

    info!("Installing dependencies: {}", primary.display());
    let first = run_step(primary, workspace, transcript).await?;
    if first.success() {
        return Ok(first);
    }

    warn!(
        "Primary install failed (exit {}), falling back to: {}",
        first.exit_code,
        secondary.display()
    );
    let second = run_step(secondary, workspace, transcript).await?;
    if second.success() {
        return Ok(second);
    }

    Err(SkiffError::DependencyInstallError(format!(
        "{} exited with code {}, {} exited with code {}",
        primary.display(),
        first.exit_code,
        secondary.display(),
        second.exit_code
    )))
}
