//! Error types for the Skiff deployment server

use thiserror::Error;

/// Main error type for the deployment server
#[derive(Error, Debug)]
pub enum SkiffError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Filesystem error: {0}")]
    FilesystemError(String),

    #[error("Failed to clone repository: {0}")]
    SourceAcquisitionError(String),

    #[error("No package.json found in the repository.")]
    ManifestMissing,

    #[error("Dependency installation failed: {0}")]
    DependencyInstallError(String),

    #[error("Build failed: {0}")]
    BuildError(String),

    #[error("Failed to launch application: {0}")]
    LaunchError(String),

    #[error("Application never became ready: {0}")]
    LaunchUnverified(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<anyhow::Error> for SkiffError {
    fn from(err: anyhow::Error) -> Self {
        SkiffError::ServerError(err.to_string())
    }
}
