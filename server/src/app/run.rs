//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::deploy::pipeline::PipelineOptions;
use crate::deploy::registry::DeploymentRegistry;
use crate::errors::SkiffError;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::workers::reaper;

/// Run the Skiff deployment server
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), SkiffError> {
    info!("Initializing Skiff deployment server...");

    // Create shutdown channel
    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), options.lifecycle.clone());

    // Initialize state and workers
    if let Err(e) = init(&options, shutdown_tx.clone(), &mut shutdown_manager).await {
        error!("Failed to start server: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    // Wait for shutdown
    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

async fn init(
    options: &AppOptions,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), SkiffError> {
    // Storage layout must exist before any workspace is allocated
    options.storage.setup().await?;

    let registry = Arc::new(DeploymentRegistry::new());
    shutdown_manager.with_registry(registry.clone())?;

    let pipeline = PipelineOptions::from_settings(
        &options.deploy,
        options.storage.workspaces_dir().path().to_path_buf(),
    );
    let server_state = Arc::new(ServerState::new(pipeline, registry.clone()));

    // HTTP server
    let mut server_shutdown_rx = shutdown_tx.subscribe();
    let server_handle = serve(&options.server, server_state, async move {
        let _ = server_shutdown_rx.recv().await;
    })
    .await?;
    shutdown_manager.with_server_handle(server_handle)?;

    // Reaper worker
    info!("Initializing reaper worker...");
    let reaper_options = options.reaper.clone();
    let mut reaper_shutdown_rx = shutdown_tx.subscribe();
    let reaper_handle = tokio::spawn(async move {
        reaper::run(
            &reaper_options,
            registry,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = reaper_shutdown_rx.recv().await;
            }),
        )
        .await;
    });
    shutdown_manager.with_reaper_handle(reaper_handle)?;

    Ok(())
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    lifecycle_options: LifecycleOptions,
    registry: Option<Arc<DeploymentRegistry>>,
    server_handle: Option<JoinHandle<Result<(), SkiffError>>>,
    reaper_handle: Option<JoinHandle<()>>,
}

impl ShutdownManager {
    pub fn new(shutdown_tx: broadcast::Sender<()>, lifecycle_options: LifecycleOptions) -> Self {
        Self {
            shutdown_tx,
            lifecycle_options,
            registry: None,
            server_handle: None,
            reaper_handle: None,
        }
    }

    pub fn with_registry(&mut self, registry: Arc<DeploymentRegistry>) -> Result<(), SkiffError> {
        if self.registry.is_some() {
            return Err(SkiffError::ShutdownError("registry already set".to_string()));
        }
        self.registry = Some(registry);
        Ok(())
    }

    pub fn with_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), SkiffError>>,
    ) -> Result<(), SkiffError> {
        if self.server_handle.is_some() {
            return Err(SkiffError::ShutdownError("server_handle already set".to_string()));
        }
        self.server_handle = Some(handle);
        Ok(())
    }

    pub fn with_reaper_handle(&mut self, handle: JoinHandle<()>) -> Result<(), SkiffError> {
        if self.reaper_handle.is_some() {
            return Err(SkiffError::ShutdownError("reaper_handle already set".to_string()));
        }
        self.reaper_handle = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), SkiffError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(
            self.lifecycle_options.max_shutdown_delay,
            self.shutdown_impl(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.lifecycle_options.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), SkiffError> {
        info!("Shutting down Skiff deployment server...");

        // 1. Reaper worker
        if let Some(handle) = self.reaper_handle.take() {
            handle.await.map_err(|e| SkiffError::ShutdownError(e.to_string()))?;
        }

        // 2. HTTP server
        if let Some(handle) = self.server_handle.take() {
            handle.await.map_err(|e| SkiffError::ShutdownError(e.to_string()))??;
        }

        // 3. Live deployments: kill serve processes, reclaim workspaces
        if let Some(registry) = self.registry.take() {
            registry.teardown_all().await;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
