//! Deployment reaper worker
//!
//! Periodically sweeps the registry, killing serve processes and
//! removing workspaces for deployments past their time-to-live.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::deploy::registry::DeploymentRegistry;

/// Reaper worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Sweep interval
    pub interval: Duration,

    /// Deployment time-to-live
    pub ttl: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Run the reaper worker
pub async fn run<S, F>(
    options: &Options,
    registry: Arc<DeploymentRegistry>,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!(
        "Reaper worker starting (interval: {:?}, ttl: {:?})...",
        options.interval, options.ttl
    );

    loop {
        // Check for shutdown
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Reaper worker shutting down...");
                return;
            }
            _ = sleep_fn(options.interval) => {
                // Continue with sweep
            }
        }

        debug!("Sweeping expired deployments...");
        let reclaimed = registry.sweep(options.ttl).await;
        if reclaimed > 0 {
            info!("Reaped {} expired deployment(s)", reclaimed);
        }
    }
}
