//! Deployment registry
//!
//! Every successful deployment is registered with its workspace path and
//! serve-process handle, so workspaces and processes can be reclaimed by
//! an explicit teardown or the TTL sweep instead of leaking for the
//! lifetime of the host.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::process::Child;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::deploy::manifest::Framework;
use crate::errors::SkiffError;
use crate::filesys::dir::Dir;
use crate::utils::generate_uuid;

/// One live deployment: record plus owned process handle
#[derive(Debug)]
pub struct DeploymentRecord {
    pub id: String,
    pub repo_name: String,
    pub framework: Framework,
    pub url: String,
    pub workspace: PathBuf,
    pub created_at: DateTime<Utc>,
    child: Child,
}

impl DeploymentRecord {
    pub fn new(
        repo_name: String,
        framework: Framework,
        url: String,
        workspace: PathBuf,
        child: Child,
    ) -> Self {
        Self {
            id: generate_uuid(),
            repo_name,
            framework,
            url,
            workspace,
            created_at: Utc::now(),
            child,
        }
    }

    fn summary(&self) -> DeploymentSummary {
        DeploymentSummary {
            id: self.id.clone(),
            repo_name: self.repo_name.clone(),
            framework: self.framework,
            url: self.url.clone(),
            created_at: self.created_at,
        }
    }
}

/// Wire representation of a registered deployment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSummary {
    pub id: String,
    pub repo_name: String,
    pub framework: Framework,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Registry of live deployments
#[derive(Default)]
pub struct DeploymentRegistry {
    inner: RwLock<HashMap<String, DeploymentRecord>>,
}

impl DeploymentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a deployment, returning its id
    pub async fn register(&self, record: DeploymentRecord) -> String {
        let id = record.id.clone();
        info!("Registered deployment {} ({})", id, record.repo_name);
        self.inner.write().await.insert(id.clone(), record);
        id
    }

    /// List all registered deployments
    pub async fn list(&self) -> Vec<DeploymentSummary> {
        self.inner.read().await.values().map(|r| r.summary()).collect()
    }

    /// Number of registered deployments
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Tear down one deployment: terminate its serve process and remove
    /// its workspace directory
    pub async fn teardown(&self, id: &str) -> Result<(), SkiffError> {
        let record = self
            .inner
            .write()
            .await
            .remove(id)
            .ok_or_else(|| SkiffError::NotFound(format!("deployment {}", id)))?;
        reclaim(record).await;
        Ok(())
    }

    /// Remove all deployments older than the TTL, returning how many
    /// were reclaimed
    pub async fn sweep(&self, ttl: Duration) -> usize {
        // A TTL beyond chrono's range can never expire anything
        let Some(cutoff) = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_sub_signed(ttl))
        else {
            return 0;
        };

        let expired: Vec<DeploymentRecord> = {
            let mut inner = self.inner.write().await;
            let ids: Vec<String> = inner
                .values()
                .filter(|r| r.created_at < cutoff)
                .map(|r| r.id.clone())
                .collect();
            ids.iter().filter_map(|id| inner.remove(id)).collect()
        };

        let count = expired.len();
        for record in expired {
            info!("Reaping expired deployment {} ({})", record.id, record.repo_name);
            reclaim(record).await;
        }
        count
    }

    /// Tear down every deployment, used at shutdown
    pub async fn teardown_all(&self) {
        let records: Vec<DeploymentRecord> = {
            let mut inner = self.inner.write().await;
            inner.drain().map(|(_, r)| r).collect()
        };
        for record in records {
            reclaim(record).await;
        }
    }
}

async fn reclaim(mut record: DeploymentRecord) {
    if let Err(e) = record.child.kill().await {
        warn!("Failed to kill serve process for {}: {}", record.id, e);
    }
    if let Err(e) = Dir::new(&record.workspace).delete().await {
        warn!(
            "Failed to remove workspace {}: {}",
            record.workspace.display(),
            e
        );
    }
}
