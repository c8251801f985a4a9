//! Server state

use std::sync::Arc;

use crate::deploy::pipeline::PipelineOptions;
use crate::deploy::registry::DeploymentRegistry;

/// Server state shared across handlers
pub struct ServerState {
    pub pipeline: PipelineOptions,
    pub registry: Arc<DeploymentRegistry>,
}

impl ServerState {
    pub fn new(pipeline: PipelineOptions, registry: Arc<DeploymentRegistry>) -> Self {
        Self { pipeline, registry }
    }
}
