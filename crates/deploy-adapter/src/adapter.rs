//! Adapter facade.
//!
//! [`KubernetesAdapter`] implements the deployment API's operations on top of
//! an injected [`Executor`]. It holds no state of its own: every record is
//! computed from live cluster objects on each call.

use crate::{
    config::AdapterConfig,
    error::Result,
    executors::Executor,
    lifecycle,
    model::{Metadata, Service, ServiceDeployment},
    status::status_of,
};
use k8s_openapi::api::core::v1::ReplicationController;
use std::sync::Arc;
use tracing::{debug, info};

/// Backend kind reported by the metadata endpoint
pub const ADAPTER_TYPE: &str = "Kubernetes";

/// Deployment API backed by Kubernetes
#[derive(Clone)]
pub struct KubernetesAdapter {
    executor: Arc<dyn Executor>,
    config: AdapterConfig,
}

impl KubernetesAdapter {
    /// Create an adapter over the given backend
    pub fn new(executor: Arc<dyn Executor>, config: AdapterConfig) -> Self {
        info!(
            "Initializing KubernetesAdapter (namespace: {}, version: {})",
            config.namespace, config.version
        );
        Self { executor, config }
    }

    /// Adapter configuration
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// List every deployment
    pub async fn get_services(&self) -> Result<Vec<ServiceDeployment>> {
        let rcs = self.executor.list_replication_controllers().await?;
        debug!("Found {} replication controllers", rcs.len());

        let mut deployments = Vec::with_capacity(rcs.len());
        for rc in &rcs {
            deployments.push(self.deployment_from(rc).await?);
        }
        Ok(deployments)
    }

    /// Get one deployment by id
    pub async fn get_service(&self, id: &str) -> Result<ServiceDeployment> {
        let rc = self.executor.get_replication_controller(id).await?;
        self.deployment_from(&rc).await
    }

    /// Create a batch of services
    pub async fn create_services(&self, services: &[Service]) -> Result<Vec<ServiceDeployment>> {
        lifecycle::create_deployments(self.executor.as_ref(), services, &self.config).await
    }

    /// Destroy one deployment
    pub async fn destroy_service(&self, id: &str) -> Result<()> {
        lifecycle::destroy_deployment(self.executor.as_ref(), id, &self.config).await
    }

    /// Adapter metadata, including a live health check
    pub async fn get_metadata(&self) -> Metadata {
        Metadata {
            version: self.config.version.clone(),
            kind: ADAPTER_TYPE.to_string(),
            is_healthy: self.executor.is_healthy().await,
        }
    }

    async fn deployment_from(&self, rc: &ReplicationController) -> Result<ServiceDeployment> {
        let status = status_of(self.executor.as_ref(), rc).await?;
        Ok(ServiceDeployment {
            id: rc.metadata.name.clone().unwrap_or_default(),
            actual_state: status.to_string(),
        })
    }
}
