//! Orchestrator backend abstraction.
//!
//! The adapter never talks to a cluster directly. Every remote call goes
//! through [`Executor`], so the facade can be driven by a real Kubernetes
//! client in production and by a recording fake in tests.

#[cfg(feature = "kubernetes")]
pub mod kubernetes;
#[cfg(any(test, feature = "test-utils"))]
pub mod recording;

#[cfg(feature = "kubernetes")]
pub use kubernetes::KubernetesExecutor;

use crate::error::BackendError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Pod, ReplicationController, Service as KubeService};
use std::collections::BTreeMap;
use std::fmt;

/// Equality-based label selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    terms: BTreeMap<String, String>,
}

impl Selector {
    /// Selector with a single `key=value` term
    pub fn one_term(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(key.into(), value.into());
        Self { terms }
    }

    /// Selector matching every object
    #[cfg(test)]
    pub fn everything() -> Self {
        Self::default()
    }

    /// Add a term
    #[cfg(test)]
    pub fn and(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.insert(key.into(), value.into());
        self
    }

    /// Whether a label set satisfies every term
    pub fn matches(&self, labels: Option<&BTreeMap<String, String>>) -> bool {
        self.terms.iter().all(|(key, value)| {
            labels
                .and_then(|labels| labels.get(key))
                .is_some_and(|actual| actual == value)
        })
    }

    /// Whether the selector has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.terms {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Capability required from the orchestrator backend
///
/// Implementations are scoped to a single namespace. Errors must be
/// classified into [`BackendError`] so that not-found and already-exists
/// conditions survive the trip to the caller.
#[async_trait]
pub trait Executor: Send + Sync {
    /// List all replication controllers
    async fn list_replication_controllers(
        &self,
    ) -> std::result::Result<Vec<ReplicationController>, BackendError>;

    /// Get a replication controller by name
    async fn get_replication_controller(
        &self,
        name: &str,
    ) -> std::result::Result<ReplicationController, BackendError>;

    /// Create a replication controller
    async fn create_replication_controller(
        &self,
        spec: &ReplicationController,
    ) -> std::result::Result<ReplicationController, BackendError>;

    /// Replace an existing replication controller
    async fn update_replication_controller(
        &self,
        rc: &ReplicationController,
    ) -> std::result::Result<ReplicationController, BackendError>;

    /// Delete a replication controller by name
    async fn delete_replication_controller(
        &self,
        name: &str,
    ) -> std::result::Result<(), BackendError>;

    /// List pods matching a label selector
    async fn list_pods(&self, selector: &Selector) -> std::result::Result<Vec<Pod>, BackendError>;

    /// Create a network service
    async fn create_service(
        &self,
        spec: &KubeService,
    ) -> std::result::Result<KubeService, BackendError>;

    /// List network services matching a label selector
    async fn list_services(
        &self,
        selector: &Selector,
    ) -> std::result::Result<Vec<KubeService>, BackendError>;

    /// Delete a network service by name
    async fn delete_service(&self, name: &str) -> std::result::Result<(), BackendError>;

    /// Cheap liveness probe against the cluster
    async fn is_healthy(&self) -> bool;
}
