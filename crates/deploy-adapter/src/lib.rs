//! # Deploy Adapter
//!
//! Realises abstract container service descriptions on Kubernetes.
//!
//! Callers hand the adapter a batch of [`Service`] descriptions (image, command,
//! ports, environment, replica count and named links). The adapter turns each
//! one into a replication controller, exposes ports and link aliases through
//! Kubernetes services, and reports deployment status back from live cluster
//! state. Nothing is cached: the cluster is the only source of truth.
//!
//! All cluster access goes through the [`Executor`] trait, injected into the
//! [`KubernetesAdapter`] at construction time.
//!
//! ## Example
//!
//! ```rust,no_run
//! use deploy_adapter::{AdapterConfig, KubernetesAdapter, KubernetesExecutor, Service};
//! use std::sync::Arc;
//!
//! # async fn example() -> deploy_adapter::Result<()> {
//! let config = AdapterConfig::default();
//! let executor = KubernetesExecutor::infer(&config.namespace).await?;
//! let adapter = KubernetesAdapter::new(Arc::new(executor), config);
//!
//! let service = Service {
//!     name: "My Web".to_string(),
//!     source: "nginx:latest".to_string(),
//!     ..Default::default()
//! };
//!
//! let deployments = adapter.create_services(&[service]).await?;
//! assert_eq!(deployments[0].id, "my-web");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]

mod adapter;
mod config;
mod error;
mod executors;
mod lifecycle;
mod model;
mod naming;
mod network;
mod runtime;
mod status;
mod workload;

pub use adapter::{ADAPTER_TYPE, KubernetesAdapter};
pub use config::AdapterConfig;
pub use error::{BackendError, Error, ErrorKind, Result};
pub use executors::{Executor, Selector};
pub use lifecycle::{create_deployments, destroy_deployment};
pub use model::{
    Deployment, Environment, Link, Metadata, Port, Service, ServiceDeployment, Volume,
    VolumesFrom,
};
pub use naming::sanitize_service_name;
pub use network::{MULTIPLE_PORTS_ERROR, kube_services_from_services};
pub use status::{DeploymentStatus, status_from, status_of};
pub use workload::replication_controller_from_service;

#[cfg(feature = "kubernetes")]
pub use executors::KubernetesExecutor;

#[cfg(any(test, feature = "test-utils"))]
pub use executors::recording::{ExecutorCall, InjectedErrors, RecordingExecutor};

/// Label key joining a workload to its pods and network objects
pub const SERVICE_NAME_LABEL: &str = "service-name";

/// Label shared by every pod the adapter creates; network objects select on it
pub const APPLICATION_LABEL: &str = "panamax";

/// Value of [`APPLICATION_LABEL`]
pub const APPLICATION_LABEL_VALUE: &str = "panamax";
