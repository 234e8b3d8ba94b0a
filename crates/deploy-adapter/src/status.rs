//! Deployment status aggregation.

use crate::{
    SERVICE_NAME_LABEL,
    error::Result,
    executors::{Executor, Selector},
};
use k8s_openapi::api::core::v1::{Pod, ReplicationController};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pod phase counted as running
const RUNNING_PHASE: &str = "Running";

/// Status of a deployed service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStatus {
    /// Fewer replicas exist than desired
    Pending,
    /// Replica count converged; `running` of `desired` pods report the running phase
    Running {
        /// Pods in the running phase
        running: usize,
        /// Desired replica count
        desired: i32,
    },
    /// More replicas exist than desired
    Unknown,
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Pending => f.write_str("pending"),
            DeploymentStatus::Running { running, desired } => {
                write!(f, "running {}/{}", running, desired)
            }
            DeploymentStatus::Unknown => f.write_str("unknown"),
        }
    }
}

/// Compute a status from replica counts and the workload's pods.
///
/// `pods` is only consulted when `actual == desired`.
pub fn status_from(desired: i32, actual: i32, pods: &[Pod]) -> DeploymentStatus {
    if actual < desired {
        DeploymentStatus::Pending
    } else if actual > desired {
        DeploymentStatus::Unknown
    } else {
        let running = pods
            .iter()
            .filter(|pod| {
                pod.status
                    .as_ref()
                    .and_then(|status| status.phase.as_deref())
                    == Some(RUNNING_PHASE)
            })
            .count();
        DeploymentStatus::Running { running, desired }
    }
}

/// Compute the live status of a replication controller.
///
/// Pods are listed only once the observed replica count matches the desired
/// one. A failed pod listing fails the whole call instead of reporting a
/// status built from partial data.
pub async fn status_of(
    executor: &dyn Executor,
    rc: &ReplicationController,
) -> Result<DeploymentStatus> {
    let desired = rc.spec.as_ref().and_then(|spec| spec.replicas).unwrap_or(1);
    let actual = rc.status.as_ref().map(|status| status.replicas).unwrap_or(0);

    if actual != desired {
        return Ok(status_from(desired, actual, &[]));
    }

    let name = rc.metadata.name.clone().unwrap_or_default();
    let pods = executor
        .list_pods(&Selector::one_term(SERVICE_NAME_LABEL, name))
        .await?;
    Ok(status_from(desired, actual, &pods))
}
