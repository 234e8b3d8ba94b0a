//! Create and destroy sequencing.
//!
//! Each step depends on the side effects of the one before it, so calls are
//! issued strictly in order and the first failure stops the sequence. Batch
//! creation is not atomic: objects created before a failure stay in the
//! cluster and callers must destroy them by name before retrying.

use crate::{
    SERVICE_NAME_LABEL,
    config::AdapterConfig,
    error::{BackendError, Error, Result},
    executors::{Executor, Selector},
    model::{Service, ServiceDeployment},
    network::kube_services_from_services,
    runtime,
    status::status_of,
    workload::replication_controller_from_service,
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Create every service in a batch.
///
/// The whole batch is validated first; a rejected batch issues no remote
/// call. Network services are created next, then one replication controller
/// per service in input order. Records are returned only when every service
/// in the batch was created.
pub async fn create_deployments(
    executor: &dyn Executor,
    services: &[Service],
    config: &AdapterConfig,
) -> Result<Vec<ServiceDeployment>> {
    info!("Creating {} services", services.len());

    let kube_services = kube_services_from_services(services, &config.external_ips)?;

    for kube_service in &kube_services {
        debug!("Creating network service: {:?}", kube_service.metadata.name);
        executor.create_service(kube_service).await?;
    }

    let mut deployments = Vec::with_capacity(services.len());
    for service in services {
        let spec = replication_controller_from_service(service);
        let rc = executor
            .create_replication_controller(&spec)
            .await
            .map_err(|err| match err {
                BackendError::AlreadyExists(msg) => Error::Conflict(msg),
                other => Error::from(other),
            })?;

        let id = rc.metadata.name.clone().unwrap_or_default();
        let status = status_of(executor, &rc).await?;
        info!("Created replication controller {} ({})", id, status);

        deployments.push(ServiceDeployment {
            id,
            actual_state: status.to_string(),
        });
    }

    Ok(deployments)
}

/// Destroy one deployment and the network services labelled for it.
///
/// Network services go first, then the controller is scaled to zero and
/// deleted. Finally waits, bounded by the configured timeout, for the
/// controller's pods to disappear.
pub async fn destroy_deployment(
    executor: &dyn Executor,
    id: &str,
    config: &AdapterConfig,
) -> Result<()> {
    info!("Destroying deployment: {}", id);

    let mut rc = executor.get_replication_controller(id).await?;
    let name = rc.metadata.name.clone().unwrap_or_else(|| id.to_string());
    let selector = Selector::one_term(SERVICE_NAME_LABEL, name.clone());

    let kube_services = executor.list_services(&selector).await?;
    for kube_service in &kube_services {
        let Some(service_name) = kube_service.metadata.name.as_deref() else {
            continue;
        };
        debug!("Deleting network service: {}", service_name);
        executor.delete_service(service_name).await?;
    }

    debug!("Scaling {} to zero replicas", name);
    rc.spec.get_or_insert_with(Default::default).replicas = Some(0);
    executor.update_replication_controller(&rc).await?;

    executor.delete_replication_controller(&name).await?;

    wait_for_teardown(executor, &selector, config).await;

    info!("Destroyed deployment: {}", name);
    Ok(())
}

/// Poll until no pod matches `selector` or the teardown timeout elapses.
///
/// The objects are already deleted when this runs, so neither expiry nor a
/// failed listing is reported as an error.
async fn wait_for_teardown(executor: &dyn Executor, selector: &Selector, config: &AdapterConfig) {
    if config.teardown_timeout.is_zero() {
        return;
    }

    let deadline = Instant::now() + config.teardown_timeout;
    loop {
        match executor.list_pods(selector).await {
            Ok(pods) if pods.is_empty() => return,
            Ok(pods) => debug!("Waiting for {} pods of {} to terminate", pods.len(), selector),
            Err(e) => {
                warn!("Failed to list pods while waiting for teardown: {}", e);
                return;
            }
        }

        if Instant::now() >= deadline {
            warn!(
                "Pods matching {} still present after {:?}",
                selector, config.teardown_timeout
            );
            return;
        }
        runtime::sleep(config.teardown_poll_interval).await;
    }
}
