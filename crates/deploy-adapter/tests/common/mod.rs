//! Shared fixtures for adapter tests

#![allow(dead_code)]

use deploy_adapter::{AdapterConfig, KubernetesAdapter, RecordingExecutor};
use k8s_openapi::api::core::v1::{
    Pod, PodStatus, ReplicationController, ReplicationControllerSpec,
    ReplicationControllerStatus, Service as KubeService,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Config that never waits on teardown
pub fn test_config() -> AdapterConfig {
    AdapterConfig::default()
        .with_version("0.1-test")
        .with_teardown(Duration::ZERO, Duration::from_millis(1))
}

/// Adapter over a shared recording executor
pub fn adapter_with(executor: RecordingExecutor) -> (KubernetesAdapter, Arc<RecordingExecutor>) {
    adapter_with_config(executor, test_config())
}

/// Adapter over a shared recording executor with a custom config
pub fn adapter_with_config(
    executor: RecordingExecutor,
    config: AdapterConfig,
) -> (KubernetesAdapter, Arc<RecordingExecutor>) {
    let executor = Arc::new(executor);
    let adapter = KubernetesAdapter::new(executor.clone(), config);
    (adapter, executor)
}

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Replication controller with desired and observed replica counts
pub fn replication_controller(name: &str, desired: i32, actual: i32) -> ReplicationController {
    ReplicationController {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(ReplicationControllerSpec {
            replicas: Some(desired),
            selector: Some(labels(&[("service-name", name)])),
            ..Default::default()
        }),
        status: Some(ReplicationControllerStatus {
            replicas: actual,
            ..Default::default()
        }),
    }
}

/// Pod belonging to a workload, in the given phase
pub fn pod(workload: &str, phase: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            labels: Some(labels(&[("service-name", workload), ("panamax", "panamax")])),
            ..Default::default()
        },
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Network service labelled for a workload
pub fn kube_service(name: &str, workload: &str) -> KubeService {
    KubeService {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels(&[("service-name", workload)])),
            ..Default::default()
        },
        ..Default::default()
    }
}
