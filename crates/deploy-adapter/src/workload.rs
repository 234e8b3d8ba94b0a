//! Replication controller construction.

use crate::{
    APPLICATION_LABEL, APPLICATION_LABEL_VALUE, SERVICE_NAME_LABEL, model::Service,
    naming::sanitize_service_name,
};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, PodSpec, PodTemplateSpec, ReplicationController,
    ReplicationControllerSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Build the replication controller that realises one service.
///
/// The sanitized service name names the controller and its single
/// container, and labels the pod template under `service-name` next to the
/// shared application marker. A requested count of 0 is treated as
/// unspecified and becomes 1, as does a negative count.
pub fn replication_controller_from_service(service: &Service) -> ReplicationController {
    let safe_name = sanitize_service_name(&service.name);

    let ports = service
        .ports
        .iter()
        .map(|p| ContainerPort {
            container_port: i32::from(p.container_port),
            host_port: (p.host_port != 0).then(|| i32::from(p.host_port)),
            protocol: protocol_name(&p.protocol),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    let env = service
        .environment
        .iter()
        .map(|e| EnvVar {
            name: e.variable.clone(),
            value: Some(e.value.clone()),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    // An empty command must not reach the container as a single "" argument.
    let command = (!service.command.is_empty()).then(|| vec![service.command.clone()]);

    let replicas = service.deployment.count.max(1);

    let selector = BTreeMap::from([(SERVICE_NAME_LABEL.to_string(), safe_name.clone())]);
    let template_labels = BTreeMap::from([
        (SERVICE_NAME_LABEL.to_string(), safe_name.clone()),
        (APPLICATION_LABEL.to_string(), APPLICATION_LABEL_VALUE.to_string()),
    ]);

    ReplicationController {
        metadata: ObjectMeta {
            name: Some(safe_name.clone()),
            ..Default::default()
        },
        spec: Some(ReplicationControllerSpec {
            replicas: Some(replicas),
            selector: Some(selector),
            template: Some(PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(template_labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: safe_name,
                        image: Some(service.source.clone()),
                        command,
                        ports: (!ports.is_empty()).then_some(ports),
                        env: (!env.is_empty()).then_some(env),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Kubernetes protocol name for an API protocol string; TCP when unset
pub(crate) fn protocol_name(protocol: &str) -> Option<String> {
    if protocol.is_empty() {
        Some("TCP".to_string())
    } else {
        Some(protocol.to_ascii_uppercase())
    }
}
