//! Network service resolution for a batch of services.
//!
//! Validation is batch-scoped: aliases and link targets can only be checked
//! against every service being created together. All checks run before any
//! remote call so a rejected batch leaves the cluster untouched.

use crate::{
    APPLICATION_LABEL, APPLICATION_LABEL_VALUE, SERVICE_NAME_LABEL,
    error::{Error, Result},
    model::{Port, Service},
    naming::sanitize_service_name,
    workload::protocol_name,
};
use k8s_openapi::api::core::v1::{Service as KubeService, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::{BTreeMap, HashMap, HashSet, hash_map::Entry};
use tracing::debug;

/// Message for batches that map more than one port on a service
///
/// A Kubernetes service per port would need a unique name per port, which
/// breaks the Docker-style link environment the API promises.
pub const MULTIPLE_PORTS_ERROR: &str =
    "multiple ports from a single container is not currently supported";

/// Build the Kubernetes services a batch needs.
///
/// Checks, in order: no service maps more than one port (Conflict); no
/// sanitized alias names two different targets or shadows another service's
/// network name (Validation); no two services share a sanitized name
/// (Validation). Then emits one service per service that maps a port, keyed
/// by its sanitized name, followed by one per distinct sanitized alias,
/// carrying the target's first port. Links without an alias produce nothing.
pub fn kube_services_from_services(
    services: &[Service],
    external_ips: &[String],
) -> Result<Vec<KubeService>> {
    validate_services_ports(services)?;
    validate_services_aliases(services)?;
    validate_services_names(services)?;

    let services_by_name: HashMap<&str, &Service> =
        services.iter().map(|s| (s.name.as_str(), s)).collect();
    let mut kube_services = Vec::new();
    let mut emitted = HashSet::new();

    for service in services {
        let Some(port) = service.ports.first() else {
            continue;
        };
        let name = sanitize_service_name(&service.name);
        kube_services.push(kube_service_by_name_and_port(&name, port, external_ips));
        emitted.insert(name);
    }

    for service in services {
        for link in service.links.iter().filter(|l| !l.alias.is_empty()) {
            let Some(target) = services_by_name.get(link.name.as_str()) else {
                return Err(Error::Validation(format!(
                    "linking to non-existent service '{}'",
                    link.name
                )));
            };

            let Some(port) = target.ports.first() else {
                return Err(Error::Validation(format!(
                    "linked-to service '{}' exposes no ports",
                    link.name
                )));
            };

            let name = sanitize_service_name(&link.alias);
            if emitted.contains(&name) {
                continue;
            }
            debug!("Exposing {} under alias {}", link.name, link.alias);
            kube_services.push(kube_service_by_name_and_port(&name, port, external_ips));
            emitted.insert(name);
        }
    }

    Ok(kube_services)
}

fn validate_services_ports(services: &[Service]) -> Result<()> {
    if services.iter().any(|s| s.ports.len() > 1) {
        return Err(Error::Conflict(MULTIPLE_PORTS_ERROR.to_string()));
    }
    Ok(())
}

/// Aliases are compared by the network name they produce. A name already
/// taken by a port-exposing service may only be reused as an alias for that
/// same service.
fn validate_services_aliases(services: &[Service]) -> Result<()> {
    let mut claimed: HashMap<String, &str> = services
        .iter()
        .filter(|s| !s.ports.is_empty())
        .map(|s| (sanitize_service_name(&s.name), s.name.as_str()))
        .collect();

    for link in services.iter().flat_map(|s| &s.links) {
        if link.alias.is_empty() {
            continue;
        }
        match claimed.entry(sanitize_service_name(&link.alias)) {
            Entry::Occupied(entry) if *entry.get() != link.name => {
                return Err(Error::Validation(format!(
                    "multiple services with the same alias name '{}'",
                    link.alias
                )));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(entry) => {
                entry.insert(&link.name);
            }
        }
    }

    Ok(())
}

fn validate_services_names(services: &[Service]) -> Result<()> {
    let mut names = HashSet::new();
    for service in services {
        if !names.insert(sanitize_service_name(&service.name)) {
            return Err(Error::Validation(format!(
                "multiple services with the same name '{}'",
                service.name
            )));
        }
    }
    Ok(())
}

fn kube_service_by_name_and_port(name: &str, port: &Port, external_ips: &[String]) -> KubeService {
    let service_port = if port.host_port == 0 {
        port.container_port
    } else {
        port.host_port
    };

    KubeService {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([(
                SERVICE_NAME_LABEL.to_string(),
                name.to_string(),
            )])),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            // Services created together share a network namespace and there is
            // no per-batch application name to scope on, so every adapter pod
            // is selected. Routing relies on the service name.
            selector: Some(BTreeMap::from([(
                APPLICATION_LABEL.to_string(),
                APPLICATION_LABEL_VALUE.to_string(),
            )])),
            ports: Some(vec![ServicePort {
                port: i32::from(service_port),
                target_port: Some(IntOrString::Int(i32::from(port.container_port))),
                protocol: protocol_name(&port.protocol),
                ..Default::default()
            }]),
            external_ips: (!external_ips.is_empty()).then(|| external_ips.to_vec()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Link;

    fn port(host: u16, container: u16) -> Port {
        Port::tcp(host, container)
    }

    fn spec_of(service: &KubeService) -> &ServiceSpec {
        service.spec.as_ref().unwrap()
    }

    #[test]
    fn test_service_per_exposed_port() {
        let services = vec![
            Service::new("Web App", "nginx").with_port(port(8080, 80)),
            Service::new("worker", "busybox"),
        ];

        let kube_services = kube_services_from_services(&services, &[]).unwrap();
        assert_eq!(kube_services.len(), 1);

        let ks = &kube_services[0];
        assert_eq!(ks.metadata.name.as_deref(), Some("web-app"));
        assert_eq!(
            ks.metadata.labels.as_ref().unwrap().get("service-name").map(String::as_str),
            Some("web-app")
        );

        let spec = spec_of(ks);
        assert_eq!(
            spec.selector.as_ref().unwrap().get("panamax").map(String::as_str),
            Some("panamax")
        );
        let ports = spec.ports.as_ref().unwrap();
        assert_eq!(ports[0].port, 8080);
        assert_eq!(ports[0].target_port, Some(IntOrString::Int(80)));
        assert_eq!(ports[0].protocol.as_deref(), Some("TCP"));
        assert!(spec.external_ips.is_none());
    }

    #[test]
    fn test_alias_services_use_target_port() {
        let services = vec![
            Service::new("wp", "wordpress").with_link(Link::aliased("memcached", "cache")),
            Service::new("memcached", "memcached").with_port(port(11211, 11211)),
        ];

        let kube_services = kube_services_from_services(&services, &[]).unwrap();
        let names: Vec<_> = kube_services
            .iter()
            .map(|s| s.metadata.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["memcached", "cache"]);
        for ks in &kube_services {
            assert_eq!(spec_of(ks).ports.as_ref().unwrap()[0].port, 11211);
        }

        let services = vec![
            Service::new("wp", "wordpress").with_link(Link::aliased("DB Server", "DB_1")),
            Service::new("DB Server", "mysql").with_port(port(3306, 3306)),
        ];
        let kube_services = kube_services_from_services(&services, &[]).unwrap();
        assert_eq!(kube_services.len(), 2);
        assert_eq!(kube_services[0].metadata.name.as_deref(), Some("db-server"));
        assert_eq!(kube_services[1].metadata.name.as_deref(), Some("db-1"));
        assert_eq!(spec_of(&kube_services[1]).ports.as_ref().unwrap()[0].port, 3306);
    }

    #[test]
    fn test_unaliased_links_produce_nothing() {
        let services = vec![
            Service::new("wp", "wordpress").with_link(Link::new("db")),
            Service::new("db", "mysql"),
        ];
        assert!(kube_services_from_services(&services, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_multiple_ports_rejected() {
        let services = vec![
            Service::new("web", "nginx")
                .with_port(port(80, 80))
                .with_port(port(443, 443)),
        ];
        let err = kube_services_from_services(&services, &[]).unwrap_err();
        assert_eq!(err, Error::Conflict(MULTIPLE_PORTS_ERROR.to_string()));
        assert!(err.message().contains("multiple ports"));
    }

    #[test]
    fn test_conflicting_alias_rejected() {
        let services = vec![
            Service::new("a", "img").with_link(Link::aliased("b", "X")),
            Service::new("b", "img").with_port(port(1, 1)),
            Service::new("c", "img")
                .with_port(port(2, 2))
                .with_link(Link::aliased("a", "X")),
        ];
        let err = kube_services_from_services(&services, &[]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.message().contains("'X'"));
    }

    #[test]
    fn test_repeated_alias_to_same_target_allowed() {
        let services = vec![
            Service::new("a", "img").with_link(Link::aliased("db", "X")),
            Service::new("b", "img").with_link(Link::aliased("db", "X")),
            Service::new("db", "img").with_port(port(5432, 5432)),
        ];
        let kube_services = kube_services_from_services(&services, &[]).unwrap();
        let names: Vec<_> = kube_services
            .iter()
            .map(|s| s.metadata.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["db", "x"]);
    }

    #[test]
    fn test_aliases_compared_after_sanitizing() {
        let services = vec![
            Service::new("a", "img").with_link(Link::aliased("db", "DB_1")),
            Service::new("b", "img").with_link(Link::aliased("cache", "db-1")),
            Service::new("db", "img").with_port(port(5432, 5432)),
            Service::new("cache", "img").with_port(port(11211, 11211)),
        ];
        let err = kube_services_from_services(&services, &[]).unwrap_err();
        assert_eq!(
            err,
            Error::Validation("multiple services with the same alias name 'db-1'".to_string())
        );
    }

    #[test]
    fn test_alias_shadowing_another_service_rejected() {
        let services = vec![
            Service::new("wp", "wordpress").with_link(Link::aliased("mysql", "Cache")),
            Service::new("mysql", "mysql").with_port(port(3306, 3306)),
            Service::new("cache", "memcached").with_port(port(11211, 11211)),
        ];
        let err = kube_services_from_services(&services, &[]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_alias_matching_target_name_emitted_once() {
        let services = vec![
            Service::new("wp", "wordpress").with_link(Link::aliased("DB", "db")),
            Service::new("DB", "mysql").with_port(port(3306, 3306)),
        ];
        let kube_services = kube_services_from_services(&services, &[]).unwrap();
        assert_eq!(kube_services.len(), 1);
        assert_eq!(kube_services[0].metadata.name.as_deref(), Some("db"));
    }

    #[test]
    fn test_duplicate_sanitized_service_names_rejected() {
        let services = vec![
            Service::new("Web App", "nginx"),
            Service::new("web_app", "nginx"),
        ];
        let err = kube_services_from_services(&services, &[]).unwrap_err();
        assert_eq!(
            err,
            Error::Validation("multiple services with the same name 'web_app'".to_string())
        );
    }

    #[test]
    fn test_port_check_precedes_alias_check() {
        let services = vec![
            Service::new("a", "img").with_link(Link::aliased("b", "X")),
            Service::new("c", "img").with_link(Link::aliased("d", "X")),
            Service::new("e", "img")
                .with_port(port(1, 1))
                .with_port(port(2, 2)),
        ];
        let err = kube_services_from_services(&services, &[]).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_dangling_link_rejected() {
        let services = vec![Service::new("wp", "wordpress").with_link(Link::aliased("db", "DB"))];
        let err = kube_services_from_services(&services, &[]).unwrap_err();
        assert_eq!(
            err,
            Error::Validation("linking to non-existent service 'db'".to_string())
        );
    }

    #[test]
    fn test_link_to_portless_service_rejected() {
        let services = vec![
            Service::new("wp", "wordpress").with_link(Link::aliased("db", "DB")),
            Service::new("db", "mysql"),
        ];
        let err = kube_services_from_services(&services, &[]).unwrap_err();
        assert_eq!(
            err,
            Error::Validation("linked-to service 'db' exposes no ports".to_string())
        );
    }

    #[test]
    fn test_external_ips_attached() {
        let services = vec![Service::new("web", "nginx").with_port(port(80, 80))];
        let ips = vec!["10.0.0.1".to_string()];
        let kube_services = kube_services_from_services(&services, &ips).unwrap();
        assert_eq!(spec_of(&kube_services[0]).external_ips, Some(ips));
    }

    #[test]
    fn test_container_port_used_without_host_port() {
        let services = vec![Service::new("web", "nginx").with_port(port(0, 8080))];
        let kube_services = kube_services_from_services(&services, &[]).unwrap();
        let ports = spec_of(&kube_services[0]).ports.as_ref().unwrap();
        assert_eq!(ports[0].port, 8080);
        assert_eq!(ports[0].target_port, Some(IntOrString::Int(8080)));
    }
}
