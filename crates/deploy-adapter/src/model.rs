//! Adapter API data model.
//!
//! These types mirror the JSON exchanged with the deployment API: abstract
//! service descriptions on the way in, deployment records and adapter
//! metadata on the way out.

use serde::{Deserialize, Serialize};

/// A service to deploy, described independently of any orchestrator
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Service {
    /// Free-form service name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Image reference
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// Start command; empty means the image default
    #[serde(skip_serializing_if = "String::is_empty")]
    pub command: String,
    /// Links to other services in the same batch
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    /// Port mappings
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    /// Ports exposed without a host mapping
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expose: Vec<u16>,
    /// Environment variables
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<Environment>,
    /// Host volume mounts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Containers to mount volumes from
    #[serde(rename = "volumes_from", skip_serializing_if = "Vec::is_empty")]
    pub volumes_from: Vec<VolumesFrom>,
    /// Deployment settings
    pub deployment: Deployment,
}

impl Service {
    /// Create a service with a name and image
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    /// Add a port mapping
    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    /// Add a link to another service
    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Add an environment variable
    pub fn with_env(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.push(Environment {
            variable: variable.into(),
            value: value.into(),
        });
        self
    }

    /// Set the start command
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Set the requested replica count
    pub fn with_count(mut self, count: i32) -> Self {
        self.deployment.count = count;
        self
    }
}

/// Replica settings for a service
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Deployment {
    /// Requested replica count; 0 or less means unspecified
    pub count: i32,
}

/// A named link to another service, optionally under an alias
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Link {
    /// Target service name
    pub name: String,
    /// Additional name the target's port is exposed under
    pub alias: String,
}

impl Link {
    /// Link to a service without an alias
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: String::new(),
        }
    }

    /// Link to a service under an alias
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }
}

/// A port mapping
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Port {
    /// Port on the host
    #[serde(skip_serializing_if = "is_zero")]
    pub host_port: u16,
    /// Port inside the container
    pub container_port: u16,
    /// Protocol name, e.g. `tcp`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub protocol: String,
}

impl Port {
    /// Map a host port to a container port over TCP
    pub fn tcp(host_port: u16, container_port: u16) -> Self {
        Self {
            host_port,
            container_port,
            protocol: "TCP".to_string(),
        }
    }
}

fn is_zero(port: &u16) -> bool {
    *port == 0
}

/// An environment variable
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Environment {
    /// Variable name
    pub variable: String,
    /// Variable value
    pub value: String,
}

/// A host directory mounted into the container
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Volume {
    /// Path on the host
    pub host_path: String,
    /// Path inside the container
    pub container_path: String,
}

/// A container whose volumes should be mounted
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VolumesFrom {
    /// Source container name
    pub name: String,
}

/// State of a deployed service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDeployment {
    /// Deployment identifier (the sanitized service name)
    pub id: String,
    /// Human-readable status, e.g. `running 1/2`
    pub actual_state: String,
}

/// Informational data about the adapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Adapter version
    pub version: String,
    /// Backend kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the backend answered a liveness probe
    pub is_healthy: bool,
}
