//! Adapter configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`crate::KubernetesAdapter`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdapterConfig {
    /// Namespace all objects are created in
    pub namespace: String,
    /// Version reported by the metadata endpoint
    pub version: String,
    /// Externally reachable IPs attached to every created network service
    pub external_ips: Vec<String>,
    /// Upper bound on waiting for a destroyed workload's pods to disappear;
    /// zero skips the wait
    #[serde(with = "duration_secs")]
    pub teardown_timeout: Duration,
    /// Delay between pod listings while waiting for teardown
    #[serde(with = "duration_millis")]
    pub teardown_poll_interval: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            external_ips: Vec::new(),
            teardown_timeout: Duration::from_secs(10),
            teardown_poll_interval: Duration::from_millis(500),
        }
    }
}

impl AdapterConfig {
    /// Set the externally reachable IPs
    pub fn with_external_ips(mut self, external_ips: Vec<String>) -> Self {
        self.external_ips = external_ips;
        self
    }

    /// Set the teardown wait bounds
    pub fn with_teardown(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.teardown_timeout = timeout;
        self.teardown_poll_interval = poll_interval;
        self
    }

    /// Set the reported version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
