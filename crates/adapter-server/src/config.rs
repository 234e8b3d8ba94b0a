//! Server configuration from command-line arguments and the environment.

use clap::Parser;
use deploy_adapter::AdapterConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Deploy adapter server arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "kube-deploy-adapter")]
#[command(about = "Deploys abstract container services onto Kubernetes")]
#[command(version)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8001")]
    pub listen_addr: SocketAddr,

    /// Kubernetes API server URL; inferred from kubeconfig or the cluster when unset
    #[arg(long, env = "KUBERNETES_MASTER")]
    pub kubernetes_master: Option<String>,

    /// Basic-auth username for the API server
    #[arg(long, env = "KUBERNETES_USERNAME")]
    pub kubernetes_username: Option<String>,

    /// Basic-auth password for the API server
    #[arg(long, env = "KUBERNETES_PASSWORD", hide_env_values = true)]
    pub kubernetes_password: Option<String>,

    /// Namespace to deploy into
    #[arg(long, env = "KUBERNETES_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Comma-separated externally reachable IPs for created services
    #[arg(long, env = "SERVICE_PUBLIC_IPS", value_delimiter = ',')]
    pub public_ips: Vec<String>,

    /// Version reported by the metadata endpoint
    #[arg(long, env = "ADAPTER_VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub adapter_version: String,

    /// Seconds to wait for a destroyed deployment's pods to terminate
    #[arg(long, env = "TEARDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub teardown_timeout_secs: u64,

    /// Milliseconds between pod checks while waiting for termination
    #[arg(long, env = "TEARDOWN_POLL_INTERVAL_MS", default_value_t = 500)]
    pub teardown_poll_interval_ms: u64,
}

impl ServerArgs {
    /// Adapter configuration derived from these arguments
    pub fn adapter_config(&self) -> AdapterConfig {
        let external_ips = self
            .public_ips
            .iter()
            .map(|ip| ip.trim())
            .filter(|ip| !ip.is_empty())
            .map(str::to_string)
            .collect();

        AdapterConfig {
            namespace: self.namespace.clone(),
            ..AdapterConfig::default()
        }
        .with_version(self.adapter_version.clone())
        .with_external_ips(external_ips)
        .with_teardown(
            Duration::from_secs(self.teardown_timeout_secs),
            Duration::from_millis(self.teardown_poll_interval_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ServerArgs::try_parse_from(["kube-deploy-adapter"]).unwrap();
        assert_eq!(args.listen_addr.port(), 8001);
        assert_eq!(args.namespace, "default");
        assert!(args.kubernetes_master.is_none());

        let config = args.adapter_config();
        assert!(config.external_ips.is_empty());
        assert_eq!(config.teardown_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_public_ips_are_split_and_trimmed() {
        let args = ServerArgs::try_parse_from([
            "kube-deploy-adapter",
            "--public-ips",
            "10.0.0.1, 10.0.0.2,",
            "--namespace",
            "panamax",
            "--teardown-timeout-secs",
            "0",
        ])
        .unwrap();

        let config = args.adapter_config();
        assert_eq!(
            config.external_ips,
            vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()]
        );
        assert_eq!(config.namespace, "panamax");
        assert!(config.teardown_timeout.is_zero());
    }
}
