//! Deploy adapter server binary

use adapter_server::ServerArgs;
use anyhow::Result;
use clap::Parser;
use deploy_adapter::{KubernetesAdapter, KubernetesExecutor};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();
    let config = args.adapter_config();

    let executor = match &args.kubernetes_master {
        Some(endpoint) => {
            KubernetesExecutor::connect(
                endpoint,
                args.kubernetes_username.clone(),
                args.kubernetes_password.clone(),
                &config.namespace,
            )
            .await?
        }
        None => KubernetesExecutor::infer(&config.namespace).await?,
    };

    info!(
        "Deploying into namespace '{}' (adapter version {})",
        config.namespace, config.version
    );

    let adapter = KubernetesAdapter::new(Arc::new(executor), config);
    adapter_server::serve(args.listen_addr, adapter).await
}
