//! HTTP boundary for the deploy adapter.
//!
//! Serves the deployment API under `/v1`, translating adapter errors into
//! standard HTTP status codes.

#![warn(missing_docs)]

mod config;
mod error;
mod handlers;
mod router;

pub use config::ServerArgs;
pub use error::{ApiError, ErrorResponse, sanitize_status_code};
pub use router::build_router;

use anyhow::Result;
use deploy_adapter::KubernetesAdapter;
use std::net::SocketAddr;
use tracing::info;

/// API version prefix
pub const API_VERSION: &str = "v1";

/// Serve the adapter until Ctrl-C
pub async fn serve(addr: SocketAddr, adapter: KubernetesAdapter) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(adapter))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
