//! Route handlers

use crate::error::{ApiError, Result};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use deploy_adapter::{KubernetesAdapter, Metadata, Service, ServiceDeployment};
use tracing::debug;

/// List all deployments
pub async fn list_services(
    State(adapter): State<KubernetesAdapter>,
) -> Result<Json<Vec<ServiceDeployment>>> {
    Ok(Json(adapter.get_services().await?))
}

/// Get a single deployment
pub async fn get_service(
    State(adapter): State<KubernetesAdapter>,
    Path(id): Path<String>,
) -> Result<Json<ServiceDeployment>> {
    Ok(Json(adapter.get_service(&id).await?))
}

/// Create a batch of services.
///
/// The body is decoded here rather than through the `Json` extractor so that
/// malformed input is reported like any other internal failure.
pub async fn create_services(
    State(adapter): State<KubernetesAdapter>,
    body: Bytes,
) -> Result<(StatusCode, Json<Vec<ServiceDeployment>>)> {
    let services: Vec<Service> = serde_json::from_slice(&body)?;
    debug!("Creating {} service(s)", services.len());

    let deployments = adapter.create_services(&services).await?;
    Ok((StatusCode::CREATED, Json(deployments)))
}

/// Updates are not supported
pub async fn update_service(Path(id): Path<String>) -> Result<StatusCode> {
    Err(ApiError::NotImplemented(format!(
        "updating service '{}' is not supported",
        id
    )))
}

/// Destroy a deployment
pub async fn destroy_service(
    State(adapter): State<KubernetesAdapter>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    adapter.destroy_service(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adapter metadata
pub async fn metadata(State(adapter): State<KubernetesAdapter>) -> Json<Metadata> {
    Json(adapter.get_metadata().await)
}
