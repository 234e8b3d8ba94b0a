//! Route table

use crate::API_VERSION;
use crate::handlers;
use axum::{Router, routing::get};
use deploy_adapter::KubernetesAdapter;
use tower_http::trace::TraceLayer;

/// Build the application router for an adapter
pub fn build_router(adapter: KubernetesAdapter) -> Router {
    let api = Router::new()
        .route(
            "/services",
            get(handlers::list_services).post(handlers::create_services),
        )
        .route(
            "/services/{id}",
            get(handlers::get_service)
                .put(handlers::update_service)
                .delete(handlers::destroy_service),
        )
        .route("/metadata", get(handlers::metadata))
        .with_state(adapter);

    Router::new()
        .nest(&format!("/{}", API_VERSION), api)
        .layer(TraceLayer::new_for_http())
}
