use std::sync::Arc;

use axum::routing::{get, put};
use axum::{Extension, Json, Router};

use super::{handlers, openapi};
use crate::domain::service::NuagesService;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::openapi())
}

/// All nuages routes plus `/health` and `/openapi.json`.
pub fn router(service: Arc<NuagesService>) -> Router {
    Router::new()
        .route(
            "/nuages",
            get(handlers::list_nuages).post(handlers::create_nuage),
        )
        .route(
            "/nuages/{id}",
            get(handlers::get_nuage)
                .put(handlers::update_nuage)
                .delete(handlers::delete_nuage),
        )
        .route("/nuages/{id}/start", put(handlers::start_nuage))
        .route("/nuages/{id}/stop", put(handlers::stop_nuage))
        .route("/nuages/{id}/restart", put(handlers::restart_nuage))
        .route("/nuages/{id}/shutdown", put(handlers::shutdown_nuage))
        .route("/nuages/{id}/status", get(handlers::nuage_status))
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(openapi_json))
        .layer(Extension(service))
}
