//! `OpenAPI` document for the nuages HTTP surface.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nuages Management API",
        version = "0.1.0",
        description = "Create, inspect and drive containers placed on a Proxmox cluster."
    ),
    paths(
        super::handlers::create_nuage,
        super::handlers::list_nuages,
        super::handlers::get_nuage,
        super::handlers::update_nuage,
        super::handlers::delete_nuage,
        super::handlers::start_nuage,
        super::handlers::stop_nuage,
        super::handlers::restart_nuage,
        super::handlers::shutdown_nuage,
        super::handlers::nuage_status,
        super::handlers::health,
    ),
    components(schemas(
        super::dto::NuageDto,
        super::dto::NuageStatusDto,
        super::dto::CreateNuageRequest,
        super::dto::UpdateNuageRequest,
        super::dto::HealthDto,
        super::error::Problem,
        super::error::ValidationViolation,
    )),
    tags(
        (name = "Nuages", description = "Container records"),
        (name = "Lifecycle", description = "Power transitions and live status"),
        (name = "Health", description = "Liveness probe"),
    )
)]
pub struct NuagesApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    NuagesApiDoc::openapi()
}
