use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use super::context::RequestContext;
use super::dto::{CreateNuageRequest, HealthDto, NuageDto, NuageStatusDto, UpdateNuageRequest};
use super::error::{Problem, domain_error_to_problem};
use crate::domain::error::DomainError;
use crate::domain::service::NuagesService;

type ApiResult<T> = Result<T, Problem>;

fn parse_id(raw: &str, ctx: &RequestContext) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        ctx.decorate(Problem::bad_request(format!("'{raw}' is not a valid nuage id")))
    })
}

fn body<T>(payload: Result<Json<T>, JsonRejection>, ctx: &RequestContext) -> ApiResult<T> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ctx.decorate(Problem::bad_request(e.body_text())))
}

fn problem(ctx: &RequestContext) -> impl Fn(DomainError) -> Problem + '_ {
    move |e| ctx.decorate(domain_error_to_problem(&e, ctx.path()))
}

/// Create a nuage on a randomly selected online node.
#[utoipa::path(
    post,
    path = "/nuages",
    tag = "Nuages",
    request_body = CreateNuageRequest,
    responses(
        (status = 201, description = "Nuage created", body = NuageDto),
        (status = 400, description = "Malformed body", body = Problem),
        (status = 409, description = "Name already taken", body = Problem),
        (status = 422, description = "Invalid fields", body = Problem),
        (status = 502, description = "Cluster unavailable", body = Problem),
    )
)]
pub async fn create_nuage(
    Extension(svc): Extension<Arc<NuagesService>>,
    ctx: RequestContext,
    payload: Result<Json<CreateNuageRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let new = body(payload, &ctx)?
        .validate()
        .map_err(|v| ctx.decorate(Problem::invalid_fields(&v)))?;
    let nuage = svc.create(new).await.map_err(problem(&ctx))?;
    Ok((StatusCode::CREATED, Json(NuageDto::from(nuage))))
}

/// List every nuage record.
#[utoipa::path(
    get,
    path = "/nuages",
    tag = "Nuages",
    responses((status = 200, description = "All nuages", body = [NuageDto]))
)]
pub async fn list_nuages(
    Extension(svc): Extension<Arc<NuagesService>>,
    ctx: RequestContext,
) -> ApiResult<Json<Vec<NuageDto>>> {
    let nuages = svc.list().await.map_err(problem(&ctx))?;
    Ok(Json(nuages.into_iter().map(NuageDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/nuages/{id}",
    tag = "Nuages",
    params(("id" = Uuid, Path, description = "Nuage id")),
    responses(
        (status = 200, description = "Nuage found", body = NuageDto),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 404, description = "Unknown nuage", body = Problem),
    )
)]
pub async fn get_nuage(
    Extension(svc): Extension<Arc<NuagesService>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<Json<NuageDto>> {
    let id = parse_id(&id, &ctx)?;
    let nuage = svc.get(id).await.map_err(problem(&ctx))?;
    Ok(Json(nuage.into()))
}

/// Replace the recorded resources. The running container is not resized.
#[utoipa::path(
    put,
    path = "/nuages/{id}",
    tag = "Nuages",
    params(("id" = Uuid, Path, description = "Nuage id")),
    request_body = UpdateNuageRequest,
    responses(
        (status = 200, description = "Nuage updated", body = NuageDto),
        (status = 404, description = "Unknown nuage", body = Problem),
        (status = 422, description = "Invalid fields", body = Problem),
    )
)]
pub async fn update_nuage(
    Extension(svc): Extension<Arc<NuagesService>>,
    ctx: RequestContext,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNuageRequest>, JsonRejection>,
) -> ApiResult<Json<NuageDto>> {
    let id = parse_id(&id, &ctx)?;
    let update = body(payload, &ctx)?
        .validate()
        .map_err(|v| ctx.decorate(Problem::invalid_fields(&v)))?;
    let nuage = svc.update(id, update).await.map_err(problem(&ctx))?;
    Ok(Json(nuage.into()))
}

#[utoipa::path(
    delete,
    path = "/nuages/{id}",
    tag = "Nuages",
    params(("id" = Uuid, Path, description = "Nuage id")),
    responses(
        (status = 204, description = "Nuage deleted"),
        (status = 404, description = "Unknown nuage", body = Problem),
        (status = 502, description = "Cluster refused; record kept", body = Problem),
    )
)]
pub async fn delete_nuage(
    Extension(svc): Extension<Arc<NuagesService>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, &ctx)?;
    svc.delete(id).await.map_err(problem(&ctx))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/nuages/{id}/start",
    tag = "Lifecycle",
    params(("id" = Uuid, Path, description = "Nuage id")),
    responses(
        (status = 200, description = "Start accepted", body = NuageDto),
        (status = 404, description = "Unknown nuage", body = Problem),
        (status = 502, description = "Cluster unavailable", body = Problem),
    )
)]
pub async fn start_nuage(
    Extension(svc): Extension<Arc<NuagesService>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<Json<NuageDto>> {
    let id = parse_id(&id, &ctx)?;
    Ok(Json(svc.start(id).await.map_err(problem(&ctx))?.into()))
}

#[utoipa::path(
    put,
    path = "/nuages/{id}/stop",
    tag = "Lifecycle",
    params(("id" = Uuid, Path, description = "Nuage id")),
    responses(
        (status = 200, description = "Stop accepted", body = NuageDto),
        (status = 404, description = "Unknown nuage", body = Problem),
        (status = 502, description = "Cluster unavailable", body = Problem),
    )
)]
pub async fn stop_nuage(
    Extension(svc): Extension<Arc<NuagesService>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<Json<NuageDto>> {
    let id = parse_id(&id, &ctx)?;
    Ok(Json(svc.stop(id).await.map_err(problem(&ctx))?.into()))
}

/// Reboot the container.
#[utoipa::path(
    put,
    path = "/nuages/{id}/restart",
    tag = "Lifecycle",
    params(("id" = Uuid, Path, description = "Nuage id")),
    responses(
        (status = 200, description = "Reboot accepted", body = NuageDto),
        (status = 404, description = "Unknown nuage", body = Problem),
        (status = 502, description = "Cluster unavailable", body = Problem),
    )
)]
pub async fn restart_nuage(
    Extension(svc): Extension<Arc<NuagesService>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<Json<NuageDto>> {
    let id = parse_id(&id, &ctx)?;
    Ok(Json(svc.reboot(id).await.map_err(problem(&ctx))?.into()))
}

#[utoipa::path(
    put,
    path = "/nuages/{id}/shutdown",
    tag = "Lifecycle",
    params(("id" = Uuid, Path, description = "Nuage id")),
    responses(
        (status = 200, description = "Shutdown accepted", body = NuageDto),
        (status = 404, description = "Unknown nuage", body = Problem),
        (status = 502, description = "Cluster unavailable", body = Problem),
    )
)]
pub async fn shutdown_nuage(
    Extension(svc): Extension<Arc<NuagesService>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<Json<NuageDto>> {
    let id = parse_id(&id, &ctx)?;
    Ok(Json(svc.shutdown(id).await.map_err(problem(&ctx))?.into()))
}

/// Live phase and utilisation, read from the cluster on every call.
#[utoipa::path(
    get,
    path = "/nuages/{id}/status",
    tag = "Lifecycle",
    params(("id" = Uuid, Path, description = "Nuage id")),
    responses(
        (status = 200, description = "Current status", body = NuageStatusDto),
        (status = 404, description = "Unknown nuage", body = Problem),
        (status = 502, description = "Cluster unavailable", body = Problem),
    )
)]
pub async fn nuage_status(
    Extension(svc): Extension<Arc<NuagesService>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<Json<NuageStatusDto>> {
    let id = parse_id(&id, &ctx)?;
    Ok(Json(svc.status(id).await.map_err(problem(&ctx))?.into()))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthDto))
)]
pub async fn health() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_owned(),
    })
}
