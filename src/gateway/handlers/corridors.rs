//! Corridor handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, created, ok};
use crate::resources::corridors::{
    Corridor, CorridorFilter, CorridorRepository, CreateCorridorRequest, UpdateCorridorRequest,
};
use crate::resources::{PageParams, Paginated};
use crate::stats::StatusBreakdown;

/// Create a corridor
#[utoipa::path(
    post,
    path = "/api/v1/corridors",
    request_body = CreateCorridorRequest,
    responses(
        (status = 201, description = "Corridor created", body = Corridor),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Referenced record missing or duplicate")
    ),
    tag = "Corridors",
    security(("bearer_jwt" = []))
)]
pub async fn create_corridor(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateCorridorRequest>,
) -> ApiResult<Corridor> {
    req.validate()?;
    let corridor = CorridorRepository::create(state.pool(), user.user_id, &req).await?;
    created(corridor)
}

/// List corridors with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/corridors",
    responses(
        (status = 200, description = "Page of corridors", body = Paginated<Corridor>)
    ),
    tag = "Corridors"
)]
pub async fn list_corridors(
    State(state): State<AppState>,
    Query(filter): Query<CorridorFilter>,
    Query(page): Query<PageParams>,
) -> ApiResult<Paginated<Corridor>> {
    let page_result = CorridorRepository::list(state.pool(), &filter, page).await?;
    ok(page_result)
}

/// Get a corridor by id
#[utoipa::path(
    get,
    path = "/api/v1/corridors/{id}",
    responses(
        (status = 200, description = "Corridor", body = Corridor),
        (status = 404, description = "Not found")
    ),
    tag = "Corridors"
)]
pub async fn get_corridor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Corridor> {
    let corridor = CorridorRepository::get_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Corridor not found"))?;
    ok(corridor)
}

/// Partially update a corridor
#[utoipa::path(
    put,
    path = "/api/v1/corridors/{id}",
    request_body = UpdateCorridorRequest,
    responses(
        (status = 200, description = "Updated corridor", body = Corridor),
        (status = 404, description = "Not found")
    ),
    tag = "Corridors",
    security(("bearer_jwt" = []))
)]
pub async fn update_corridor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCorridorRequest>,
) -> ApiResult<Corridor> {
    req.validate()?;
    let corridor = CorridorRepository::update(state.pool(), id, &req).await?;
    ok(corridor)
}

/// Delete a corridor
#[utoipa::path(
    delete,
    path = "/api/v1/corridors/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Blocked by a referencing record")
    ),
    tag = "Corridors",
    security(("bearer_jwt" = []))
)]
pub async fn delete_corridor(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    CorridorRepository::delete(state.pool(), id).await?;
    ok(())
}

/// Toggle a corridor between ACTIVE and INACTIVE
#[utoipa::path(
    post,
    path = "/api/v1/corridors/{id}/toggle",
    responses(
        (status = 200, description = "Corridor with flipped status", body = Corridor),
        (status = 404, description = "Not found")
    ),
    tag = "Corridors",
    security(("bearer_jwt" = []))
)]
pub async fn toggle_corridor_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Corridor> {
    let corridor = CorridorRepository::toggle_status(state.pool(), id).await?;
    ok(corridor)
}

/// Corridor counts per status
#[utoipa::path(
    get,
    path = "/api/v1/corridors/stats",
    responses(
        (status = 200, description = "Status breakdown", body = StatusBreakdown)
    ),
    tag = "Corridors"
)]
pub async fn corridor_stats(State(state): State<AppState>) -> ApiResult<StatusBreakdown> {
    let stats = CorridorRepository::stats(state.pool()).await?;
    ok(stats)
}
