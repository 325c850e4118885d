//! Charge handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, created, ok};
use crate::resources::charges::{
    Charge, ChargeFilter, ChargeRepository, CreateChargeRequest, UpdateChargeRequest,
};
use crate::resources::{PageParams, Paginated};
use crate::stats::StatusBreakdown;

/// Create a charge
#[utoipa::path(
    post,
    path = "/api/v1/charges",
    request_body = CreateChargeRequest,
    responses(
        (status = 201, description = "Charge created", body = Charge),
        (status = 400, description = "Validation failed")
    ),
    tag = "Charges",
    security(("bearer_jwt" = []))
)]
pub async fn create_charge(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateChargeRequest>,
) -> ApiResult<Charge> {
    req.validate()?;
    let charge = ChargeRepository::create(state.pool(), user.user_id, &req).await?;
    created(charge)
}

/// List charges with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/charges",
    responses(
        (status = 200, description = "Page of charges", body = Paginated<Charge>)
    ),
    tag = "Charges"
)]
pub async fn list_charges(
    State(state): State<AppState>,
    Query(filter): Query<ChargeFilter>,
    Query(page): Query<PageParams>,
) -> ApiResult<Paginated<Charge>> {
    let page_result = ChargeRepository::list(state.pool(), &filter, page).await?;
    ok(page_result)
}

/// Get a charge by id
#[utoipa::path(
    get,
    path = "/api/v1/charges/{id}",
    responses(
        (status = 200, description = "Charge", body = Charge),
        (status = 404, description = "Not found")
    ),
    tag = "Charges"
)]
pub async fn get_charge(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Charge> {
    let charge = ChargeRepository::get_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Charge not found"))?;
    ok(charge)
}

/// Partially update a charge
#[utoipa::path(
    put,
    path = "/api/v1/charges/{id}",
    request_body = UpdateChargeRequest,
    responses(
        (status = 200, description = "Updated charge", body = Charge),
        (status = 404, description = "Not found")
    ),
    tag = "Charges",
    security(("bearer_jwt" = []))
)]
pub async fn update_charge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateChargeRequest>,
) -> ApiResult<Charge> {
    req.validate()?;
    let charge = ChargeRepository::update(state.pool(), id, &req).await?;
    ok(charge)
}

/// Delete a charge
#[utoipa::path(
    delete,
    path = "/api/v1/charges/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    ),
    tag = "Charges",
    security(("bearer_jwt" = []))
)]
pub async fn delete_charge(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    ChargeRepository::delete(state.pool(), id).await?;
    ok(())
}

/// Toggle a charge between ACTIVE and INACTIVE
#[utoipa::path(
    post,
    path = "/api/v1/charges/{id}/toggle",
    responses(
        (status = 200, description = "Charge with flipped status", body = Charge),
        (status = 404, description = "Not found")
    ),
    tag = "Charges",
    security(("bearer_jwt" = []))
)]
pub async fn toggle_charge_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Charge> {
    let charge = ChargeRepository::toggle_status(state.pool(), id).await?;
    ok(charge)
}

/// Charge counts per status
#[utoipa::path(
    get,
    path = "/api/v1/charges/stats",
    responses(
        (status = 200, description = "Status breakdown", body = StatusBreakdown)
    ),
    tag = "Charges"
)]
pub async fn charge_stats(State(state): State<AppState>) -> ApiResult<StatusBreakdown> {
    let stats = ChargeRepository::stats(state.pool()).await?;
    ok(stats)
}
