//! Organisation handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, created, ok};
use crate::resources::organisations::{
    CreateOrganisationRequest, Organisation, OrganisationFilter, OrganisationRepository,
    UpdateOrganisationRequest,
};
use crate::resources::{PageParams, Paginated};
use crate::stats::StatusBreakdown;

/// Create an organisation
#[utoipa::path(
    post,
    path = "/api/v1/organisations",
    request_body = CreateOrganisationRequest,
    responses(
        (status = 201, description = "Organisation created", body = Organisation),
        (status = 400, description = "Validation failed")
    ),
    tag = "Organisations",
    security(("bearer_jwt" = []))
)]
pub async fn create_organisation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateOrganisationRequest>,
) -> ApiResult<Organisation> {
    req.validate()?;
    let org = OrganisationRepository::create(state.pool(), user.user_id, &req).await?;
    created(org)
}

/// List organisations with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/organisations",
    responses(
        (status = 200, description = "Page of organisations", body = Paginated<Organisation>)
    ),
    tag = "Organisations"
)]
pub async fn list_organisations(
    State(state): State<AppState>,
    Query(filter): Query<OrganisationFilter>,
    Query(page): Query<PageParams>,
) -> ApiResult<Paginated<Organisation>> {
    let page_result = OrganisationRepository::list(state.pool(), &filter, page).await?;
    ok(page_result)
}

/// Get an organisation by id
#[utoipa::path(
    get,
    path = "/api/v1/organisations/{id}",
    responses(
        (status = 200, description = "Organisation", body = Organisation),
        (status = 404, description = "Not found")
    ),
    tag = "Organisations"
)]
pub async fn get_organisation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Organisation> {
    let org = OrganisationRepository::get_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Organisation not found"))?;
    ok(org)
}

/// Partially update an organisation
#[utoipa::path(
    put,
    path = "/api/v1/organisations/{id}",
    request_body = UpdateOrganisationRequest,
    responses(
        (status = 200, description = "Updated organisation", body = Organisation),
        (status = 404, description = "Not found")
    ),
    tag = "Organisations",
    security(("bearer_jwt" = []))
)]
pub async fn update_organisation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrganisationRequest>,
) -> ApiResult<Organisation> {
    req.validate()?;
    let org = OrganisationRepository::update(state.pool(), id, &req).await?;
    ok(org)
}

/// Delete an organisation
#[utoipa::path(
    delete,
    path = "/api/v1/organisations/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Blocked by a referencing record")
    ),
    tag = "Organisations",
    security(("bearer_jwt" = []))
)]
pub async fn delete_organisation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    OrganisationRepository::delete(state.pool(), id).await?;
    ok(())
}

/// Toggle an organisation between ACTIVE and INACTIVE
#[utoipa::path(
    post,
    path = "/api/v1/organisations/{id}/toggle",
    responses(
        (status = 200, description = "Organisation with flipped status", body = Organisation),
        (status = 404, description = "Not found")
    ),
    tag = "Organisations",
    security(("bearer_jwt" = []))
)]
pub async fn toggle_organisation_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Organisation> {
    let organisation = OrganisationRepository::toggle_status(state.pool(), id).await?;
    ok(organisation)
}

/// Organisation counts per status
#[utoipa::path(
    get,
    path = "/api/v1/organisations/stats",
    responses(
        (status = 200, description = "Status breakdown", body = StatusBreakdown)
    ),
    tag = "Organisations"
)]
pub async fn organisation_stats(State(state): State<AppState>) -> ApiResult<StatusBreakdown> {
    let stats = OrganisationRepository::stats(state.pool()).await?;
    ok(stats)
}
