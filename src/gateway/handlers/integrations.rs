//! Integration handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, created, ok};
use crate::resources::integrations::{
    CreateIntegrationRequest, Integration, IntegrationFilter, IntegrationRepository,
    UpdateIntegrationRequest,
};
use crate::resources::{PageParams, Paginated};
use crate::stats::StatusBreakdown;

/// Create an integration
#[utoipa::path(
    post,
    path = "/api/v1/integrations",
    request_body = CreateIntegrationRequest,
    responses(
        (status = 201, description = "Integration created", body = Integration),
        (status = 400, description = "Validation failed")
    ),
    tag = "Integrations",
    security(("bearer_jwt" = []))
)]
pub async fn create_integration(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateIntegrationRequest>,
) -> ApiResult<Integration> {
    req.validate()?;
    let integration = IntegrationRepository::create(state.pool(), user.user_id, &req).await?;
    created(integration)
}

/// List integrations with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/integrations",
    responses(
        (status = 200, description = "Page of integrations", body = Paginated<Integration>)
    ),
    tag = "Integrations"
)]
pub async fn list_integrations(
    State(state): State<AppState>,
    Query(filter): Query<IntegrationFilter>,
    Query(page): Query<PageParams>,
) -> ApiResult<Paginated<Integration>> {
    let page_result = IntegrationRepository::list(state.pool(), &filter, page).await?;
    ok(page_result)
}

/// Get an integration by id
#[utoipa::path(
    get,
    path = "/api/v1/integrations/{id}",
    responses(
        (status = 200, description = "Integration", body = Integration),
        (status = 404, description = "Not found")
    ),
    tag = "Integrations"
)]
pub async fn get_integration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Integration> {
    let integration = IntegrationRepository::get_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Integration not found"))?;
    ok(integration)
}

/// Partially update an integration
#[utoipa::path(
    put,
    path = "/api/v1/integrations/{id}",
    request_body = UpdateIntegrationRequest,
    responses(
        (status = 200, description = "Updated integration", body = Integration),
        (status = 404, description = "Not found")
    ),
    tag = "Integrations",
    security(("bearer_jwt" = []))
)]
pub async fn update_integration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateIntegrationRequest>,
) -> ApiResult<Integration> {
    req.validate()?;
    let integration = IntegrationRepository::update(state.pool(), id, &req).await?;
    ok(integration)
}

/// Delete an integration
#[utoipa::path(
    delete,
    path = "/api/v1/integrations/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    ),
    tag = "Integrations",
    security(("bearer_jwt" = []))
)]
pub async fn delete_integration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    IntegrationRepository::delete(state.pool(), id).await?;
    ok(())
}

/// Toggle an integration between ACTIVE and INACTIVE
#[utoipa::path(
    post,
    path = "/api/v1/integrations/{id}/toggle",
    responses(
        (status = 200, description = "Integration with flipped status", body = Integration),
        (status = 404, description = "Not found")
    ),
    tag = "Integrations",
    security(("bearer_jwt" = []))
)]
pub async fn toggle_integration_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Integration> {
    let integration = IntegrationRepository::toggle_status(state.pool(), id).await?;
    ok(integration)
}

/// Integration counts per status
#[utoipa::path(
    get,
    path = "/api/v1/integrations/stats",
    responses(
        (status = 200, description = "Status breakdown", body = StatusBreakdown)
    ),
    tag = "Integrations"
)]
pub async fn integration_stats(State(state): State<AppState>) -> ApiResult<StatusBreakdown> {
    let stats = IntegrationRepository::stats(state.pool()).await?;
    ok(stats)
}
