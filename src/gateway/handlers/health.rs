//! Health check handler

use axum::extract::State;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, ok};

/// Health check response data
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
}

/// Health check endpoint
///
/// Pings PostgreSQL. No internal details leak into the response.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    if let Err(e) = state.db.health_check().await {
        tracing::error!(error = %e, "health check: PostgreSQL ping failed");
        return Err(ApiError::service_unavailable("unavailable"));
    }

    ok(HealthResponse {
        timestamp_ms: Utc::now().timestamp_millis(),
    })
}
