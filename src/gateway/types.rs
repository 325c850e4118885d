//! API response envelope and error mapping
//!
//! Every response follows the same structure:
//! - success: true/false
//! - message: short human-readable description
//! - data: payload (success only)
//! - error: failure detail (failure only)

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::account::DirectoryError;
use crate::engine::TransferError;
use crate::float::FloatError;
use crate::ledger::LedgerError;
use crate::resources::ResourceError;

/// Unified API response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// true on success, false on failure
    #[schema(example = true)]
    pub success: bool,
    /// Short message description
    #[schema(example = "ok")]
    pub message: String,
    /// Response data (only present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Failure detail (only present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: "ok".to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> ApiResponse<()> {
        let message = message.into();
        ApiResponse {
            success: false,
            message: message.clone(),
            data: None,
            error: Some(message),
        }
    }
}

/// Handler result: status + enveloped payload, or a mapped error
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 OK with the enveloped payload
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 Created with the enveloped payload
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

/// An error ready to leave the gateway: HTTP status plus client-safe message.
/// Internal detail stays in the logs.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }

    fn db_error(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "database error");
        Self::internal("Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::db_error(e)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<ResourceError> for ApiError {
    fn from(e: ResourceError) -> Self {
        match e {
            ResourceError::Database(e) => ApiError::db_error(e),
            ResourceError::NotFound => ApiError::not_found("Resource not found"),
            ResourceError::Conflict(msg) => ApiError::conflict(msg),
        }
    }
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Database(e) => ApiError::db_error(e),
            TransferError::Ledger(e) => e.into(),
            TransferError::AccountNotFound(r) => {
                ApiError::not_found(format!("Account not found: {}", r))
            }
            TransferError::CurrencyMismatch(r) => {
                ApiError::bad_request(format!("Currency mismatch on account {}", r))
            }
            TransferError::InsufficientFunds(r) => {
                ApiError::conflict(format!("Insufficient funds on account {}", r))
            }
            e @ (TransferError::InvalidAmount
            | TransferError::NoAccounts
            | TransferError::SameAccount) => ApiError::bad_request(e.to_string()),
            e @ TransferError::FloatLimitExceeded { .. } => ApiError::conflict(e.to_string()),
        }
    }
}

impl From<FloatError> for ApiError {
    fn from(e: FloatError) -> Self {
        match e {
            FloatError::Database(e) => ApiError::db_error(e),
            FloatError::Transfer(e) => e.into(),
            FloatError::Ledger(e) => e.into(),
            FloatError::BalanceNotFound(id) => {
                ApiError::not_found(format!("Float balance not found: {}", id))
            }
            e @ FloatError::FloatLineNotFound { .. } => ApiError::not_found(e.to_string()),
            e @ FloatError::NegativeLimit => ApiError::bad_request(e.to_string()),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Database(e) => ApiError::db_error(e),
            LedgerError::Corrupt(detail) => {
                tracing::error!(detail, "corrupt ledger row");
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Database(e) => ApiError::db_error(e),
            DirectoryError::NotFound(r) => {
                ApiError::not_found(format!("Account not found: {}", r))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountRef;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_transfer_error_status_mapping() {
        let r = AccountRef::vault(Uuid::new_v4());
        assert_eq!(
            ApiError::from(TransferError::AccountNotFound(r)).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(TransferError::CurrencyMismatch(r)).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(TransferError::InsufficientFunds(r)).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(TransferError::InvalidAmount).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(TransferError::FloatLimitExceeded { limit: dec!(100) }).status,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_resource_error_status_mapping() {
        assert_eq!(
            ApiError::from(ResourceError::NotFound).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ResourceError::Conflict("dup".into())).status,
            StatusCode::CONFLICT
        );
    }
}
