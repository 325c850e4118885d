//! Bank account handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, created, ok};
use crate::resources::bank_accounts::{
    BankAccount, BankAccountFilter, BankAccountRepository, CreateBankAccountRequest,
    UpdateBankAccountRequest,
};
use crate::resources::{PageParams, Paginated};
use crate::stats::StatusBreakdown;

/// Create a bank account, optionally seeded with an opening balance
#[utoipa::path(
    post,
    path = "/api/v1/bank-accounts",
    request_body = CreateBankAccountRequest,
    responses(
        (status = 201, description = "Bank account created", body = BankAccount),
        (status = 400, description = "Validation failed")
    ),
    tag = "Bank Accounts",
    security(("bearer_jwt" = []))
)]
pub async fn create_bank_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<CreateBankAccountRequest>,
) -> ApiResult<BankAccount> {
    req.validate()?;
    let account = BankAccountRepository::create(state.pool(), user.user_id, &req).await?;
    created(account)
}

/// List bank accounts with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/bank-accounts",
    responses(
        (status = 200, description = "Page of bank accounts", body = Paginated<BankAccount>)
    ),
    tag = "Bank Accounts"
)]
pub async fn list_bank_accounts(
    State(state): State<AppState>,
    Query(filter): Query<BankAccountFilter>,
    Query(page): Query<PageParams>,
) -> ApiResult<Paginated<BankAccount>> {
    let page_result = BankAccountRepository::list(state.pool(), &filter, page).await?;
    ok(page_result)
}

/// Get a bank account by id
#[utoipa::path(
    get,
    path = "/api/v1/bank-accounts/{id}",
    responses(
        (status = 200, description = "Bank account", body = BankAccount),
        (status = 404, description = "Not found")
    ),
    tag = "Bank Accounts"
)]
pub async fn get_bank_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<BankAccount> {
    let account = BankAccountRepository::get_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bank account not found"))?;
    ok(account)
}

/// Update bank account metadata. Balances never change through this route.
#[utoipa::path(
    put,
    path = "/api/v1/bank-accounts/{id}",
    request_body = UpdateBankAccountRequest,
    responses(
        (status = 200, description = "Updated bank account", body = BankAccount),
        (status = 404, description = "Not found")
    ),
    tag = "Bank Accounts",
    security(("bearer_jwt" = []))
)]
pub async fn update_bank_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBankAccountRequest>,
) -> ApiResult<BankAccount> {
    req.validate()?;
    let account = BankAccountRepository::update(state.pool(), id, &req).await?;
    ok(account)
}

/// Delete a bank account. Refused while the account holds funds.
#[utoipa::path(
    delete,
    path = "/api/v1/bank-accounts/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Account holds funds")
    ),
    tag = "Bank Accounts",
    security(("bearer_jwt" = []))
)]
pub async fn delete_bank_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    BankAccountRepository::delete(state.pool(), id).await?;
    ok(())
}

/// Toggle a bank account between ACTIVE and INACTIVE
#[utoipa::path(
    post,
    path = "/api/v1/bank-accounts/{id}/toggle",
    responses(
        (status = 200, description = "Bank account with flipped status", body = BankAccount),
        (status = 404, description = "Not found")
    ),
    tag = "Bank Accounts",
    security(("bearer_jwt" = []))
)]
pub async fn toggle_bank_account_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<BankAccount> {
    let account = BankAccountRepository::toggle_status(state.pool(), id).await?;
    ok(account)
}

/// Bank account counts per status
#[utoipa::path(
    get,
    path = "/api/v1/bank-accounts/stats",
    responses(
        (status = 200, description = "Status breakdown", body = StatusBreakdown)
    ),
    tag = "Bank Accounts"
)]
pub async fn bank_account_stats(State(state): State<AppState>) -> ApiResult<StatusBreakdown> {
    let stats = BankAccountRepository::stats(state.pool()).await?;
    ok(stats)
}
