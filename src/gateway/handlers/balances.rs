//! Balance operation handlers
//!
//! Top-up, withdrawal, prefunding, agency float, float limits, period close
//! and the org-balance read surface. Every mutation goes through the Float
//! Policy and Transfer Engine; no handler touches a balance column directly.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::account::{AccountRef, OrgBalance};
use crate::auth::AuthenticatedUser;
use crate::float::{FloatPolicy, OrgBalanceRepository, PeriodCloseReport};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, created, ok};
use crate::ledger::{LedgerEntry, LedgerWriter};
use crate::money::StrictAmount;
use crate::resources::{PageParams, Paginated};
use crate::stats::CurrencyBalanceTotal;

// --- Requests ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TopupRequest {
    pub account: AccountRef,
    pub amount: StrictAmount,
    pub currency_id: Uuid,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub cid: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WithdrawRequest {
    pub account: AccountRef,
    pub amount: StrictAmount,
    pub currency_id: Uuid,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub cid: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PrefundRequest {
    pub organisation_id: Uuid,
    pub bank_account_id: Uuid,
    pub amount: StrictAmount,
    pub currency_id: Uuid,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub cid: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AgencyFloatRequest {
    pub base_org_id: Uuid,
    pub dest_org_id: Uuid,
    pub amount: StrictAmount,
    pub currency_id: Uuid,
    /// When set, the amount moves bank -> float in one atomic transfer
    pub bank_account_id: Option<Uuid>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub cid: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReduceFloatRequest {
    pub base_org_id: Uuid,
    pub dest_org_id: Uuid,
    pub amount: StrictAmount,
    pub currency_id: Uuid,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub cid: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLimitRequest {
    /// New cap on the float line; null removes the cap
    pub balance_limit: Option<StrictAmount>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrgBalanceListQuery {
    /// Scope to one organisation on either side of the float line
    pub organisation_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LedgerQuery {
    pub limit: Option<i64>,
}

// --- Handlers ---

/// Credit an account out of thin air (external money arriving)
#[utoipa::path(
    post,
    path = "/api/v1/balances/topup",
    request_body = TopupRequest,
    responses(
        (status = 201, description = "Ledger entry", body = LedgerEntry),
        (status = 400, description = "Validation failed or currency mismatch"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Float limit exceeded")
    ),
    tag = "Balances",
    security(("bearer_jwt" = []))
)]
pub async fn topup(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<TopupRequest>,
) -> ApiResult<LedgerEntry> {
    req.validate()?;
    let entry = FloatPolicy::topup(
        state.pool(),
        req.account,
        req.amount.inner(),
        req.currency_id,
        user.user_id,
        req.description.unwrap_or_else(|| "topup".to_string()),
        req.cid,
    )
    .await?;
    created(entry)
}

/// Debit an account (money leaving the system)
#[utoipa::path(
    post,
    path = "/api/v1/balances/withdraw",
    request_body = WithdrawRequest,
    responses(
        (status = 201, description = "Ledger entry", body = LedgerEntry),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Insufficient funds")
    ),
    tag = "Balances",
    security(("bearer_jwt" = []))
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<WithdrawRequest>,
) -> ApiResult<LedgerEntry> {
    req.validate()?;
    let entry = FloatPolicy::withdraw(
        state.pool(),
        req.account,
        req.amount.inner(),
        req.currency_id,
        user.user_id,
        req.description.unwrap_or_else(|| "withdrawal".to_string()),
        req.cid,
    )
    .await?;
    created(entry)
}

/// Move money from a bank account into the organisation's own float
#[utoipa::path(
    post,
    path = "/api/v1/balances/prefund",
    request_body = PrefundRequest,
    responses(
        (status = 201, description = "Ledger entry", body = LedgerEntry),
        (status = 404, description = "Bank account not found"),
        (status = 409, description = "Insufficient funds or float limit exceeded")
    ),
    tag = "Balances",
    security(("bearer_jwt" = []))
)]
pub async fn prefund(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<PrefundRequest>,
) -> ApiResult<LedgerEntry> {
    req.validate()?;
    let entry = FloatPolicy::prefund(
        state.pool(),
        req.organisation_id,
        req.bank_account_id,
        req.amount.inner(),
        req.currency_id,
        user.user_id,
        req.description.unwrap_or_else(|| "prefund".to_string()),
        req.cid,
    )
    .await?;
    created(entry)
}

/// Extend float to a partner organisation, creating the float line if absent
#[utoipa::path(
    post,
    path = "/api/v1/balances/agency-float",
    request_body = AgencyFloatRequest,
    responses(
        (status = 201, description = "Ledger entry", body = LedgerEntry),
        (status = 409, description = "Insufficient funds or float limit exceeded")
    ),
    tag = "Balances",
    security(("bearer_jwt" = []))
)]
pub async fn create_agency_float(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<AgencyFloatRequest>,
) -> ApiResult<LedgerEntry> {
    req.validate()?;
    let entry = FloatPolicy::create_agency_float(
        state.pool(),
        req.base_org_id,
        req.dest_org_id,
        req.amount.inner(),
        req.currency_id,
        req.bank_account_id,
        user.user_id,
        req.description
            .unwrap_or_else(|| "agency float create".to_string()),
        req.cid,
    )
    .await?;
    created(entry)
}

/// Take float back from a partner organisation
#[utoipa::path(
    post,
    path = "/api/v1/balances/agency-float/reduce",
    request_body = ReduceFloatRequest,
    responses(
        (status = 201, description = "Ledger entry", body = LedgerEntry),
        (status = 404, description = "No such float line"),
        (status = 409, description = "Insufficient funds")
    ),
    tag = "Balances",
    security(("bearer_jwt" = []))
)]
pub async fn reduce_agency_float(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<ReduceFloatRequest>,
) -> ApiResult<LedgerEntry> {
    req.validate()?;
    let entry = FloatPolicy::reduce_float(
        state.pool(),
        req.base_org_id,
        req.dest_org_id,
        req.amount.inner(),
        req.currency_id,
        user.user_id,
        req.description
            .unwrap_or_else(|| "agency float reduce".to_string()),
        req.cid,
    )
    .await?;
    created(entry)
}

/// Set or remove the cap on a float line. Metadata only.
#[utoipa::path(
    put,
    path = "/api/v1/balances/org/{id}/limit",
    request_body = UpdateLimitRequest,
    responses(
        (status = 200, description = "Updated float balance", body = OrgBalance),
        (status = 404, description = "Float balance not found")
    ),
    tag = "Balances",
    security(("bearer_jwt" = []))
)]
pub async fn update_float_limit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLimitRequest>,
) -> ApiResult<OrgBalance> {
    let balance =
        FloatPolicy::update_float_limit(state.pool(), id, req.balance_limit.map(|a| a.inner()))
            .await?;
    ok(balance)
}

/// Snapshot every float balance into the ledger and start a new period
#[utoipa::path(
    post,
    path = "/api/v1/balances/close-period",
    responses(
        (status = 200, description = "Close report", body = PeriodCloseReport)
    ),
    tag = "Balances",
    security(("bearer_jwt" = []))
)]
pub async fn close_period(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<PeriodCloseReport> {
    let report = FloatPolicy::close_periodic_balances(state.pool(), user.user_id).await?;
    ok(report)
}

/// List org float balances, optionally scoped to one organisation
#[utoipa::path(
    get,
    path = "/api/v1/balances/org",
    responses(
        (status = 200, description = "Page of float balances", body = Paginated<OrgBalance>)
    ),
    tag = "Balances"
)]
pub async fn list_org_balances(
    State(state): State<AppState>,
    Query(query): Query<OrgBalanceListQuery>,
    Query(page): Query<PageParams>,
) -> ApiResult<Paginated<OrgBalance>> {
    let page_result =
        OrgBalanceRepository::list(state.pool(), query.organisation_id, page).await?;
    ok(page_result)
}

/// Get one org float balance
#[utoipa::path(
    get,
    path = "/api/v1/balances/org/{id}",
    responses(
        (status = 200, description = "Float balance", body = OrgBalance),
        (status = 404, description = "Not found")
    ),
    tag = "Balances"
)]
pub async fn get_org_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrgBalance> {
    let balance = OrgBalanceRepository::get_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Float balance not found"))?;
    ok(balance)
}

/// Ledger entries touching one org float balance, newest first
#[utoipa::path(
    get,
    path = "/api/v1/balances/org/{id}/ledger",
    responses(
        (status = 200, description = "Ledger entries", body = Vec<LedgerEntry>)
    ),
    tag = "Balances"
)]
pub async fn org_balance_ledger(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LedgerQuery>,
) -> ApiResult<Vec<LedgerEntry>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let account_ref = AccountRef::org_balance(id);
    let entries = LedgerWriter::entries_for_account(state.pool(), &account_ref, limit).await?;
    ok(entries)
}

/// Per-currency balance totals across all account variants
#[utoipa::path(
    get,
    path = "/api/v1/balances/stats",
    responses(
        (status = 200, description = "Balance totals", body = Vec<CurrencyBalanceTotal>)
    ),
    tag = "Balances"
)]
pub async fn balance_stats(State(state): State<AppState>) -> ApiResult<Vec<CurrencyBalanceTotal>> {
    let totals = crate::stats::balance_totals(state.pool()).await?;
    ok(totals)
}
