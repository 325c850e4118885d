//! Axum HTTP gateway
//!
//! Routes, shared state, response envelope and OpenAPI docs. Everything under
//! `/api/v1` except the health check requires a Bearer JWT; the authenticated
//! actor is stamped onto created records and ledger entries.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{AuthService, auth_middleware};
use crate::config::AppConfig;
use crate::db::Database;
use state::AppState;

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let corridors = Router::new()
        .route(
            "/corridors",
            get(handlers::corridors::list_corridors).post(handlers::corridors::create_corridor),
        )
        .route("/corridors/stats", get(handlers::corridors::corridor_stats))
        .route(
            "/corridors/{id}/toggle",
            post(handlers::corridors::toggle_corridor_status),
        )
        .route(
            "/corridors/{id}",
            get(handlers::corridors::get_corridor)
                .put(handlers::corridors::update_corridor)
                .delete(handlers::corridors::delete_corridor),
        );

    let charges = Router::new()
        .route(
            "/charges",
            get(handlers::charges::list_charges).post(handlers::charges::create_charge),
        )
        .route("/charges/stats", get(handlers::charges::charge_stats))
        .route(
            "/charges/{id}/toggle",
            post(handlers::charges::toggle_charge_status),
        )
        .route(
            "/charges/{id}",
            get(handlers::charges::get_charge)
                .put(handlers::charges::update_charge)
                .delete(handlers::charges::delete_charge),
        );

    let integrations = Router::new()
        .route(
            "/integrations",
            get(handlers::integrations::list_integrations)
                .post(handlers::integrations::create_integration),
        )
        .route(
            "/integrations/stats",
            get(handlers::integrations::integration_stats),
        )
        .route(
            "/integrations/{id}/toggle",
            post(handlers::integrations::toggle_integration_status),
        )
        .route(
            "/integrations/{id}",
            get(handlers::integrations::get_integration)
                .put(handlers::integrations::update_integration)
                .delete(handlers::integrations::delete_integration),
        );

    let organisations = Router::new()
        .route(
            "/organisations",
            get(handlers::organisations::list_organisations)
                .post(handlers::organisations::create_organisation),
        )
        .route(
            "/organisations/stats",
            get(handlers::organisations::organisation_stats),
        )
        .route(
            "/organisations/{id}/toggle",
            post(handlers::organisations::toggle_organisation_status),
        )
        .route(
            "/organisations/{id}",
            get(handlers::organisations::get_organisation)
                .put(handlers::organisations::update_organisation)
                .delete(handlers::organisations::delete_organisation),
        );

    let bank_accounts = Router::new()
        .route(
            "/bank-accounts",
            get(handlers::bank_accounts::list_bank_accounts)
                .post(handlers::bank_accounts::create_bank_account),
        )
        .route(
            "/bank-accounts/stats",
            get(handlers::bank_accounts::bank_account_stats),
        )
        .route(
            "/bank-accounts/{id}/toggle",
            post(handlers::bank_accounts::toggle_bank_account_status),
        )
        .route(
            "/bank-accounts/{id}",
            get(handlers::bank_accounts::get_bank_account)
                .put(handlers::bank_accounts::update_bank_account)
                .delete(handlers::bank_accounts::delete_bank_account),
        );

    let balances = Router::new()
        .route("/balances/topup", post(handlers::balances::topup))
        .route("/balances/withdraw", post(handlers::balances::withdraw))
        .route("/balances/prefund", post(handlers::balances::prefund))
        .route(
            "/balances/agency-float",
            post(handlers::balances::create_agency_float),
        )
        .route(
            "/balances/agency-float/reduce",
            post(handlers::balances::reduce_agency_float),
        )
        .route(
            "/balances/close-period",
            post(handlers::balances::close_period),
        )
        .route("/balances/stats", get(handlers::balances::balance_stats))
        .route("/balances/org", get(handlers::balances::list_org_balances))
        .route(
            "/balances/org/{id}",
            get(handlers::balances::get_org_balance),
        )
        .route(
            "/balances/org/{id}/limit",
            put(handlers::balances::update_float_limit),
        )
        .route(
            "/balances/org/{id}/ledger",
            get(handlers::balances::org_balance_ledger),
        );

    // Everything except the health check is private
    let api = corridors
        .merge(charges)
        .merge(integrations)
        .merge(organisations)
        .merge(bank_accounts)
        .merge(balances)
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/api/v1/health", get(handlers::health::health_check))
        .nest("/api/v1", api)
        .with_state(state)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
}

/// Start the HTTP gateway
pub async fn run_server(config: &AppConfig, db: Arc<Database>) -> anyhow::Result<()> {
    let auth = AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_ttl_secs,
    );
    let state = AppState::new(db, auth);
    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API docs at http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
