//! OpenAPI / Swagger UI documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::{AccountRef, AccountType, OrgBalance};
use crate::float::PeriodCloseReport;
use crate::gateway::handlers::HealthResponse;
use crate::gateway::handlers::balances::{
    AgencyFloatRequest, PrefundRequest, ReduceFloatRequest, TopupRequest, UpdateLimitRequest,
    WithdrawRequest,
};
use crate::ledger::{LedgerEntry, OperationType};
use crate::resources::bank_accounts::{
    BankAccount, CreateBankAccountRequest, UpdateBankAccountRequest,
};
use crate::resources::charges::{Charge, ChargeKind, CreateChargeRequest, UpdateChargeRequest};
use crate::resources::corridors::{Corridor, CreateCorridorRequest, UpdateCorridorRequest};
use crate::resources::integrations::{
    CreateIntegrationRequest, Integration, UpdateIntegrationRequest,
};
use crate::resources::organisations::{
    CreateOrganisationRequest, Organisation, UpdateOrganisationRequest,
};
use crate::resources::{Pagination, ResourceStatus};
use crate::stats::{CurrencyBalanceTotal, StatusBreakdown};

/// Bearer JWT security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Main API documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RemitDesk API",
        version = "1.0.0",
        description = "Money-remittance back-office: corridor/charge/integration/organisation/bank-account administration plus float balance operations with an append-only ledger.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        // Corridors
        crate::gateway::handlers::corridors::create_corridor,
        crate::gateway::handlers::corridors::list_corridors,
        crate::gateway::handlers::corridors::get_corridor,
        crate::gateway::handlers::corridors::update_corridor,
        crate::gateway::handlers::corridors::delete_corridor,
        crate::gateway::handlers::corridors::toggle_corridor_status,
        crate::gateway::handlers::corridors::corridor_stats,
        // Charges
        crate::gateway::handlers::charges::create_charge,
        crate::gateway::handlers::charges::list_charges,
        crate::gateway::handlers::charges::get_charge,
        crate::gateway::handlers::charges::update_charge,
        crate::gateway::handlers::charges::delete_charge,
        crate::gateway::handlers::charges::toggle_charge_status,
        crate::gateway::handlers::charges::charge_stats,
        // Integrations
        crate::gateway::handlers::integrations::create_integration,
        crate::gateway::handlers::integrations::list_integrations,
        crate::gateway::handlers::integrations::get_integration,
        crate::gateway::handlers::integrations::update_integration,
        crate::gateway::handlers::integrations::delete_integration,
        crate::gateway::handlers::integrations::toggle_integration_status,
        crate::gateway::handlers::integrations::integration_stats,
        // Organisations
        crate::gateway::handlers::organisations::create_organisation,
        crate::gateway::handlers::organisations::list_organisations,
        crate::gateway::handlers::organisations::get_organisation,
        crate::gateway::handlers::organisations::update_organisation,
        crate::gateway::handlers::organisations::delete_organisation,
        crate::gateway::handlers::organisations::toggle_organisation_status,
        crate::gateway::handlers::organisations::organisation_stats,
        // Bank accounts
        crate::gateway::handlers::bank_accounts::create_bank_account,
        crate::gateway::handlers::bank_accounts::list_bank_accounts,
        crate::gateway::handlers::bank_accounts::get_bank_account,
        crate::gateway::handlers::bank_accounts::update_bank_account,
        crate::gateway::handlers::bank_accounts::delete_bank_account,
        crate::gateway::handlers::bank_accounts::toggle_bank_account_status,
        crate::gateway::handlers::bank_accounts::bank_account_stats,
        // Balance operations
        crate::gateway::handlers::balances::topup,
        crate::gateway::handlers::balances::withdraw,
        crate::gateway::handlers::balances::prefund,
        crate::gateway::handlers::balances::create_agency_float,
        crate::gateway::handlers::balances::reduce_agency_float,
        crate::gateway::handlers::balances::update_float_limit,
        crate::gateway::handlers::balances::close_period,
        crate::gateway::handlers::balances::list_org_balances,
        crate::gateway::handlers::balances::get_org_balance,
        crate::gateway::handlers::balances::org_balance_ledger,
        crate::gateway::handlers::balances::balance_stats,
    ),
    components(
        schemas(
            HealthResponse,
            ResourceStatus,
            Pagination,
            StatusBreakdown,
            CurrencyBalanceTotal,
            Corridor,
            CreateCorridorRequest,
            UpdateCorridorRequest,
            Charge,
            ChargeKind,
            CreateChargeRequest,
            UpdateChargeRequest,
            Integration,
            CreateIntegrationRequest,
            UpdateIntegrationRequest,
            Organisation,
            CreateOrganisationRequest,
            UpdateOrganisationRequest,
            BankAccount,
            CreateBankAccountRequest,
            UpdateBankAccountRequest,
            AccountRef,
            AccountType,
            OrgBalance,
            OperationType,
            LedgerEntry,
            PeriodCloseReport,
            TopupRequest,
            WithdrawRequest,
            PrefundRequest,
            AgencyFloatRequest,
            ReduceFloatRequest,
            UpdateLimitRequest,
        )
    ),
    modifiers(&SecurityAddon),
    security(
        ("bearer_jwt" = [])
    ),
    tags(
        (name = "Corridors", description = "Remittance corridor administration"),
        (name = "Charges", description = "Fee rule administration"),
        (name = "Integrations", description = "Partner integration administration"),
        (name = "Organisations", description = "Organisation administration"),
        (name = "Bank Accounts", description = "Funding source administration"),
        (name = "Balances", description = "Float balance operations and the ledger"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "RemitDesk API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json = ApiDoc::openapi().to_json();
        assert!(json.is_ok());
        assert!(json.unwrap().contains("RemitDesk API"));
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths;
        assert!(paths.paths.contains_key("/api/v1/health"));
        assert!(paths.paths.contains_key("/api/v1/corridors"));
        assert!(paths.paths.contains_key("/api/v1/balances/topup"));
        assert!(paths.paths.contains_key("/api/v1/balances/org/{id}/limit"));
        assert!(paths.paths.contains_key("/api/v1/corridors/{id}/toggle"));
        assert!(paths.paths.contains_key("/api/v1/bank-accounts/{id}/toggle"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let components = ApiDoc::openapi().components.expect("should have components");
        assert!(components.security_schemes.contains_key("bearer_jwt"));
    }
}
