//! Stats Aggregator
//!
//! Read-only rollups for dashboard widgets: status counts per resource and
//! balance totals per currency. Plain queries over committed state; no caching
//! beyond the connection pool.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Row};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::resources::ResourceStatus;

/// Count of resources per status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub total: i64,
    pub active_count: i64,
    pub inactive_count: i64,
    pub pending_count: i64,
    pub blocked_count: i64,
}

/// Balance rollup for one currency across all account variants
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyBalanceTotal {
    pub currency_id: Uuid,
    pub currency_code: String,
    pub total_balance: Decimal,
    pub total_locked_balance: Decimal,
}

/// Tables that carry a status column and may be rolled up
const STATUS_TABLES: &[&str] = &[
    "corridors",
    "charges",
    "integrations",
    "organisations",
    "bank_accounts",
];

/// Status breakdown over one resource table. The table name must be a known
/// literal; anything else is a programming error.
pub async fn status_breakdown(pool: &PgPool, table: &str) -> Result<StatusBreakdown, sqlx::Error> {
    assert!(
        STATUS_TABLES.contains(&table),
        "status_breakdown called with unknown table {table}"
    );

    let sql = format!(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE status = $1) AS active_count,
            COUNT(*) FILTER (WHERE status = $2) AS inactive_count,
            COUNT(*) FILTER (WHERE status = $3) AS pending_count,
            COUNT(*) FILTER (WHERE status = $4) AS blocked_count
        FROM {}
        "#,
        table
    );

    let row = sqlx::query(&sql)
        .bind(ResourceStatus::Active.id())
        .bind(ResourceStatus::Inactive.id())
        .bind(ResourceStatus::Pending.id())
        .bind(ResourceStatus::Blocked.id())
        .fetch_one(pool)
        .await?;

    Ok(StatusBreakdown {
        total: row.get("total"),
        active_count: row.get("active_count"),
        inactive_count: row.get("inactive_count"),
        pending_count: row.get("pending_count"),
        blocked_count: row.get("blocked_count"),
    })
}

/// Per-currency balance and locked-balance sums across every account variant
pub async fn balance_totals(pool: &PgPool) -> Result<Vec<CurrencyBalanceTotal>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT cur.id AS currency_id, cur.code AS currency_code,
               COALESCE(SUM(b.balance), 0) AS total_balance,
               COALESCE(SUM(b.locked_balance), 0) AS total_locked_balance
        FROM (
            SELECT currency_id, balance, locked_balance FROM bank_accounts
            UNION ALL
            SELECT currency_id, balance, locked_balance FROM vaults
            UNION ALL
            SELECT currency_id, balance, locked_balance FROM org_balances
            UNION ALL
            SELECT currency_id, balance, locked_balance FROM gl_accounts
        ) b
        JOIN currencies cur ON b.currency_id = cur.id
        GROUP BY cur.id, cur.code
        ORDER BY cur.code
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| CurrencyBalanceTotal {
            currency_id: row.get("currency_id"),
            currency_code: row.get("currency_code"),
            total_balance: row.get("total_balance"),
            total_locked_balance: row.get("total_locked_balance"),
        })
        .collect())
}
