//! Repository for organisation float balance rows

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::OrgBalance;
use crate::resources::{PageParams, Paginated, Pagination};

const SELECT_ORG_BALANCE: &str = r#"
SELECT id, base_org_id, dest_org_id, currency_id, balance, locked_balance,
       balance_limit, period_start, created_at, updated_at
FROM org_balances"#;

pub struct OrgBalanceRepository;

impl OrgBalanceRepository {
    /// Get a float balance row by id
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<OrgBalance>, sqlx::Error> {
        sqlx::query_as(&format!("{} WHERE id = $1", SELECT_ORG_BALANCE))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the float line for an org pair and currency
    pub async fn find(
        pool: &PgPool,
        base_org_id: Uuid,
        dest_org_id: Uuid,
        currency_id: Uuid,
    ) -> Result<Option<OrgBalance>, sqlx::Error> {
        sqlx::query_as(&format!(
            "{} WHERE base_org_id = $1 AND dest_org_id = $2 AND currency_id = $3",
            SELECT_ORG_BALANCE
        ))
        .bind(base_org_id)
        .bind(dest_org_id)
        .bind(currency_id)
        .fetch_optional(pool)
        .await
    }

    /// Find the float line for an org pair, creating it with a zero opening
    /// balance if absent. The unique constraint on
    /// (base_org_id, dest_org_id, currency_id) makes this race-safe.
    pub async fn find_or_create(
        pool: &PgPool,
        base_org_id: Uuid,
        dest_org_id: Uuid,
        currency_id: Uuid,
    ) -> Result<OrgBalance, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO org_balances (id, base_org_id, dest_org_id, currency_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (base_org_id, dest_org_id, currency_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(base_org_id)
        .bind(dest_org_id)
        .bind(currency_id)
        .execute(pool)
        .await?;

        let row = Self::find(pool, base_org_id, dest_org_id, currency_id)
            .await?
            .expect("org balance row exists after upsert");
        Ok(row)
    }

    /// List float balances, newest first, optionally scoped to one organisation
    /// on either side of the line
    pub async fn list(
        pool: &PgPool,
        organisation_id: Option<Uuid>,
        page: PageParams,
    ) -> Result<Paginated<OrgBalance>, sqlx::Error> {
        let (limit, offset) = page.clamp();

        let total: i64 = match organisation_id {
            Some(org) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM org_balances WHERE base_org_id = $1 OR dest_org_id = $1",
                )
                .bind(org)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM org_balances")
                    .fetch_one(pool)
                    .await?
            }
        };

        let items: Vec<OrgBalance> = match organisation_id {
            Some(org) => {
                sqlx::query_as(&format!(
                    "{} WHERE base_org_id = $1 OR dest_org_id = $1
                     ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
                    SELECT_ORG_BALANCE
                ))
                .bind(org)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "{} ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
                    SELECT_ORG_BALANCE
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(Paginated {
            items,
            pagination: Pagination::new(page.page(), limit, total),
        })
    }

    /// Update the float limit. Returns the updated row, or None if the id does
    /// not exist. Pure metadata change; never moves money.
    pub async fn update_limit(
        pool: &PgPool,
        id: Uuid,
        new_limit: Option<Decimal>,
    ) -> Result<Option<OrgBalance>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE org_balances SET balance_limit = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, base_org_id, dest_org_id, currency_id, balance,
                      locked_balance, balance_limit, period_start, created_at, updated_at
            "#,
        )
        .bind(new_limit)
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
