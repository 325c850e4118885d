//! Bank account repository
//!
//! Bank accounts are funding sources owned by an organisation. Their balances
//! are mutated only by the transfer engine; this repository covers the
//! metadata surface and the delete guard for funded accounts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{PageParams, Paginated, Pagination, ResourceError, ResourceStatus};
use crate::money::StrictAmount;
use crate::stats::StatusBreakdown;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct BankAccount {
    pub id: Uuid,
    pub name: String,
    pub account_number: String,
    pub bank_name: String,
    pub currency_id: Uuid,
    pub organisation_id: Uuid,
    pub balance: Decimal,
    pub locked_balance: Decimal,
    #[sqlx(try_from = "i16")]
    pub status: ResourceStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBankAccountRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub account_number: String,
    #[validate(length(min = 1, max = 120))]
    pub bank_name: String,
    pub currency_id: Uuid,
    pub organisation_id: Uuid,
    /// Seed balance recorded at creation. Defaults to zero.
    pub opening_balance: Option<StrictAmount>,
    pub status: Option<ResourceStatus>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBankAccountRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub account_number: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub bank_name: Option<String>,
    pub status: Option<ResourceStatus>,
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct BankAccountFilter {
    pub search: Option<String>,
    pub status: Option<ResourceStatus>,
    pub currency_id: Option<Uuid>,
    pub organisation_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

impl BankAccountFilter {
    fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(search) = &self.search {
            qb.push(" AND (name ILIKE ")
                .push_bind(format!("%{}%", search))
                .push(" OR bank_name ILIKE ")
                .push_bind(format!("%{}%", search))
                .push(" OR account_number ILIKE ")
                .push_bind(format!("%{}%", search))
                .push(")");
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status.id());
        }
        if let Some(id) = self.currency_id {
            qb.push(" AND currency_id = ").push_bind(id);
        }
        if let Some(id) = self.organisation_id {
            qb.push(" AND organisation_id = ").push_bind(id);
        }
        if let Some(id) = self.created_by {
            qb.push(" AND created_by = ").push_bind(id);
        }
    }
}

const SELECT_BANK_ACCOUNT: &str = r#"
SELECT id, name, account_number, bank_name, currency_id, organisation_id,
       balance, locked_balance, status, created_by, created_at, updated_at
FROM bank_accounts WHERE 1=1"#;

pub struct BankAccountRepository;

impl BankAccountRepository {
    pub async fn create(
        pool: &PgPool,
        actor: Uuid,
        req: &CreateBankAccountRequest,
    ) -> Result<BankAccount, ResourceError> {
        let opening = req
            .opening_balance
            .map(|a| a.inner())
            .unwrap_or(Decimal::ZERO);

        let account: BankAccount = sqlx::query_as(
            r#"
            INSERT INTO bank_accounts
                (id, name, account_number, bank_name, currency_id,
                 organisation_id, balance, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, account_number, bank_name, currency_id, organisation_id,
                      balance, locked_balance, status, created_by, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.account_number)
        .bind(&req.bank_name)
        .bind(req.currency_id)
        .bind(req.organisation_id)
        .bind(opening)
        .bind(req.status.unwrap_or(ResourceStatus::Active).id())
        .bind(actor)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    pub async fn list(
        pool: &PgPool,
        filter: &BankAccountFilter,
        page: PageParams,
    ) -> Result<Paginated<BankAccount>, ResourceError> {
        let (limit, offset) = page.clamp();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM bank_accounts WHERE 1=1");
        filter.apply(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

        let mut qb = QueryBuilder::new(SELECT_BANK_ACCOUNT);
        filter.apply(&mut qb);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let items: Vec<BankAccount> = qb.build_query_as().fetch_all(pool).await?;

        Ok(Paginated {
            items,
            pagination: Pagination::new(page.page(), limit, total),
        })
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<BankAccount>, ResourceError> {
        let account: Option<BankAccount> =
            sqlx::query_as(&format!("{} AND id = $1", SELECT_BANK_ACCOUNT))
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(account)
    }

    /// Balance columns are intentionally not updatable here.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateBankAccountRequest,
    ) -> Result<BankAccount, ResourceError> {
        let mut qb = QueryBuilder::new("UPDATE bank_accounts SET updated_at = NOW()");

        if let Some(name) = &req.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(number) = &req.account_number {
            qb.push(", account_number = ").push_bind(number);
        }
        if let Some(bank) = &req.bank_name {
            qb.push(", bank_name = ").push_bind(bank);
        }
        if let Some(status) = req.status {
            qb.push(", status = ").push_bind(status.id());
        }

        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(ResourceError::NotFound);
        }

        Self::get_by_id(pool, id)
            .await?
            .ok_or(ResourceError::NotFound)
    }

    /// Delete a bank account. Accounts holding funds are never hard-deleted;
    /// the balance must reach zero first.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ResourceError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query(
            "SELECT balance, locked_balance FROM bank_accounts WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ResourceError::NotFound)?;

        let balance: Decimal = row.get("balance");
        let locked_balance: Decimal = row.get("locked_balance");
        if !balance.is_zero() || !locked_balance.is_zero() {
            return Err(ResourceError::Conflict(format!(
                "bank account holds funds: balance={}, locked_balance={}",
                balance, locked_balance
            )));
        }

        sqlx::query("DELETE FROM bank_accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Flip ACTIVE<->INACTIVE; other states are left as they are
    pub async fn toggle_status(pool: &PgPool, id: Uuid) -> Result<BankAccount, ResourceError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query("SELECT status FROM bank_accounts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ResourceError::NotFound)?;
        let next = ResourceStatus::from(row.get::<i16, _>("status")).toggled();

        sqlx::query("UPDATE bank_accounts SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(next.id())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Self::get_by_id(pool, id)
            .await?
            .ok_or(ResourceError::NotFound)
    }

    pub async fn stats(pool: &PgPool) -> Result<StatusBreakdown, ResourceError> {
        Ok(crate::stats::status_breakdown(pool, "bank_accounts").await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_binds_every_value() {
        let filter = BankAccountFilter {
            search: Some("ops".to_string()),
            status: Some(ResourceStatus::Active),
            currency_id: Some(Uuid::new_v4()),
            organisation_id: Some(Uuid::new_v4()),
            created_by: None,
        };
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM bank_accounts WHERE 1=1");
        filter.apply(&mut qb);
        let sql = qb.sql();
        for placeholder in ["$1", "$2", "$3", "$4", "$5", "$6"] {
            assert!(sql.contains(placeholder), "missing {placeholder}: {sql}");
        }
        assert!(!sql.contains("ops"));
    }
}
