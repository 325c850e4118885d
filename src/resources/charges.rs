//! Charge repository
//!
//! Charges are the fee rules applied along a corridor: a percentage rate or a
//! fixed amount per transaction.

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

/// How a charge is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum ChargeKind {
    Percentage = 1,
    Fixed = 2,
}

impl ChargeKind {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }
}

impl From<i16> for ChargeKind {
    fn from(v: i16) -> Self {
        match v {
            2 => ChargeKind::Fixed,
            _ => ChargeKind::Percentage,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Charge {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "i16")]
    pub charge_kind: ChargeKind,
    pub rate: Decimal,
    pub currency_id: Option<Uuid>,
    pub organisation_id: Option<Uuid>,
    #[sqlx(try_from = "i16")]
    pub status: ResourceStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateChargeRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub charge_kind: ChargeKind,
    pub rate: StrictAmount,
    pub currency_id: Option<Uuid>,
    pub organisation_id: Option<Uuid>,
    pub status: Option<ResourceStatus>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateChargeRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub charge_kind: Option<ChargeKind>,
    pub rate: Option<StrictAmount>,
    pub currency_id: Option<Uuid>,
    pub organisation_id: Option<Uuid>,
    pub status: Option<ResourceStatus>,
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct ChargeFilter {
    pub search: Option<String>,
    pub status: Option<ResourceStatus>,
    pub charge_kind: Option<ChargeKind>,
    pub currency_id: Option<Uuid>,
    pub organisation_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

impl ChargeFilter {
    fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(search) = &self.search {
            qb.push(" AND (name ILIKE ")
                .push_bind(format!("%{}%", search))
                .push(" OR description ILIKE ")
                .push_bind(format!("%{}%", search))
                .push(")");
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status.id());
        }
        if let Some(kind) = self.charge_kind {
            qb.push(" AND charge_kind = ").push_bind(kind.id());
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

const SELECT_CHARGE: &str = r#"
SELECT id, name, description, charge_kind, rate, currency_id, organisation_id,
       status, created_by, created_at, updated_at
FROM charges WHERE 1=1"#;

pub struct ChargeRepository;

impl ChargeRepository {
    pub async fn create(
        pool: &PgPool,
        actor: Uuid,
        req: &CreateChargeRequest,
    ) -> Result<Charge, ResourceError> {
        let charge: Charge = sqlx::query_as(
            r#"
            INSERT INTO charges
                (id, name, description, charge_kind, rate, currency_id,
                 organisation_id, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, description, charge_kind, rate, currency_id,
                      organisation_id, status, created_by, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.charge_kind.id())
        .bind(req.rate.inner())
        .bind(req.currency_id)
        .bind(req.organisation_id)
        .bind(req.status.unwrap_or(ResourceStatus::Active).id())
        .bind(actor)
        .fetch_one(pool)
        .await?;

        Ok(charge)
    }

    pub async fn list(
        pool: &PgPool,
        filter: &ChargeFilter,
        page: PageParams,
    ) -> Result<Paginated<Charge>, ResourceError> {
        let (limit, offset) = page.clamp();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM charges WHERE 1=1");
        filter.apply(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

        let mut qb = QueryBuilder::new(SELECT_CHARGE);
        filter.apply(&mut qb);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let items: Vec<Charge> = qb.build_query_as().fetch_all(pool).await?;

        Ok(Paginated {
            items,
            pagination: Pagination::new(page.page(), limit, total),
        })
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Charge>, ResourceError> {
        let charge: Option<Charge> = sqlx::query_as(&format!("{} AND id = $1", SELECT_CHARGE))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(charge)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateChargeRequest,
    ) -> Result<Charge, ResourceError> {
        let mut qb = QueryBuilder::new("UPDATE charges SET updated_at = NOW()");

        if let Some(name) = &req.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &req.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(kind) = req.charge_kind {
            qb.push(", charge_kind = ").push_bind(kind.id());
        }
        if let Some(rate) = req.rate {
            qb.push(", rate = ").push_bind(rate.inner());
        }
        if let Some(v) = req.currency_id {
            qb.push(", currency_id = ").push_bind(v);
        }
        if let Some(v) = req.organisation_id {
            qb.push(", organisation_id = ").push_bind(v);
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

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ResourceError> {
        let result = sqlx::query("DELETE FROM charges WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ResourceError::NotFound);
        }
        Ok(())
    }

    /// Flip ACTIVE<->INACTIVE; other states are left as they are
    pub async fn toggle_status(pool: &PgPool, id: Uuid) -> Result<Charge, ResourceError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query("SELECT status FROM charges WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ResourceError::NotFound)?;
        let next = ResourceStatus::from(row.get::<i16, _>("status")).toggled();

        sqlx::query("UPDATE charges SET status = $1, updated_at = NOW() WHERE id = $2")
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
        Ok(crate::stats::status_breakdown(pool, "charges").await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_kind_from_i16_defaults_to_percentage() {
        assert_eq!(ChargeKind::from(1), ChargeKind::Percentage);
        assert_eq!(ChargeKind::from(2), ChargeKind::Fixed);
        assert_eq!(ChargeKind::from(99), ChargeKind::Percentage);
    }

    #[test]
    fn test_filter_sql_has_no_raw_values() {
        let filter = ChargeFilter {
            search: Some("fee'; DROP TABLE charges;--".to_string()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM charges WHERE 1=1");
        filter.apply(&mut qb);
        assert!(!qb.sql().contains("DROP TABLE"));
    }
}
