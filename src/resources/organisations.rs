//! Organisation repository

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{PageParams, Paginated, Pagination, ResourceError, ResourceStatus};
use crate::stats::StatusBreakdown;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Organisation {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub country_id: Option<Uuid>,
    #[sqlx(try_from = "i16")]
    pub status: ResourceStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganisationRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub country_id: Option<Uuid>,
    pub status: Option<ResourceStatus>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganisationRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub country_id: Option<Uuid>,
    pub status: Option<ResourceStatus>,
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct OrganisationFilter {
    pub search: Option<String>,
    pub status: Option<ResourceStatus>,
    pub country_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

impl OrganisationFilter {
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
        if let Some(id) = self.country_id {
            qb.push(" AND country_id = ").push_bind(id);
        }
        if let Some(id) = self.created_by {
            qb.push(" AND created_by = ").push_bind(id);
        }
    }
}

const SELECT_ORGANISATION: &str = r#"
SELECT id, name, description, country_id, status, created_by, created_at, updated_at
FROM organisations WHERE 1=1"#;

pub struct OrganisationRepository;

impl OrganisationRepository {
    pub async fn create(
        pool: &PgPool,
        actor: Uuid,
        req: &CreateOrganisationRequest,
    ) -> Result<Organisation, ResourceError> {
        let org: Organisation = sqlx::query_as(
            r#"
            INSERT INTO organisations (id, name, description, country_id, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, country_id, status, created_by,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.country_id)
        .bind(req.status.unwrap_or(ResourceStatus::Active).id())
        .bind(actor)
        .fetch_one(pool)
        .await?;

        Ok(org)
    }

    pub async fn list(
        pool: &PgPool,
        filter: &OrganisationFilter,
        page: PageParams,
    ) -> Result<Paginated<Organisation>, ResourceError> {
        let (limit, offset) = page.clamp();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM organisations WHERE 1=1");
        filter.apply(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

        let mut qb = QueryBuilder::new(SELECT_ORGANISATION);
        filter.apply(&mut qb);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let items: Vec<Organisation> = qb.build_query_as().fetch_all(pool).await?;

        Ok(Paginated {
            items,
            pagination: Pagination::new(page.page(), limit, total),
        })
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Organisation>, ResourceError> {
        let row: Option<Organisation> =
            sqlx::query_as(&format!("{} AND id = $1", SELECT_ORGANISATION))
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(row)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateOrganisationRequest,
    ) -> Result<Organisation, ResourceError> {
        let mut qb = QueryBuilder::new("UPDATE organisations SET updated_at = NOW()");

        if let Some(name) = &req.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &req.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(v) = req.country_id {
            qb.push(", country_id = ").push_bind(v);
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

    /// Hard delete. Organisations referenced by corridors, bank accounts or
    /// float lines are protected by foreign keys and surface as Conflict.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ResourceError> {
        let result = sqlx::query("DELETE FROM organisations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ResourceError::NotFound);
        }
        Ok(())
    }

    /// Flip ACTIVE<->INACTIVE; other states are left as they are
    pub async fn toggle_status(pool: &PgPool, id: Uuid) -> Result<Organisation, ResourceError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query("SELECT status FROM organisations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ResourceError::NotFound)?;
        let next = ResourceStatus::from(row.get::<i16, _>("status")).toggled();

        sqlx::query("UPDATE organisations SET status = $1, updated_at = NOW() WHERE id = $2")
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
        Ok(crate::stats::status_breakdown(pool, "organisations").await?)
    }
}
