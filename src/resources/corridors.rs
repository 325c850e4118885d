//! Corridor repository
//!
//! A corridor is a configured payment route between a base country/currency
//! pair and a destination country, scoped to an organisation. This is the
//! reference implementation of the uniform CRUD contract; the other resources
//! mirror it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{PageParams, Paginated, Pagination, ResourceError, ResourceStatus};
use crate::stats::StatusBreakdown;

// ============================================================================
// Models
// ============================================================================

/// Brief country reference embedded in corridor responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CountryBrief {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

/// Brief currency reference embedded in corridor responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrencyBrief {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

/// Brief organisation reference embedded in corridor responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrganisationBrief {
    pub id: Uuid,
    pub name: String,
}

/// Brief user reference embedded in corridor responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserBrief {
    pub id: Uuid,
    pub username: String,
}

/// Corridor with its direct relations expanded
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Corridor {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ResourceStatus,
    pub base_country: CountryBrief,
    pub destination_country: CountryBrief,
    pub base_currency: CurrencyBrief,
    pub organisation: OrganisationBrief,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_organisation: Option<OrganisationBrief>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_user: Option<UserBrief>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCorridorRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub base_country_id: Uuid,
    pub destination_country_id: Uuid,
    pub base_currency_id: Uuid,
    pub organisation_id: Uuid,
    pub origin_organisation_id: Option<Uuid>,
    /// Defaults to ACTIVE when omitted
    pub status: Option<ResourceStatus>,
}

/// Partial patch: unspecified fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCorridorRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub base_country_id: Option<Uuid>,
    pub destination_country_id: Option<Uuid>,
    pub base_currency_id: Option<Uuid>,
    pub organisation_id: Option<Uuid>,
    pub origin_organisation_id: Option<Uuid>,
    pub status: Option<ResourceStatus>,
}

/// Typed list filters, built from validated query parameters.
/// Replaces stringly-typed where-clause assembly with one pure builder.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct CorridorFilter {
    /// Case-insensitive substring over name/description
    pub search: Option<String>,
    pub status: Option<ResourceStatus>,
    pub base_country_id: Option<Uuid>,
    pub destination_country_id: Option<Uuid>,
    pub base_currency_id: Option<Uuid>,
    pub organisation_id: Option<Uuid>,
    pub origin_organisation_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

impl CorridorFilter {
    /// Append WHERE predicates for this filter. Pure function of the filter;
    /// every value goes through a bind, never string interpolation.
    fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(search) = &self.search {
            qb.push(" AND (c.name ILIKE ")
                .push_bind(format!("%{}%", search))
                .push(" OR c.description ILIKE ")
                .push_bind(format!("%{}%", search))
                .push(")");
        }
        if let Some(status) = self.status {
            qb.push(" AND c.status = ").push_bind(status.id());
        }
        if let Some(id) = self.base_country_id {
            qb.push(" AND c.base_country_id = ").push_bind(id);
        }
        if let Some(id) = self.destination_country_id {
            qb.push(" AND c.destination_country_id = ").push_bind(id);
        }
        if let Some(id) = self.base_currency_id {
            qb.push(" AND c.base_currency_id = ").push_bind(id);
        }
        if let Some(id) = self.organisation_id {
            qb.push(" AND c.organisation_id = ").push_bind(id);
        }
        if let Some(id) = self.origin_organisation_id {
            qb.push(" AND c.origin_organisation_id = ").push_bind(id);
        }
        if let Some(id) = self.created_by {
            qb.push(" AND c.created_by = ").push_bind(id);
        }
    }
}

// ============================================================================
// Repository
// ============================================================================

const SELECT_CORRIDOR: &str = r#"
SELECT c.id, c.name, c.description, c.status, c.created_at, c.updated_at,
       bc.id   AS bc_id,   bc.name  AS bc_name,  bc.code AS bc_code,
       dc.id   AS dc_id,   dc.name  AS dc_name,  dc.code AS dc_code,
       cur.id  AS cur_id,  cur.code AS cur_code, cur.name AS cur_name,
       org.id  AS org_id,  org.name AS org_name,
       oorg.id AS oorg_id, oorg.name AS oorg_name,
       u.id    AS u_id,    u.username AS u_username
FROM corridors c
JOIN countries bc      ON c.base_country_id = bc.id
JOIN countries dc      ON c.destination_country_id = dc.id
JOIN currencies cur    ON c.base_currency_id = cur.id
JOIN organisations org ON c.organisation_id = org.id
LEFT JOIN organisations oorg ON c.origin_organisation_id = oorg.id
LEFT JOIN users u      ON c.created_by = u.id
WHERE 1=1"#;

pub struct CorridorRepository;

impl CorridorRepository {
    /// Create a corridor and return it with relations expanded
    pub async fn create(
        pool: &PgPool,
        actor: Uuid,
        req: &CreateCorridorRequest,
    ) -> Result<Corridor, ResourceError> {
        let id = Uuid::new_v4();
        let status = req.status.unwrap_or(ResourceStatus::Active);

        sqlx::query(
            r#"
            INSERT INTO corridors
                (id, name, description, base_country_id, destination_country_id,
                 base_currency_id, organisation_id, origin_organisation_id,
                 status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.base_country_id)
        .bind(req.destination_country_id)
        .bind(req.base_currency_id)
        .bind(req.organisation_id)
        .bind(req.origin_organisation_id)
        .bind(status.id())
        .bind(actor)
        .execute(pool)
        .await?;

        Self::get_by_id(pool, id)
            .await?
            .ok_or(ResourceError::NotFound)
    }

    /// List corridors with typed filters and pagination, newest first
    pub async fn list(
        pool: &PgPool,
        filter: &CorridorFilter,
        page: PageParams,
    ) -> Result<Paginated<Corridor>, ResourceError> {
        let (limit, offset) = page.clamp();

        let mut count_qb =
            QueryBuilder::new("SELECT COUNT(*) FROM corridors c WHERE 1=1");
        filter.apply(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

        let mut qb = QueryBuilder::new(SELECT_CORRIDOR);
        filter.apply(&mut qb);
        qb.push(" ORDER BY c.created_at DESC, c.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build().fetch_all(pool).await?;
        let items = rows.iter().map(row_to_corridor).collect();

        Ok(Paginated {
            items,
            pagination: Pagination::new(page.page(), limit, total),
        })
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Corridor>, ResourceError> {
        let row = sqlx::query(&format!("{} AND c.id = $1", SELECT_CORRIDOR))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.as_ref().map(row_to_corridor))
    }

    /// Partial patch; unspecified fields stay unchanged
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateCorridorRequest,
    ) -> Result<Corridor, ResourceError> {
        let mut qb = QueryBuilder::new("UPDATE corridors SET updated_at = NOW()");

        if let Some(name) = &req.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &req.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(v) = req.base_country_id {
            qb.push(", base_country_id = ").push_bind(v);
        }
        if let Some(v) = req.destination_country_id {
            qb.push(", destination_country_id = ").push_bind(v);
        }
        if let Some(v) = req.base_currency_id {
            qb.push(", base_currency_id = ").push_bind(v);
        }
        if let Some(v) = req.organisation_id {
            qb.push(", organisation_id = ").push_bind(v);
        }
        if let Some(v) = req.origin_organisation_id {
            qb.push(", origin_organisation_id = ").push_bind(v);
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

    /// Hard delete; a foreign-key reference surfaces as a Conflict
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ResourceError> {
        let result = sqlx::query("DELETE FROM corridors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ResourceError::NotFound);
        }
        Ok(())
    }

    /// Flip ACTIVE<->INACTIVE; other states are left as they are
    pub async fn toggle_status(pool: &PgPool, id: Uuid) -> Result<Corridor, ResourceError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query("SELECT status FROM corridors WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ResourceError::NotFound)?;
        let next = ResourceStatus::from(row.get::<i16, _>("status")).toggled();

        sqlx::query("UPDATE corridors SET status = $1, updated_at = NOW() WHERE id = $2")
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
        Ok(crate::stats::status_breakdown(pool, "corridors").await?)
    }
}

fn row_to_corridor(row: &sqlx::postgres::PgRow) -> Corridor {
    let origin_organisation = row
        .get::<Option<Uuid>, _>("oorg_id")
        .map(|id| OrganisationBrief {
            id,
            name: row.get("oorg_name"),
        });
    let created_by_user = row.get::<Option<Uuid>, _>("u_id").map(|id| UserBrief {
        id,
        username: row.get("u_username"),
    });

    Corridor {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        status: ResourceStatus::from(row.get::<i16, _>("status")),
        base_country: CountryBrief {
            id: row.get("bc_id"),
            name: row.get("bc_name"),
            code: row.get("bc_code"),
        },
        destination_country: CountryBrief {
            id: row.get("dc_id"),
            name: row.get("dc_name"),
            code: row.get("dc_code"),
        },
        base_currency: CurrencyBrief {
            id: row.get("cur_id"),
            code: row.get("cur_code"),
            name: row.get("cur_name"),
        },
        organisation: OrganisationBrief {
            id: row.get("org_id"),
            name: row.get("org_name"),
        },
        origin_organisation,
        created_by_user,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builds_bound_predicates() {
        let filter = CorridorFilter {
            search: Some("NG-US".to_string()),
            status: Some(ResourceStatus::Active),
            organisation_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM corridors c WHERE 1=1");
        filter.apply(&mut qb);
        let sql = qb.sql();

        assert!(sql.contains("c.name ILIKE $1"));
        assert!(sql.contains("c.description ILIKE $2"));
        assert!(sql.contains("c.status = $3"));
        assert!(sql.contains("c.organisation_id = $4"));
        // No raw values ever end up in the SQL text
        assert!(!sql.contains("NG-US"));
    }

    #[test]
    fn test_empty_filter_adds_nothing() {
        let filter = CorridorFilter::default();
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM corridors c WHERE 1=1");
        filter.apply(&mut qb);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM corridors c WHERE 1=1");
    }
}
