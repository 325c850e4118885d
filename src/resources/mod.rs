//! CRUD resource repositories
//!
//! Corridors, charges, integrations, organisations and bank accounts all
//! follow the same contract: validated create, filtered + paginated list,
//! get-by-id, partial update, delete (blocked by foreign keys), and a status
//! breakdown for dashboard widgets.

pub mod bank_accounts;
pub mod charges;
pub mod corridors;
pub mod integrations;
pub mod organisations;

pub use bank_accounts::BankAccountRepository;
pub use charges::ChargeRepository;
pub use corridors::CorridorRepository;
pub use integrations::IntegrationRepository;
pub use organisations::OrganisationRepository;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

// ============================================================================
// Status
// ============================================================================

/// Resource status. Transitions are unrestricted: any state to any other,
/// driven purely by explicit updates (plus the ACTIVE<->INACTIVE toggle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum ResourceStatus {
    Active = 1,
    Inactive = 2,
    Pending = 3,
    Blocked = 4,
}

impl ResourceStatus {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(ResourceStatus::Active),
            2 => Some(ResourceStatus::Inactive),
            3 => Some(ResourceStatus::Pending),
            4 => Some(ResourceStatus::Blocked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Active => "ACTIVE",
            ResourceStatus::Inactive => "INACTIVE",
            ResourceStatus::Pending => "PENDING",
            ResourceStatus::Blocked => "BLOCKED",
        }
    }

    /// ACTIVE<->INACTIVE convenience toggle; other states are left alone
    pub fn toggled(&self) -> Self {
        match self {
            ResourceStatus::Active => ResourceStatus::Inactive,
            ResourceStatus::Inactive => ResourceStatus::Active,
            other => *other,
        }
    }
}

impl From<i16> for ResourceStatus {
    fn from(v: i16) -> Self {
        ResourceStatus::from_id(v).unwrap_or(ResourceStatus::Active)
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// 1-indexed page parameters from the query string
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

impl PageParams {
    /// Effective page number (1-indexed, floored at 1)
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective (limit, offset) with the limit capped at [`MAX_LIMIT`]
    pub fn clamp(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = (self.page() - 1) * limit;
        (limit, offset)
    }
}

/// Pagination envelope returned with every list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: if total == 0 { 0 } else { (total as u64).div_ceil(limit as u64) as i64 },
        }
    }
}

/// A page of items plus its pagination envelope
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),
}

impl From<sqlx::Error> for ResourceError {
    fn from(e: sqlx::Error) -> Self {
        // Foreign-key and unique violations are client-visible conflicts, not
        // internal failures.
        if let sqlx::Error::Database(ref db_err) = e {
            match db_err.code().as_deref() {
                Some("23503") => {
                    return ResourceError::Conflict(
                        "Operation blocked by a referencing record".to_string(),
                    );
                }
                Some("23505") => {
                    return ResourceError::Conflict("Duplicate record".to_string());
                }
                _ => {}
            }
        }
        ResourceError::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            ResourceStatus::Active,
            ResourceStatus::Inactive,
            ResourceStatus::Pending,
            ResourceStatus::Blocked,
        ] {
            assert_eq!(ResourceStatus::from_id(s.id()), Some(s));
        }
        assert_eq!(ResourceStatus::from_id(0), None);
        assert_eq!(ResourceStatus::from_id(5), None);
    }

    #[test]
    fn test_status_toggle() {
        assert_eq!(ResourceStatus::Active.toggled(), ResourceStatus::Inactive);
        assert_eq!(ResourceStatus::Inactive.toggled(), ResourceStatus::Active);
        assert_eq!(ResourceStatus::Pending.toggled(), ResourceStatus::Pending);
        assert_eq!(ResourceStatus::Blocked.toggled(), ResourceStatus::Blocked);
    }

    #[test]
    fn test_page_params_defaults_and_cap() {
        let p = PageParams::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.clamp(), (10, 0));

        let p = PageParams {
            page: Some(2),
            limit: Some(10),
        };
        assert_eq!(p.clamp(), (10, 10));

        let p = PageParams {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(p.page(), 1);
        assert_eq!(p.clamp(), (100, 0));
    }

    #[test]
    fn test_pagination_total_pages() {
        // 25 rows at limit 10 -> 3 pages
        assert_eq!(Pagination::new(2, 10, 25).total_pages, 3);
        assert_eq!(Pagination::new(1, 10, 30).total_pages, 3);
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 1).total_pages, 1);
    }
}
