//! HTTP handlers
//!
//! Thin layer over the repositories and the float policy: validate the
//! request, call the domain, map errors onto HTTP statuses.

pub mod balances;
pub mod bank_accounts;
pub mod charges;
pub mod corridors;
pub mod health;
pub mod integrations;
pub mod organisations;

pub use health::{HealthResponse, health_check};
