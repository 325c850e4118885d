//! remitdesk - Money-Remittance Back-Office Core
//!
//! CRUD administration of corridors, charges, integrations, organisations and
//! bank accounts, plus the float/balance-operations subsystem that moves money
//! between bank accounts, vaults, organisation float balances and GL accounts.
//!
//! # Modules
//!
//! - [`account`] - Account variants and the Account Directory
//! - [`ledger`] - Append-only ledger entries for every balance movement
//! - [`engine`] - Transfer Engine (atomic, row-locked balance mutation)
//! - [`float`] - Float Policy (prefund, agency float, period close)
//! - [`stats`] - Read-only rollups for dashboard widgets
//! - [`resources`] - CRUD repositories (corridors, charges, ...)
//! - [`gateway`] - Axum HTTP gateway
//! - [`auth`] - Bearer JWT actor authentication

pub mod config;
pub mod db;
pub mod logging;
pub mod money;
pub mod schema;

pub mod account;
pub mod engine;
pub mod float;
pub mod ledger;
pub mod stats;

pub mod auth;
pub mod gateway;
pub mod resources;

// Convenient re-exports at crate root
pub use account::{Account, AccountDirectory, AccountRef, AccountType};
pub use engine::{TransferCommand, TransferEngine, TransferError};
pub use ledger::{LedgerEntry, LedgerEntryId, LedgerWriter, OperationType};
