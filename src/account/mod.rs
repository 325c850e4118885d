//! Account variants and the Account Directory
//!
//! Four account variants carry a balance: bank accounts, vaults, organisation
//! float balances and GL accounts. The directory resolves a `(type, id)` pair
//! to a live balance row.

pub mod directory;
pub mod models;

pub use directory::{AccountDirectory, DirectoryError};
pub use models::{Account, AccountRef, AccountType, OrgBalance};
