//! Append-only ledger
//!
//! Every balance-affecting operation writes exactly one immutable
//! [`LedgerEntry`]. The signed sum of all entries touching an account must
//! reconcile with that account's current balance.

pub mod types;
pub mod writer;

pub use types::{LedgerEntry, LedgerEntryId, OperationType};
pub use writer::{LedgerError, LedgerWriter};
