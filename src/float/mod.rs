//! Float Policy
//!
//! Domain rules for organisation float balances, layered on the Transfer
//! Engine: prefunding, agency float creation and reduction, float-limit edits,
//! and periodic balance closing.

pub mod policy;
pub mod repo;

pub use policy::{FloatError, FloatPolicy, PeriodCloseReport};
pub use repo::OrgBalanceRepository;
