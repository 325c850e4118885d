//! Transfer Engine
//!
//! Atomically moves an amount between two resolved accounts, or into/out of a
//! single account for top-up and withdrawal. Both balance mutations and the
//! ledger write happen inside one PostgreSQL transaction; the accounts involved
//! are row-locked (`FOR UPDATE`) so concurrent transfers against the same
//! account serialize while transfers on disjoint accounts run in parallel.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Row, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::account::{Account, AccountDirectory, AccountRef, AccountType, DirectoryError};
use crate::ledger::{LedgerEntry, LedgerEntryId, LedgerError, LedgerWriter, OperationType};

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountRef),

    #[error("Currency mismatch on account {0}")]
    CurrencyMismatch(AccountRef),

    #[error("Insufficient funds on account {0}")]
    InsufficientFunds(AccountRef),

    #[error("Invalid amount: must be positive")]
    InvalidAmount,

    #[error("Transfer needs a source, a destination, or both")]
    NoAccounts,

    #[error("Source and destination accounts are the same")]
    SameAccount,

    #[error("Float limit exceeded: limit is {limit}")]
    FloatLimitExceeded { limit: Decimal },
}

impl From<DirectoryError> for TransferError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::NotFound(r) => TransferError::AccountNotFound(r),
            DirectoryError::Database(e) => TransferError::Database(e),
        }
    }
}

/// A validated request for one balance movement
#[derive(Debug, Clone)]
pub struct TransferCommand {
    pub operation: OperationType,
    pub source: Option<AccountRef>,
    pub destination: Option<AccountRef>,
    pub amount: Decimal,
    pub currency_id: Uuid,
    pub actor_user_id: Uuid,
    pub description: String,
    /// Client idempotency key; a replayed cid returns the original entry
    pub cid: Option<String>,
}

pub struct TransferEngine;

impl TransferEngine {
    /// Validate and atomically apply one balance movement
    pub async fn execute(
        pool: &PgPool,
        cmd: TransferCommand,
    ) -> Result<LedgerEntry, TransferError> {
        validate_command(&cmd)?;

        // IDEMPOTENCY CHECK: a cid that already hit the ledger is a retry,
        // not a new movement. Return the original entry.
        if let Some(cid) = &cmd.cid {
            if let Some(existing) = LedgerWriter::get_by_cid(pool, cid).await? {
                tracing::info!(
                    entry_id = %existing.id,
                    cid = %cid,
                    "Ledger entry with cid already exists - returning existing entry (idempotent)"
                );
                return Ok(existing);
            }
        }

        let mut tx = pool.begin().await?;

        // Lock in a stable order so opposing transfers cannot deadlock.
        let mut refs: Vec<AccountRef> = cmd
            .source
            .iter()
            .chain(cmd.destination.iter())
            .copied()
            .collect();
        refs.sort_by_key(|r| (r.account_type.id(), r.id));

        let mut locked: Vec<Account> = Vec::with_capacity(refs.len());
        for r in &refs {
            let account = AccountDirectory::lock(&mut *tx, r).await?;
            if account.currency_id != cmd.currency_id {
                return Err(TransferError::CurrencyMismatch(*r));
            }
            locked.push(account);
        }

        let find = |r: &AccountRef| -> &Account {
            locked
                .iter()
                .find(|a| a.account_ref == *r)
                .expect("locked account present for command ref")
        };

        // Debit side
        let mut source_balance_after = None;
        if let Some(src) = &cmd.source {
            let account = find(src);
            check_available(account.balance, account.locked_balance, cmd.amount)
                .map_err(|_| TransferError::InsufficientFunds(*src))?;
            source_balance_after = Some(apply_delta(&mut tx, src, -cmd.amount).await?);
        }

        // Credit side
        let mut destination_balance_after = None;
        if let Some(dst) = &cmd.destination {
            let account = find(dst);
            if dst.account_type == AccountType::OrgBalance {
                let limit = fetch_float_limit(&mut tx, dst.id).await?;
                check_credit_limit(account.balance, cmd.amount, limit)?;
            }
            destination_balance_after = Some(apply_delta(&mut tx, dst, cmd.amount).await?);
        }

        let entry = LedgerEntry {
            id: LedgerEntryId::new(),
            cid: cmd.cid.clone(),
            operation: cmd.operation,
            source: cmd.source,
            destination: cmd.destination,
            amount: cmd.amount,
            currency_id: cmd.currency_id,
            source_balance_after,
            destination_balance_after,
            actor_user_id: cmd.actor_user_id,
            description: cmd.description.clone(),
            occurred_at: Utc::now(),
        };

        let committed: Result<(), TransferError> = async {
            LedgerWriter::append(&mut *tx, &entry).await?;
            tx.commit().await?;
            Ok(())
        }
        .await;

        if let Err(e) = committed {
            // The pre-check above can miss a concurrent request carrying the
            // same cid; the unique index on ledger_entries.cid is the
            // authority. The losing transaction has rolled back, so return
            // the entry the winner committed.
            if let Some(cid) = &cmd.cid {
                if is_cid_conflict(&e) {
                    if let Some(existing) = LedgerWriter::get_by_cid(pool, cid).await? {
                        tracing::info!(
                            entry_id = %existing.id,
                            cid = %cid,
                            "Concurrent request with this cid committed first - returning its entry"
                        );
                        return Ok(existing);
                    }
                }
            }
            return Err(e);
        }

        tracing::info!(
            entry_id = %entry.id,
            operation = %entry.operation,
            amount = %entry.amount,
            "Transfer applied"
        );
        Ok(entry)
    }
}

/// Apply a signed delta to an account's balance, returning the new balance.
/// The row is already locked; the caller validated the resulting balance.
async fn apply_delta(
    tx: &mut Transaction<'_, Postgres>,
    account_ref: &AccountRef,
    delta: Decimal,
) -> Result<Decimal, TransferError> {
    let sql = format!(
        "UPDATE {} SET balance = balance + $1, updated_at = NOW() WHERE id = $2 RETURNING balance",
        account_ref.account_type.table()
    );

    let row = sqlx::query(&sql)
        .bind(delta)
        .bind(account_ref.id)
        .fetch_one(&mut **tx)
        .await?;

    Ok(row.get::<Decimal, _>("balance"))
}

async fn fetch_float_limit(
    tx: &mut Transaction<'_, Postgres>,
    balance_id: Uuid,
) -> Result<Option<Decimal>, TransferError> {
    let row = sqlx::query("SELECT balance_limit FROM org_balances WHERE id = $1")
        .bind(balance_id)
        .fetch_one(&mut **tx)
        .await?;

    Ok(row.get::<Option<Decimal>, _>("balance_limit"))
}

/// True when the error is the unique violation raised by a duplicate cid
fn is_cid_conflict(e: &TransferError) -> bool {
    let db_err = match e {
        TransferError::Database(sqlx::Error::Database(db)) => db,
        TransferError::Ledger(LedgerError::Database(sqlx::Error::Database(db))) => db,
        _ => return false,
    };
    db_err.code().as_deref() == Some("23505")
}

fn validate_command(cmd: &TransferCommand) -> Result<(), TransferError> {
    if cmd.amount <= Decimal::ZERO {
        return Err(TransferError::InvalidAmount);
    }
    match (&cmd.source, &cmd.destination) {
        (None, None) => Err(TransferError::NoAccounts),
        (Some(s), Some(d)) if s == d => Err(TransferError::SameAccount),
        _ => Ok(()),
    }
}

/// A debit may only spend the unlocked portion of the balance
fn check_available(
    balance: Decimal,
    locked_balance: Decimal,
    amount: Decimal,
) -> Result<(), TransferError> {
    if balance - locked_balance < amount {
        // Caller maps to the offending account ref
        return Err(TransferError::InvalidAmount);
    }
    Ok(())
}

/// A credit to a capped float line may not push the balance past the limit
fn check_credit_limit(
    balance: Decimal,
    amount: Decimal,
    limit: Option<Decimal>,
) -> Result<(), TransferError> {
    if let Some(limit) = limit {
        if balance + amount > limit {
            return Err(TransferError::FloatLimitExceeded { limit });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cmd(
        source: Option<AccountRef>,
        destination: Option<AccountRef>,
        amount: Decimal,
    ) -> TransferCommand {
        TransferCommand {
            operation: OperationType::Topup,
            source,
            destination,
            amount,
            currency_id: Uuid::new_v4(),
            actor_user_id: Uuid::new_v4(),
            description: String::new(),
            cid: None,
        }
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let dst = AccountRef::bank_account(Uuid::new_v4());
        assert!(matches!(
            validate_command(&cmd(None, Some(dst), Decimal::ZERO)),
            Err(TransferError::InvalidAmount)
        ));
        assert!(matches!(
            validate_command(&cmd(None, Some(dst), dec!(-5))),
            Err(TransferError::InvalidAmount)
        ));
    }

    #[test]
    fn test_rejects_missing_accounts() {
        assert!(matches!(
            validate_command(&cmd(None, None, dec!(1))),
            Err(TransferError::NoAccounts)
        ));
    }

    #[test]
    fn test_rejects_same_account() {
        let r = AccountRef::vault(Uuid::new_v4());
        assert!(matches!(
            validate_command(&cmd(Some(r), Some(r), dec!(1))),
            Err(TransferError::SameAccount)
        ));
    }

    #[test]
    fn test_available_respects_locked_balance() {
        // balance=100, locked=20: 81 must fail, 79 must pass
        assert!(check_available(dec!(100), dec!(20), dec!(81)).is_err());
        assert!(check_available(dec!(100), dec!(20), dec!(79)).is_ok());
        // exactly the available amount is spendable
        assert!(check_available(dec!(100), dec!(20), dec!(80)).is_ok());
    }

    #[test]
    fn test_credit_limit() {
        assert!(check_credit_limit(dec!(90), dec!(10), Some(dec!(100))).is_ok());
        assert!(matches!(
            check_credit_limit(dec!(90), dec!(11), Some(dec!(100))),
            Err(TransferError::FloatLimitExceeded { .. })
        ));
        // no limit set: any credit passes
        assert!(check_credit_limit(dec!(90), dec!(1000), None).is_ok());
    }
}
