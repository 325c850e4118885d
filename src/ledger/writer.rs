//! Ledger Entry Writer
//!
//! Append-only persistence for ledger entries. Entries are written inside the
//! Transfer Engine's transaction so the balance mutation and its audit record
//! commit together.

use rust_decimal::Decimal;
use sqlx::{PgExecutor, Row};
use thiserror::Error;
use uuid::Uuid;

use super::types::{LedgerEntry, LedgerEntryId, OperationType};
use crate::account::{AccountRef, AccountType};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt ledger row: {0}")]
    Corrupt(String),
}

/// Writer and reader for the append-only ledger
pub struct LedgerWriter;

impl LedgerWriter {
    /// Append one entry. No update or delete path exists by construction.
    pub async fn append<'e>(
        exec: impl PgExecutor<'e>,
        entry: &LedgerEntry,
    ) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries
                (id, cid, operation, source_type, source_id,
                 destination_type, destination_id, amount, currency_id,
                 source_balance_after, destination_balance_after,
                 actor_user_id, description, occurred_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.cid)
        .bind(entry.operation.id())
        .bind(entry.source.map(|r| r.account_type.id()))
        .bind(entry.source.map(|r| r.id))
        .bind(entry.destination.map(|r| r.account_type.id()))
        .bind(entry.destination.map(|r| r.id))
        .bind(entry.amount)
        .bind(entry.currency_id)
        .bind(entry.source_balance_after)
        .bind(entry.destination_balance_after)
        .bind(entry.actor_user_id)
        .bind(&entry.description)
        .bind(entry.occurred_at)
        .execute(exec)
        .await?;

        Ok(())
    }

    /// Get an entry by client idempotency key (cid)
    pub async fn get_by_cid<'e>(
        exec: impl PgExecutor<'e>,
        cid: &str,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let row = sqlx::query(&format!("{} WHERE cid = $1", SELECT_ENTRY))
            .bind(cid)
            .fetch_optional(exec)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// Entries touching an account as source or destination, newest first
    pub async fn entries_for_account<'e>(
        exec: impl PgExecutor<'e>,
        account_ref: &AccountRef,
        limit: i64,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let rows = sqlx::query(&format!(
            r#"{}
            WHERE (source_type = $1 AND source_id = $2)
               OR (destination_type = $1 AND destination_id = $2)
            ORDER BY occurred_at DESC, id DESC
            LIMIT $3"#,
            SELECT_ENTRY
        ))
        .bind(account_ref.account_type.id())
        .bind(account_ref.id)
        .bind(limit)
        .fetch_all(exec)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Signed sum of all entries touching an account: debits negative, credits
    /// positive. Used by the reconciliation check against the live balance.
    pub async fn signed_sum_for_account<'e>(
        exec: impl PgExecutor<'e>,
        account_ref: &AccountRef,
    ) -> Result<Decimal, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN destination_type = $1 AND destination_id = $2
                                  THEN amount ELSE 0 END), 0)
              - COALESCE(SUM(CASE WHEN source_type = $1 AND source_id = $2
                                  THEN amount ELSE 0 END), 0) AS net
            FROM ledger_entries
            "#,
        )
        .bind(account_ref.account_type.id())
        .bind(account_ref.id)
        .fetch_one(exec)
        .await?;

        Ok(row.get::<Decimal, _>("net"))
    }
}

const SELECT_ENTRY: &str = r#"
SELECT id, cid, operation, source_type, source_id,
       destination_type, destination_id, amount, currency_id,
       source_balance_after, destination_balance_after,
       actor_user_id, description, occurred_at
FROM ledger_entries"#;

fn row_to_entry(row: &sqlx::postgres::PgRow) -> Result<LedgerEntry, LedgerError> {
    let id_str: String = row.get("id");
    let id: LedgerEntryId = id_str
        .parse()
        .map_err(|_| LedgerError::Corrupt(format!("Invalid ledger entry id: {}", id_str)))?;

    let op_id: i16 = row.get("operation");
    let operation = OperationType::from_id(op_id)
        .ok_or_else(|| LedgerError::Corrupt(format!("Invalid operation id: {}", op_id)))?;

    let source = ref_from_row(row, "source_type", "source_id")?;
    let destination = ref_from_row(row, "destination_type", "destination_id")?;

    Ok(LedgerEntry {
        id,
        cid: row.get("cid"),
        operation,
        source,
        destination,
        amount: row.get("amount"),
        currency_id: row.get("currency_id"),
        source_balance_after: row.get("source_balance_after"),
        destination_balance_after: row.get("destination_balance_after"),
        actor_user_id: row.get("actor_user_id"),
        description: row.get("description"),
        occurred_at: row.get("occurred_at"),
    })
}

fn ref_from_row(
    row: &sqlx::postgres::PgRow,
    type_col: &str,
    id_col: &str,
) -> Result<Option<AccountRef>, LedgerError> {
    let type_id: Option<i16> = row.get(type_col);
    let account_id: Option<Uuid> = row.get(id_col);

    match (type_id, account_id) {
        (Some(t), Some(id)) => {
            let account_type = AccountType::from_id(t)
                .ok_or_else(|| LedgerError::Corrupt(format!("Invalid account type: {}", t)))?;
            Ok(Some(AccountRef::new(account_type, id)))
        }
        (None, None) => Ok(None),
        _ => Err(LedgerError::Corrupt(format!(
            "Half-populated account ref ({}, {})",
            type_col, id_col
        ))),
    }
}
