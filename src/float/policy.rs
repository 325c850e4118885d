//! Float Policy operations
//!
//! Each operation validates its own preconditions, then delegates the actual
//! money movement to the Transfer Engine (defense in depth: the engine
//! re-validates currency and available funds under row locks).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

use super::repo::OrgBalanceRepository;
use crate::account::{AccountRef, OrgBalance};
use crate::engine::{TransferCommand, TransferEngine, TransferError};
use crate::ledger::{LedgerEntry, LedgerEntryId, LedgerError, LedgerWriter, OperationType};

#[derive(Error, Debug)]
pub enum FloatError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Float balance not found: {0}")]
    BalanceNotFound(Uuid),

    #[error("No float line between {base_org_id} and {dest_org_id} in this currency")]
    FloatLineNotFound {
        base_org_id: Uuid,
        dest_org_id: Uuid,
    },

    #[error("Float limit must not be negative")]
    NegativeLimit,
}

/// Result of a periodic balance close
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct PeriodCloseReport {
    pub closed_count: u64,
    pub period_start: DateTime<Utc>,
}

pub struct FloatPolicy;

impl FloatPolicy {
    /// One-sided credit into any account variant
    pub async fn topup(
        pool: &PgPool,
        destination: AccountRef,
        amount: Decimal,
        currency_id: Uuid,
        actor: Uuid,
        description: String,
        cid: Option<String>,
    ) -> Result<LedgerEntry, FloatError> {
        let entry = TransferEngine::execute(
            pool,
            TransferCommand {
                operation: OperationType::Topup,
                source: None,
                destination: Some(destination),
                amount,
                currency_id,
                actor_user_id: actor,
                description,
                cid,
            },
        )
        .await?;
        Ok(entry)
    }

    /// One-sided debit out of any account variant
    pub async fn withdraw(
        pool: &PgPool,
        source: AccountRef,
        amount: Decimal,
        currency_id: Uuid,
        actor: Uuid,
        description: String,
        cid: Option<String>,
    ) -> Result<LedgerEntry, FloatError> {
        let entry = TransferEngine::execute(
            pool,
            TransferCommand {
                operation: OperationType::Withdrawal,
                source: Some(source),
                destination: None,
                amount,
                currency_id,
                actor_user_id: actor,
                description,
                cid,
            },
        )
        .await?;
        Ok(entry)
    }

    /// Deposit from a bank account into the organisation's own main float
    /// (base_org == dest_org)
    pub async fn prefund(
        pool: &PgPool,
        organisation_id: Uuid,
        bank_account_id: Uuid,
        amount: Decimal,
        currency_id: Uuid,
        actor: Uuid,
        description: String,
        cid: Option<String>,
    ) -> Result<LedgerEntry, FloatError> {
        let float =
            OrgBalanceRepository::find_or_create(pool, organisation_id, organisation_id, currency_id)
                .await?;

        let entry = TransferEngine::execute(
            pool,
            TransferCommand {
                operation: OperationType::Prefund,
                source: Some(AccountRef::bank_account(bank_account_id)),
                destination: Some(AccountRef::org_balance(float.id)),
                amount,
                currency_id,
                actor_user_id: actor,
                description,
                cid,
            },
        )
        .await?;
        Ok(entry)
    }

    /// Extend float to a partner organisation. Creates the float line with a
    /// zero opening balance if absent. When a bank account is supplied the
    /// amount moves bank -> float in one atomic two-sided transfer; otherwise
    /// the float is credited one-sided.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_agency_float(
        pool: &PgPool,
        base_org_id: Uuid,
        dest_org_id: Uuid,
        amount: Decimal,
        currency_id: Uuid,
        bank_account_id: Option<Uuid>,
        actor: Uuid,
        description: String,
        cid: Option<String>,
    ) -> Result<LedgerEntry, FloatError> {
        let float =
            OrgBalanceRepository::find_or_create(pool, base_org_id, dest_org_id, currency_id)
                .await?;

        let entry = TransferEngine::execute(
            pool,
            TransferCommand {
                operation: OperationType::AgencyFloatCreate,
                source: bank_account_id.map(AccountRef::bank_account),
                destination: Some(AccountRef::org_balance(float.id)),
                amount,
                currency_id,
                actor_user_id: actor,
                description,
                cid,
            },
        )
        .await?;
        Ok(entry)
    }

    /// Symmetric debit from a partner float line. Fails if the line does not
    /// exist or the debit would go below zero.
    #[allow(clippy::too_many_arguments)]
    pub async fn reduce_float(
        pool: &PgPool,
        base_org_id: Uuid,
        dest_org_id: Uuid,
        amount: Decimal,
        currency_id: Uuid,
        actor: Uuid,
        description: String,
        cid: Option<String>,
    ) -> Result<LedgerEntry, FloatError> {
        let float = OrgBalanceRepository::find(pool, base_org_id, dest_org_id, currency_id)
            .await?
            .ok_or(FloatError::FloatLineNotFound {
                base_org_id,
                dest_org_id,
            })?;

        let entry = TransferEngine::execute(
            pool,
            TransferCommand {
                operation: OperationType::AgencyFloatReduce,
                source: Some(AccountRef::org_balance(float.id)),
                destination: None,
                amount,
                currency_id,
                actor_user_id: actor,
                description,
                cid,
            },
        )
        .await?;
        Ok(entry)
    }

    /// Edit the cap on a float line. Metadata only; no balance movement.
    pub async fn update_float_limit(
        pool: &PgPool,
        balance_id: Uuid,
        new_limit: Option<Decimal>,
    ) -> Result<OrgBalance, FloatError> {
        if let Some(limit) = new_limit {
            if limit < Decimal::ZERO {
                return Err(FloatError::NegativeLimit);
            }
        }

        OrgBalanceRepository::update_limit(pool, balance_id, new_limit)
            .await?
            .ok_or(FloatError::BalanceNotFound(balance_id))
    }

    /// Close the current float period: snapshot every org balance into a
    /// PERIOD_CLOSE ledger entry and stamp a new period start. Balances are
    /// not mutated; the snapshot entries carry amount 0 so ledger
    /// reconciliation is unaffected.
    pub async fn close_periodic_balances(
        pool: &PgPool,
        actor: Uuid,
    ) -> Result<PeriodCloseReport, FloatError> {
        let mut tx = pool.begin().await?;
        let period_start = Utc::now();

        let rows = sqlx::query(
            r#"
            SELECT id, currency_id, balance, locked_balance
            FROM org_balances
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let snapshot_ids: Vec<Uuid> = rows.iter().map(|row| row.get("id")).collect();

        let mut closed_count = 0u64;
        for row in &rows {
            let id: Uuid = row.get("id");
            let currency_id: Uuid = row.get("currency_id");
            let balance: Decimal = row.get("balance");
            let locked_balance: Decimal = row.get("locked_balance");

            let entry = LedgerEntry {
                id: LedgerEntryId::new(),
                cid: None,
                operation: OperationType::PeriodClose,
                source: Some(AccountRef::org_balance(id)),
                destination: None,
                amount: Decimal::ZERO,
                currency_id,
                source_balance_after: Some(balance),
                destination_balance_after: None,
                actor_user_id: actor,
                description: format!(
                    "period close: balance={}, locked_balance={}",
                    balance, locked_balance
                ),
                occurred_at: period_start,
            };
            LedgerWriter::append(&mut *tx, &entry).await?;
            closed_count += 1;
        }

        // Stamp only the rows snapshotted above; a line created while this
        // transaction runs keeps its own period_start.
        sqlx::query(
            "UPDATE org_balances SET period_start = $1, updated_at = NOW() WHERE id = ANY($2)",
        )
        .bind(period_start)
        .bind(&snapshot_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(closed_count, %period_start, "Float period closed");
        Ok(PeriodCloseReport {
            closed_count,
            period_start,
        })
    }
}
