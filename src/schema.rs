//! PostgreSQL schema bootstrap
//!
//! Issues idempotent `CREATE TABLE IF NOT EXISTS` statements at startup.
//! Check constraints encode the account invariant `0 <= locked_balance <= balance`
//! so a bug in the engine can never persist a corrupt balance row.

use anyhow::Result;
use sqlx::PgPool;

const CREATE_COUNTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS countries (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL,
    code        TEXT NOT NULL UNIQUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_CURRENCIES: &str = r#"
CREATE TABLE IF NOT EXISTS currencies (
    id          UUID PRIMARY KEY,
    code        TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          UUID PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_ORGANISATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS organisations (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    country_id  UUID REFERENCES countries(id),
    status      SMALLINT NOT NULL DEFAULT 1,
    created_by  UUID REFERENCES users(id),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_CORRIDORS: &str = r#"
CREATE TABLE IF NOT EXISTS corridors (
    id                      UUID PRIMARY KEY,
    name                    TEXT NOT NULL,
    description             TEXT,
    base_country_id         UUID NOT NULL REFERENCES countries(id),
    destination_country_id  UUID NOT NULL REFERENCES countries(id),
    base_currency_id        UUID NOT NULL REFERENCES currencies(id),
    organisation_id         UUID NOT NULL REFERENCES organisations(id),
    origin_organisation_id  UUID REFERENCES organisations(id),
    status                  SMALLINT NOT NULL DEFAULT 1,
    created_by              UUID REFERENCES users(id),
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_CHARGES: &str = r#"
CREATE TABLE IF NOT EXISTS charges (
    id              UUID PRIMARY KEY,
    name            TEXT NOT NULL,
    description     TEXT,
    charge_kind     SMALLINT NOT NULL DEFAULT 1,
    rate            NUMERIC(20, 8) NOT NULL DEFAULT 0,
    currency_id     UUID REFERENCES currencies(id),
    organisation_id UUID REFERENCES organisations(id),
    status          SMALLINT NOT NULL DEFAULT 1,
    created_by      UUID REFERENCES users(id),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_INTEGRATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS integrations (
    id              UUID PRIMARY KEY,
    name            TEXT NOT NULL,
    description     TEXT,
    endpoint_url    TEXT,
    organisation_id UUID REFERENCES organisations(id),
    status          SMALLINT NOT NULL DEFAULT 1,
    created_by      UUID REFERENCES users(id),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_BANK_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS bank_accounts (
    id              UUID PRIMARY KEY,
    name            TEXT NOT NULL,
    account_number  TEXT NOT NULL,
    bank_name       TEXT NOT NULL,
    currency_id     UUID NOT NULL REFERENCES currencies(id),
    organisation_id UUID NOT NULL REFERENCES organisations(id),
    balance         NUMERIC(20, 8) NOT NULL DEFAULT 0,
    locked_balance  NUMERIC(20, 8) NOT NULL DEFAULT 0,
    status          SMALLINT NOT NULL DEFAULT 1,
    created_by      UUID REFERENCES users(id),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (balance >= 0),
    CHECK (locked_balance >= 0 AND locked_balance <= balance)
)"#;

const CREATE_VAULTS: &str = r#"
CREATE TABLE IF NOT EXISTS vaults (
    id              UUID PRIMARY KEY,
    name            TEXT NOT NULL,
    currency_id     UUID NOT NULL REFERENCES currencies(id),
    organisation_id UUID NOT NULL REFERENCES organisations(id),
    balance         NUMERIC(20, 8) NOT NULL DEFAULT 0,
    locked_balance  NUMERIC(20, 8) NOT NULL DEFAULT 0,
    status          SMALLINT NOT NULL DEFAULT 1,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (balance >= 0),
    CHECK (locked_balance >= 0 AND locked_balance <= balance)
)"#;

const CREATE_GL_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS gl_accounts (
    id              UUID PRIMARY KEY,
    name            TEXT NOT NULL,
    gl_kind         SMALLINT NOT NULL DEFAULT 1,
    currency_id     UUID NOT NULL REFERENCES currencies(id),
    bank_account_id UUID REFERENCES bank_accounts(id),
    balance         NUMERIC(20, 8) NOT NULL DEFAULT 0,
    locked_balance  NUMERIC(20, 8) NOT NULL DEFAULT 0,
    status          SMALLINT NOT NULL DEFAULT 1,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (balance >= 0),
    CHECK (locked_balance >= 0 AND locked_balance <= balance)
)"#;

const CREATE_ORG_BALANCES: &str = r#"
CREATE TABLE IF NOT EXISTS org_balances (
    id              UUID PRIMARY KEY,
    base_org_id     UUID NOT NULL REFERENCES organisations(id),
    dest_org_id     UUID NOT NULL REFERENCES organisations(id),
    currency_id     UUID NOT NULL REFERENCES currencies(id),
    balance         NUMERIC(20, 8) NOT NULL DEFAULT 0,
    locked_balance  NUMERIC(20, 8) NOT NULL DEFAULT 0,
    balance_limit   NUMERIC(20, 8),
    period_start    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (base_org_id, dest_org_id, currency_id),
    CHECK (balance >= 0),
    CHECK (locked_balance >= 0 AND locked_balance <= balance),
    CHECK (balance_limit IS NULL OR balance_limit >= 0)
)"#;

const CREATE_LEDGER_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS ledger_entries (
    id                        TEXT PRIMARY KEY,
    cid                       TEXT UNIQUE,
    operation                 SMALLINT NOT NULL,
    source_type               SMALLINT,
    source_id                 UUID,
    destination_type          SMALLINT,
    destination_id            UUID,
    amount                    NUMERIC(20, 8) NOT NULL,
    currency_id               UUID NOT NULL REFERENCES currencies(id),
    source_balance_after      NUMERIC(20, 8),
    destination_balance_after NUMERIC(20, 8),
    actor_user_id             UUID NOT NULL,
    description               TEXT NOT NULL DEFAULT '',
    occurred_at               TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_LEDGER_SOURCE_IDX: &str = r#"
CREATE INDEX IF NOT EXISTS ledger_entries_source_idx
    ON ledger_entries (source_type, source_id)"#;

const CREATE_LEDGER_DEST_IDX: &str = r#"
CREATE INDEX IF NOT EXISTS ledger_entries_dest_idx
    ON ledger_entries (destination_type, destination_id)"#;

/// Initialize the PostgreSQL schema for the back-office database
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing PostgreSQL schema...");

    let statements: &[(&str, &str)] = &[
        ("countries", CREATE_COUNTRIES),
        ("currencies", CREATE_CURRENCIES),
        ("users", CREATE_USERS),
        ("organisations", CREATE_ORGANISATIONS),
        ("corridors", CREATE_CORRIDORS),
        ("charges", CREATE_CHARGES),
        ("integrations", CREATE_INTEGRATIONS),
        ("bank_accounts", CREATE_BANK_ACCOUNTS),
        ("vaults", CREATE_VAULTS),
        ("gl_accounts", CREATE_GL_ACCOUNTS),
        ("org_balances", CREATE_ORG_BALANCES),
        ("ledger_entries", CREATE_LEDGER_ENTRIES),
        ("ledger_entries_source_idx", CREATE_LEDGER_SOURCE_IDX),
        ("ledger_entries_dest_idx", CREATE_LEDGER_DEST_IDX),
    ];

    for (name, sql) in statements {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", name, e))?;
    }

    tracing::info!("PostgreSQL schema initialized successfully");
    Ok(())
}
