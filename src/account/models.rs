//! Data models for balance-bearing accounts

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Account variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum AccountType {
    BankAccount = 1,
    Vault = 2,
    OrgBalance = 3,
    GlAccount = 4,
}

impl AccountType {
    /// Get numeric ID for PostgreSQL storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from PostgreSQL ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(AccountType::BankAccount),
            2 => Some(AccountType::Vault),
            3 => Some(AccountType::OrgBalance),
            4 => Some(AccountType::GlAccount),
            _ => None,
        }
    }

    /// Get human-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::BankAccount => "BANK_ACCOUNT",
            AccountType::Vault => "VAULT",
            AccountType::OrgBalance => "ORG_BALANCE",
            AccountType::GlAccount => "GL_ACCOUNT",
        }
    }

    /// Backing table for this variant. Every table carries the same
    /// (currency_id, balance, locked_balance) columns.
    pub fn table(&self) -> &'static str {
        match self {
            AccountType::BankAccount => "bank_accounts",
            AccountType::Vault => "vaults",
            AccountType::OrgBalance => "org_balances",
            AccountType::GlAccount => "gl_accounts",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for AccountType {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        AccountType::from_id(value).ok_or(())
    }
}

/// Reference to an account: variant + row id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct AccountRef {
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub id: Uuid,
}

impl AccountRef {
    pub fn new(account_type: AccountType, id: Uuid) -> Self {
        Self { account_type, id }
    }

    pub fn bank_account(id: Uuid) -> Self {
        Self::new(AccountType::BankAccount, id)
    }

    pub fn vault(id: Uuid) -> Self {
        Self::new(AccountType::Vault, id)
    }

    pub fn org_balance(id: Uuid) -> Self {
        Self::new(AccountType::OrgBalance, id)
    }

    pub fn gl_account(id: Uuid) -> Self {
        Self::new(AccountType::GlAccount, id)
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.account_type, self.id)
    }
}

/// A resolved, balance-bearing account record
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Account {
    #[serde(flatten)]
    pub account_ref: AccountRef,
    pub currency_id: Uuid,
    pub balance: Decimal,
    pub locked_balance: Decimal,
}

impl Account {
    /// Funds available for debit: balance minus the locked portion
    pub fn available(&self) -> Decimal {
        self.balance - self.locked_balance
    }
}

/// Float balance one organisation holds with another (or with itself, when
/// `base_org_id == dest_org_id` - the organisation's own main float)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct OrgBalance {
    pub id: Uuid,
    pub base_org_id: Uuid,
    pub dest_org_id: Uuid,
    pub currency_id: Uuid,
    pub balance: Decimal,
    pub locked_balance: Decimal,
    /// Optional cap on balance for agency float lines
    pub balance_limit: Option<Decimal>,
    /// Start of the current float period
    pub period_start: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_type_roundtrip() {
        for t in [
            AccountType::BankAccount,
            AccountType::Vault,
            AccountType::OrgBalance,
            AccountType::GlAccount,
        ] {
            assert_eq!(AccountType::from_id(t.id()), Some(t));
        }
        assert_eq!(AccountType::from_id(0), None);
        assert_eq!(AccountType::from_id(5), None);
    }

    #[test]
    fn test_account_type_serde_names() {
        let json = serde_json::to_string(&AccountType::BankAccount).unwrap();
        assert_eq!(json, r#""BANK_ACCOUNT""#);
        let t: AccountType = serde_json::from_str(r#""ORG_BALANCE""#).unwrap();
        assert_eq!(t, AccountType::OrgBalance);
    }

    #[test]
    fn test_available_respects_locked() {
        let acct = Account {
            account_ref: AccountRef::bank_account(Uuid::new_v4()),
            currency_id: Uuid::new_v4(),
            balance: dec!(100),
            locked_balance: dec!(20),
        };
        assert_eq!(acct.available(), dec!(80));
    }
}
