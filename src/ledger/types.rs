//! Ledger entry types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::account::AccountRef;

/// Ledger entry ID - ULID-based unique identifier
///
/// Using ULID provides:
/// - Monotonic, sortable IDs
/// - No coordination needed (no machine_id)
/// - 128-bit with good entropy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedgerEntryId(ulid::Ulid);

impl LedgerEntryId {
    /// Generate a new unique LedgerEntryId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for LedgerEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LedgerEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LedgerEntryId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

impl Serialize for LedgerEntryId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for LedgerEntryId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Balance-affecting operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum OperationType {
    Topup = 1,
    Withdrawal = 2,
    Prefund = 3,
    AgencyFloatCreate = 4,
    AgencyFloatReduce = 5,
    PeriodClose = 6,
}

impl OperationType {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(OperationType::Topup),
            2 => Some(OperationType::Withdrawal),
            3 => Some(OperationType::Prefund),
            4 => Some(OperationType::AgencyFloatCreate),
            5 => Some(OperationType::AgencyFloatReduce),
            6 => Some(OperationType::PeriodClose),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Topup => "TOPUP",
            OperationType::Withdrawal => "WITHDRAWAL",
            OperationType::Prefund => "PREFUND",
            OperationType::AgencyFloatCreate => "AGENCY_FLOAT_CREATE",
            OperationType::AgencyFloatReduce => "AGENCY_FLOAT_REDUCE",
            OperationType::PeriodClose => "PERIOD_CLOSE",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable record of one balance-affecting operation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerEntry {
    /// ULID, sortable by creation time
    #[schema(value_type = String)]
    pub id: LedgerEntryId,
    /// Client idempotency key, when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    pub operation: OperationType,
    pub source: Option<AccountRef>,
    pub destination: Option<AccountRef>,
    pub amount: Decimal,
    pub currency_id: Uuid,
    /// Source balance after the debit, when a source was involved
    pub source_balance_after: Option<Decimal>,
    /// Destination balance after the credit, when a destination was involved
    pub destination_balance_after: Option<Decimal>,
    pub actor_user_id: Uuid,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ledger[{}] {} amount={} currency={} actor={}",
            self.id, self.operation, self.amount, self.currency_id, self.actor_user_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_type_roundtrip() {
        for op in [
            OperationType::Topup,
            OperationType::Withdrawal,
            OperationType::Prefund,
            OperationType::AgencyFloatCreate,
            OperationType::AgencyFloatReduce,
            OperationType::PeriodClose,
        ] {
            assert_eq!(OperationType::from_id(op.id()), Some(op));
        }
        assert_eq!(OperationType::from_id(0), None);
        assert_eq!(OperationType::from_id(7), None);
    }

    #[test]
    fn test_operation_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&OperationType::AgencyFloatCreate).unwrap(),
            r#""AGENCY_FLOAT_CREATE""#
        );
        let op: OperationType = serde_json::from_str(r#""PERIOD_CLOSE""#).unwrap();
        assert_eq!(op, OperationType::PeriodClose);
    }

    #[test]
    fn test_ledger_entry_id_parse_roundtrip() {
        let id = LedgerEntryId::new();
        let parsed: LedgerEntryId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
