//! Money types
//!
//! All amounts are `rust_decimal::Decimal`. Floats never touch a balance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Strict format amount - validates format during deserialization
///
/// Validation at the Serde layer:
/// - Rejects `.5` (must be `0.5`)
/// - Rejects `5.` (must be `5.0` or `5`)
/// - Rejects negative numbers
/// - Rejects empty strings
///
/// Business validation (positive, limits, available funds) happens later in the
/// Transfer Engine.
#[derive(Debug, Clone, Copy, ToSchema)]
#[schema(value_type = String, example = "10.50")]
pub struct StrictAmount(Decimal);

impl StrictAmount {
    /// Get the inner Decimal value
    pub fn inner(self) -> Decimal {
        self.0
    }

    #[cfg(test)]
    pub fn from_decimal(d: Decimal) -> Self {
        Self(d)
    }
}

impl std::ops::Deref for StrictAmount {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for StrictAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        // Support both JSON number and JSON string
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DecimalOrString {
            String(String),
            Number(Decimal),
        }

        let value = DecimalOrString::deserialize(deserializer)?;

        match value {
            DecimalOrString::String(s) => {
                if s.is_empty() {
                    return Err(D::Error::custom("Amount cannot be empty"));
                }
                if s.starts_with('.') {
                    return Err(D::Error::custom("Invalid format: use 0.5 not .5"));
                }
                if s.ends_with('.') {
                    return Err(D::Error::custom("Invalid format: use 5.0 not 5."));
                }

                let d = Decimal::from_str(&s)
                    .map_err(|e| D::Error::custom(format!("Invalid decimal: {}", e)))?;

                if d.is_sign_negative() {
                    return Err(D::Error::custom("Amount cannot be negative"));
                }

                Ok(StrictAmount(d))
            }
            DecimalOrString::Number(d) => {
                if d.is_sign_negative() {
                    return Err(D::Error::custom("Amount cannot be negative"));
                }
                Ok(StrictAmount(d))
            }
        }
    }
}

impl Serialize for StrictAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as string to preserve precision
        serializer.serialize_str(&self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(json: &str) -> Result<StrictAmount, serde_json::Error> {
        serde_json::from_str::<StrictAmount>(json)
    }

    #[test]
    fn test_accepts_string_and_number() {
        assert_eq!(parse(r#""10.50""#).unwrap().inner(), dec!(10.50));
        assert_eq!(parse("10.5").unwrap().inner(), dec!(10.5));
        assert_eq!(parse(r#""0""#).unwrap().inner(), Decimal::ZERO);
    }

    #[test]
    fn test_rejects_bad_formats() {
        assert!(parse(r#""""#).is_err());
        assert!(parse(r#"".5""#).is_err());
        assert!(parse(r#""5.""#).is_err());
        assert!(parse(r#""abc""#).is_err());
    }

    #[test]
    fn test_rejects_negative() {
        assert!(parse(r#""-1""#).is_err());
        assert!(parse("-0.01").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let a = StrictAmount::from_decimal(dec!(12.34));
        assert_eq!(serde_json::to_string(&a).unwrap(), r#""12.34""#);
    }
}
