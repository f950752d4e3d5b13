//! Request and response bodies
//!
//! Field names follow the wire format of the ATM endpoints.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::TransactionRecord;

/// Amounts given either as a decimal string or a JSON number
///
/// JSON numbers reach serde as `f64`. They are re-read from their shortest
/// decimal rendering so `0.1` becomes exactly `0.1`, not its binary expansion.
pub mod amount {
    use std::fmt;
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use serde::de::{self, Deserializer, Visitor};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = BigDecimal;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a decimal number or a decimal string")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<BigDecimal, E> {
            Ok(BigDecimal::from(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<BigDecimal, E> {
            Ok(BigDecimal::from(value))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<BigDecimal, E> {
            if !value.is_finite() {
                return Err(E::custom("amount must be finite"));
            }
            // Display prints the shortest digits that round-trip
            BigDecimal::from_str(&value.to_string()).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<BigDecimal, E> {
            BigDecimal::from_str(value.trim()).map_err(E::custom)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub pin: String,
}

/// Body shared by deposit and withdraw
#[derive(Debug, Clone, Deserialize)]
pub struct AmountRequest {
    pub account_number: String,
    pub pin: String,
    #[serde(deserialize_with = "amount::deserialize")]
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    pub from_account: String,
    pub from_pin: String,
    pub to_account: String,
    #[serde(deserialize_with = "amount::deserialize")]
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePinRequest {
    pub account_number: String,
    pub old_pin: String,
    pub new_pin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementRequest {
    pub account_number: String,
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountResponse {
    pub message: String,
    pub account_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub message: String,
    pub account_number: String,
    pub balance: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResponse {
    pub message: String,
    pub reference: String,
    pub from_account: String,
    pub to_account: String,
    pub amount: BigDecimal,
    /// Source balance after the transfer
    pub balance: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementResponse {
    pub account_number: String,
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
