//! Core types and data structures for the ATM ledger

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A PIN-gated, balance-holding account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Six-digit account number, immutable after creation
    pub id: String,
    /// Display name of the account holder
    pub name: String,
    /// Hex SHA-256 digest of the PIN
    #[serde(skip_serializing, default)]
    pub pin_digest: String,
    /// Current balance, never negative
    pub balance: BigDecimal,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// When the balance or PIN was last changed
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(id: String, name: String, pin_digest: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            pin_digest,
            balance: BigDecimal::from(0),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the balance covers `amount`
    pub fn can_cover(&self, amount: &BigDecimal) -> bool {
        self.balance >= *amount
    }
}

/// Kind of money movement a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Cash paid into an account
    Deposit,
    /// Cash taken out of an account
    Withdraw,
    /// Outgoing leg of a transfer, booked against the source
    TransferOut,
    /// Incoming leg of a transfer, booked against the destination
    TransferIn,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::TransferOut => "transfer_out",
            TransactionKind::TransferIn => "transfer_in",
        };
        f.write_str(label)
    }
}

/// Immutable audit entry for one leg of a money movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier of this record
    pub id: String,
    /// Shared by both legs of a transfer
    pub reference: String,
    /// Source account, absent for deposits and withdrawals
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from: Option<String>,
    /// Destination account (the account acted upon for deposits and withdrawals)
    pub to: String,
    /// What kind of movement this is
    pub kind: TransactionKind,
    /// Amount moved, always positive
    pub amount: BigDecimal,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a new record with a fresh id
    pub fn new(
        reference: String,
        from: Option<String>,
        to: String,
        kind: TransactionKind,
        amount: BigDecimal,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            reference,
            from,
            to,
            kind,
            amount,
            created_at: Utc::now(),
        }
    }

    /// Whether `account_id` is the source or destination of this record
    pub fn involves(&self, account_id: &str) -> bool {
        self.to == account_id || self.from.as_deref() == Some(account_id)
    }
}

/// One compare-and-swap step of a multi-account balance update
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceUpdate {
    /// Account to update
    pub account_id: String,
    /// Balance the caller last observed
    pub expected: BigDecimal,
    /// Balance to store if `expected` still holds
    pub new_balance: BigDecimal,
}

impl BalanceUpdate {
    /// Create an update of `account_id` from `expected` to `new_balance`
    pub fn new(account_id: impl Into<String>, expected: BigDecimal, new_balance: BigDecimal) -> Self {
        Self {
            account_id: account_id.into(),
            expected,
            new_balance,
        }
    }

    /// Signed change this update makes to the balance
    pub fn delta(&self) -> BigDecimal {
        &self.new_balance - &self.expected
    }
}

/// Balance after a deposit or withdrawal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReceipt {
    /// Account the money moved in or out of
    pub account_id: String,
    /// Balance after the movement
    pub balance: BigDecimal,
    /// Reference of the logged record
    pub reference: String,
}

/// Outcome of a transfer, from the source's point of view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Reference shared by both legs
    pub reference: String,
    /// Debited account
    pub from: String,
    /// Credited account
    pub to: String,
    /// Amount moved
    pub amount: BigDecimal,
    /// Source balance after the debit
    pub balance: BigDecimal,
}

/// Whether an error is the caller's fault or the service's
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Server,
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid account number or PIN")]
    InvalidCredentials,
    #[error("invalid destination account number")]
    InvalidDestination,
    #[error("not enough balance in account")]
    InsufficientFunds,
    #[error("account {0} already exists")]
    DuplicateAccount(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),
    #[error("transfer of {amount} from {from} to {to} partially applied and needs reconciliation: {reason}")]
    ReconciliationRequired {
        from: String,
        to: String,
        amount: BigDecimal,
        reason: String,
    },
}

impl LedgerError {
    /// Classify the error for transport status mapping
    pub fn class(&self) -> ErrorClass {
        match self {
            LedgerError::Validation(_)
            | LedgerError::InvalidCredentials
            | LedgerError::InvalidDestination
            | LedgerError::InsufficientFunds
            | LedgerError::DuplicateAccount(_) => ErrorClass::Client,
            LedgerError::AccountNotFound(_)
            | LedgerError::Storage(_)
            | LedgerError::Conflict(_)
            | LedgerError::ReconciliationRequired { .. } => ErrorClass::Server,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for LedgerError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        LedgerError::Storage(format!("lock poisoned: {}", err))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
