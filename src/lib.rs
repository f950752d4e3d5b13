//! # ATM Ledger
//!
//! A minimal ledger for PIN-gated pseudo-bank accounts: open an account,
//! deposit, withdraw, transfer between accounts, change the PIN and read a
//! statement of every movement.
//!
//! ## Features
//!
//! - **Non-negative balances**: withdrawals and transfers re-check the balance
//!   under compare-and-swap, so concurrent debits can never overdraw
//! - **Atomic transfers**: debit and credit are applied together or not at all
//! - **Undifferentiated authentication errors**: unknown accounts and wrong
//!   PINs look the same to the caller
//! - **Append-only audit trail**: one record per deposit or withdrawal, two per
//!   transfer
//! - **Storage abstraction**: the ledger works against the [`AccountStore`] and
//!   [`TransactionLog`] traits; [`utils::MemoryStorage`] implements both
//! - **HTTP transport**: an axum router behind the `server` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use atm_ledger::{utils::MemoryStorage, Ledger};
//! use bigdecimal::BigDecimal;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let ledger = Ledger::new(MemoryStorage::new());
//! let account = ledger.create_account("Ada", "1234").await.unwrap();
//!
//! let receipt = ledger
//!     .deposit(&account.id, "1234", &BigDecimal::from(50))
//!     .await
//!     .unwrap();
//! assert_eq!(receipt.balance, BigDecimal::from(50));
//! # });
//! ```

#[cfg(feature = "server")]
pub mod api;
pub mod config;
pub mod credential;
pub mod ledger;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::LedgerConfig;
pub use credential::pin_digest;
pub use ledger::*;
pub use traits::*;
pub use types::*;

// Re-export record patterns for convenience
pub use ledger::transaction::patterns;
