//! Transaction recording and statements

use bigdecimal::BigDecimal;
use tracing::error;

use crate::traits::*;
use crate::types::*;

/// Transaction manager for the audit trail
pub struct TransactionManager<S: TransactionLog> {
    storage: S,
}

impl<S: TransactionLog> TransactionManager<S> {
    /// Create a new transaction manager
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Append records for a movement whose balance change already committed
    ///
    /// The caller has been told the movement succeeded, so a failed append is
    /// logged for operators and otherwise swallowed. Returns how many records
    /// were written.
    pub async fn record(&self, records: &[TransactionRecord]) -> usize {
        let mut written = 0;
        for record in records {
            match self.storage.append(record).await {
                Ok(()) => written += 1,
                Err(err) => {
                    error!(
                        record = %record.id,
                        reference = %record.reference,
                        kind = %record.kind,
                        to = %record.to,
                        amount = %record.amount,
                        error = %err,
                        "failed to insert transaction record"
                    );
                }
            }
        }
        written
    }

    /// Every record where the account is source or destination
    pub async fn statement(&self, account_id: &str) -> LedgerResult<Vec<TransactionRecord>> {
        self.storage.records_for_account(account_id).await
    }
}

/// Record shapes for each kind of movement
pub mod patterns {
    use super::*;

    /// Fresh reference for a movement
    pub fn new_reference() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Record for cash paid into `account_id`
    pub fn deposit(reference: String, account_id: &str, amount: BigDecimal) -> TransactionRecord {
        TransactionRecord::new(
            reference,
            None,
            account_id.to_string(),
            TransactionKind::Deposit,
            amount,
        )
    }

    /// Record for cash taken out of `account_id`
    pub fn withdraw(reference: String, account_id: &str, amount: BigDecimal) -> TransactionRecord {
        TransactionRecord::new(
            reference,
            None,
            account_id.to_string(),
            TransactionKind::Withdraw,
            amount,
        )
    }

    /// Outgoing and incoming legs of a transfer, in that order
    pub fn transfer(
        reference: String,
        from: &str,
        to: &str,
        amount: BigDecimal,
    ) -> [TransactionRecord; 2] {
        let leg = |kind| {
            TransactionRecord::new(
                reference.clone(),
                Some(from.to_string()),
                to.to_string(),
                kind,
                amount.clone(),
            )
        };
        [leg(TransactionKind::TransferOut), leg(TransactionKind::TransferIn)]
    }
}
