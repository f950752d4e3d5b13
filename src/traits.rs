//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use rand::Rng;

use crate::types::*;
use crate::utils::validation::{validate_account_name, validate_pin};

/// Keyed account record store
///
/// The ledger only ever mutates balances and digests through the conditional
/// operations below, so any backend offering compare-and-swap on a single
/// record can serve it.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account, failing with `DuplicateAccount` if the id exists
    async fn insert_account(&self, account: &Account) -> LedgerResult<()>;

    /// Get an account by id
    async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>>;

    /// Get an account whose id and PIN digest both match
    async fn find_account(&self, account_id: &str, pin_digest: &str)
        -> LedgerResult<Option<Account>>;

    /// Store `new_balance` only if the stored balance still equals `expected`
    ///
    /// Returns `false` when the balance changed since it was read.
    async fn update_balance(
        &self,
        account_id: &str,
        expected: &BigDecimal,
        new_balance: &BigDecimal,
    ) -> LedgerResult<bool>;

    /// Replace the PIN digest only if it still equals `expected`
    async fn update_pin_digest(
        &self,
        account_id: &str,
        expected: &str,
        new_digest: &str,
    ) -> LedgerResult<bool>;

    /// Apply several balance updates so that either all or none take effect
    ///
    /// Returns `false` if any expected balance no longer holds; nothing is
    /// applied in that case. The default implementation applies the updates
    /// one at a time and rolls back the applied prefix when a later step
    /// conflicts or fails. Backends with multi-record transactions should
    /// override it.
    async fn update_balances(&self, updates: &[BalanceUpdate]) -> LedgerResult<bool> {
        let mut applied: Vec<&BalanceUpdate> = Vec::with_capacity(updates.len());

        for update in updates {
            let outcome = self
                .update_balance(&update.account_id, &update.expected, &update.new_balance)
                .await;

            if let Ok(true) = outcome {
                applied.push(update);
                continue;
            }

            if let Err(rollback_err) = self.roll_back(&applied).await {
                return Err(reconciliation_error(updates, rollback_err.to_string()));
            }
            return outcome.map(|_| false);
        }

        Ok(true)
    }

    /// Undo already applied updates, newest first
    ///
    /// Each update is undone by its delta against the current balance rather
    /// than by restoring the old value, so movements that landed on the same
    /// account in the meantime are kept.
    async fn roll_back(&self, applied: &[&BalanceUpdate]) -> LedgerResult<()> {
        for update in applied.iter().rev() {
            let delta = update.delta();
            let mut restored = false;

            for _ in 0..ROLLBACK_ATTEMPTS {
                let current = self
                    .get_account(&update.account_id)
                    .await?
                    .ok_or_else(|| LedgerError::AccountNotFound(update.account_id.clone()))?;
                let reverted = &current.balance - &delta;
                if reverted < BigDecimal::from(0) {
                    return Err(LedgerError::Conflict(format!(
                        "account {} no longer covers the rollback of {}",
                        update.account_id, delta
                    )));
                }

                if self
                    .update_balance(&update.account_id, &current.balance, &reverted)
                    .await?
                {
                    restored = true;
                    break;
                }
            }

            if !restored {
                return Err(LedgerError::Conflict(format!(
                    "account {} kept changing during rollback",
                    update.account_id
                )));
            }
        }
        Ok(())
    }
}

/// Compare-and-swap attempts per account when undoing a partial update
const ROLLBACK_ATTEMPTS: usize = 64;

fn reconciliation_error(updates: &[BalanceUpdate], reason: String) -> LedgerError {
    let debit = updates.iter().find(|u| u.new_balance < u.expected);
    let credit = updates.iter().find(|u| u.new_balance > u.expected);
    let amount = debit
        .map(|u| &u.expected - &u.new_balance)
        .unwrap_or_else(|| BigDecimal::from(0));

    LedgerError::ReconciliationRequired {
        from: debit.map(|u| u.account_id.clone()).unwrap_or_default(),
        to: credit.map(|u| u.account_id.clone()).unwrap_or_default(),
        amount,
        reason,
    }
}

/// Append-only store of transaction records
#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Append one immutable record
    async fn append(&self, record: &TransactionRecord) -> LedgerResult<()>;

    /// Every record where the account is source or destination
    async fn records_for_account(&self, account_id: &str) -> LedgerResult<Vec<TransactionRecord>>;
}

/// Source of candidate account numbers
pub trait AccountIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Uniformly samples six-digit account numbers
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomAccountIds;

impl AccountIdGenerator for RandomAccountIds {
    fn next_id(&self) -> String {
        let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
        format!("{:06}", n)
    }
}

/// Trait for implementing custom account validation rules
pub trait AccountValidator: Send + Sync {
    /// Validate the fields of a new account before it is stored
    fn validate_new_account(&self, name: &str, pin: &str) -> LedgerResult<()>;

    /// Validate a replacement PIN
    fn validate_new_pin(&self, pin: &str) -> LedgerResult<()>;
}

/// Default account validator: non-empty name, four-digit PIN
pub struct DefaultAccountValidator;

impl AccountValidator for DefaultAccountValidator {
    fn validate_new_account(&self, name: &str, pin: &str) -> LedgerResult<()> {
        validate_account_name(name)?;
        validate_pin(pin)
    }

    fn validate_new_pin(&self, pin: &str) -> LedgerResult<()> {
        validate_pin(pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_six_digits() {
        let ids = RandomAccountIds;
        for _ in 0..100 {
            let id = ids.next_id();
            assert_eq!(id.len(), 6);
            assert!(id.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_default_validator() {
        let validator = DefaultAccountValidator;
        assert!(validator.validate_new_account("Ada", "1234").is_ok());
        assert!(validator.validate_new_account("  ", "1234").is_err());
        assert!(validator.validate_new_account("Ada", "12345").is_err());
        assert!(validator.validate_new_pin("12a4").is_err());
    }
}
