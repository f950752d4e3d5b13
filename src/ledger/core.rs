//! Main ledger orchestrator that coordinates accounts and transactions

use bigdecimal::BigDecimal;
use tracing::{debug, error, info, warn};

use crate::config::LedgerConfig;
use crate::ledger::transaction::patterns;
use crate::ledger::{AccountManager, TransactionManager};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::{validate_account_id, validate_positive_amount};

/// Main ledger system that orchestrates all money movements
///
/// The ledger owns its store handle and is safe to share between concurrent
/// requests behind an `Arc`. Every read-check-write sequence goes through the
/// store's compare-and-swap primitives and is retried on conflict.
pub struct Ledger<S: AccountStore + TransactionLog> {
    account_manager: AccountManager<S>,
    transaction_manager: TransactionManager<S>,
    config: LedgerConfig,
}

impl<S: AccountStore + TransactionLog + Clone> Ledger<S> {
    /// Create a new ledger with the given storage backend
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, LedgerConfig::default())
    }

    /// Create a new ledger with custom tunables
    pub fn with_config(storage: S, config: LedgerConfig) -> Self {
        Self {
            account_manager: AccountManager::new(storage.clone()),
            transaction_manager: TransactionManager::new(storage),
            config,
        }
    }

    /// Create a new ledger with a custom validator and account number source
    pub fn with_components(
        storage: S,
        config: LedgerConfig,
        validator: Box<dyn AccountValidator>,
        id_generator: Box<dyn AccountIdGenerator>,
    ) -> Self {
        Self {
            account_manager: AccountManager::with_components(
                storage.clone(),
                validator,
                id_generator,
            ),
            transaction_manager: TransactionManager::new(storage),
            config,
        }
    }
}

impl<S: AccountStore + TransactionLog> Ledger<S> {
    // Account operations
    /// Open a new account with a zero balance
    pub async fn create_account(&self, name: &str, pin: &str) -> LedgerResult<Account> {
        self.account_manager.create_account(name, pin).await
    }

    /// Get an account by ID, unauthenticated
    pub async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        self.account_manager.get_account(account_id).await
    }

    /// Replace an account's PIN
    pub async fn change_pin(&self, account_id: &str, old_pin: &str, new_pin: &str) -> LedgerResult<()> {
        self.account_manager
            .change_pin(account_id, old_pin, new_pin)
            .await
    }

    // Money movements
    /// Pay `amount` into an account
    pub async fn deposit(
        &self,
        account_id: &str,
        pin: &str,
        amount: &BigDecimal,
    ) -> LedgerResult<BalanceReceipt> {
        validate_positive_amount(amount)?;

        let balance = self
            .update_authenticated(account_id, pin, |account| Ok(&account.balance + amount))
            .await?;

        let reference = patterns::new_reference();
        self.transaction_manager
            .record(&[patterns::deposit(reference.clone(), account_id, amount.clone())])
            .await;

        info!(account = %account_id, amount = %amount, "money deposited");
        Ok(BalanceReceipt {
            account_id: account_id.to_string(),
            balance,
            reference,
        })
    }

    /// Take `amount` out of an account, never driving it negative
    pub async fn withdraw(
        &self,
        account_id: &str,
        pin: &str,
        amount: &BigDecimal,
    ) -> LedgerResult<BalanceReceipt> {
        validate_positive_amount(amount)?;

        let balance = self
            .update_authenticated(account_id, pin, |account| {
                if !account.can_cover(amount) {
                    warn!(account = %account_id, amount = %amount, "withdrawal exceeds balance");
                    return Err(LedgerError::InsufficientFunds);
                }
                Ok(&account.balance - amount)
            })
            .await?;

        let reference = patterns::new_reference();
        self.transaction_manager
            .record(&[patterns::withdraw(reference.clone(), account_id, amount.clone())])
            .await;

        info!(account = %account_id, amount = %amount, "money withdrawn");
        Ok(BalanceReceipt {
            account_id: account_id.to_string(),
            balance,
            reference,
        })
    }

    /// Move `amount` from an authenticated source to any existing destination
    ///
    /// The balance check, debit and credit form one atomic unit: the store
    /// applies both balance changes or neither, conditioned on the balances
    /// the check was made against.
    pub async fn transfer(
        &self,
        from: &str,
        from_pin: &str,
        to: &str,
        amount: &BigDecimal,
    ) -> LedgerResult<TransferReceipt> {
        validate_positive_amount(amount)?;
        validate_account_id(to)?;
        if from == to {
            return Err(LedgerError::Validation(
                "cannot transfer to the same account".to_string(),
            ));
        }

        let storage = &self.account_manager.storage;
        let mut source = self.account_manager.authenticate(from, from_pin).await?;
        let mut destination = self.destination(to).await?;

        for attempt in 1..=self.config.max_update_attempts {
            if !source.can_cover(amount) {
                warn!(from = %from, to = %to, amount = %amount, "transfer exceeds balance");
                return Err(LedgerError::InsufficientFunds);
            }

            let source_after = &source.balance - amount;
            let updates = [
                BalanceUpdate::new(from, source.balance.clone(), source_after.clone()),
                BalanceUpdate::new(to, destination.balance.clone(), &destination.balance + amount),
            ];

            match storage.update_balances(&updates).await {
                Ok(true) => {
                    let reference = patterns::new_reference();
                    self.transaction_manager
                        .record(&patterns::transfer(reference.clone(), from, to, amount.clone()))
                        .await;

                    info!(from = %from, to = %to, amount = %amount, "money transferred");
                    return Ok(TransferReceipt {
                        reference,
                        from: from.to_string(),
                        to: to.to_string(),
                        amount: amount.clone(),
                        balance: source_after,
                    });
                }
                Ok(false) => {
                    debug!(from = %from, to = %to, attempt, "balances changed concurrently, retrying");
                    source = self.account_manager.authenticate(from, from_pin).await?;
                    destination = self.destination(to).await?;
                }
                Err(err @ LedgerError::ReconciliationRequired { .. }) => {
                    error!(error = %err, "transfer left accounts inconsistent");
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(self.exhausted(from))
    }

    /// Every record where the account is source or destination
    pub async fn statement(&self, account_id: &str, pin: &str) -> LedgerResult<Vec<TransactionRecord>> {
        self.account_manager.authenticate(account_id, pin).await?;
        self.transaction_manager.statement(account_id).await
    }

    async fn destination(&self, account_id: &str) -> LedgerResult<Account> {
        self.account_manager
            .get_account(account_id)
            .await?
            .ok_or_else(|| {
                warn!(account = %account_id, "transfer destination not found");
                LedgerError::InvalidDestination
            })
    }

    /// Authenticate, compute a new balance from the current one and store it
    /// with compare-and-swap, re-reading after every lost race
    async fn update_authenticated<F>(
        &self,
        account_id: &str,
        pin: &str,
        next_balance: F,
    ) -> LedgerResult<BigDecimal>
    where
        F: Fn(&Account) -> LedgerResult<BigDecimal> + Send + Sync,
    {
        let storage = &self.account_manager.storage;

        for attempt in 1..=self.config.max_update_attempts {
            let account = self.account_manager.authenticate(account_id, pin).await?;
            let new_balance = next_balance(&account)?;

            if storage
                .update_balance(account_id, &account.balance, &new_balance)
                .await?
            {
                return Ok(new_balance);
            }
            debug!(account = %account_id, attempt, "balance changed concurrently, retrying");
        }

        Err(self.exhausted(account_id))
    }

    fn exhausted(&self, account_id: &str) -> LedgerError {
        error!(
            account = %account_id,
            attempts = self.config.max_update_attempts,
            "giving up after repeated update conflicts"
        );
        LedgerError::Conflict(format!(
            "account {} kept changing during {} update attempts",
            account_id, self.config.max_update_attempts
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;

    #[tokio::test]
    async fn test_ledger_basic_operations() {
        let storage = MemoryStorage::new();
        let ledger = Ledger::new(storage.clone());

        let alice = ledger.create_account("Alice", "1111").await.unwrap();
        let bob = loop {
            // six-digit space, a collision here is vanishingly rare but possible
            match ledger.create_account("Bob", "2222").await {
                Ok(account) => break account,
                Err(LedgerError::DuplicateAccount(_)) => continue,
                Err(err) => panic!("unexpected error: {err}"),
            }
        };

        let receipt = ledger
            .deposit(&alice.id, "1111", &BigDecimal::from(100))
            .await
            .unwrap();
        assert_eq!(receipt.balance, BigDecimal::from(100));

        let receipt = ledger
            .withdraw(&alice.id, "1111", &BigDecimal::from(30))
            .await
            .unwrap();
        assert_eq!(receipt.balance, BigDecimal::from(70));

        let transfer = ledger
            .transfer(&alice.id, "1111", &bob.id, &BigDecimal::from(20))
            .await
            .unwrap();
        assert_eq!(transfer.balance, BigDecimal::from(50));

        let bob_now = ledger.get_account(&bob.id).await.unwrap().unwrap();
        assert_eq!(bob_now.balance, BigDecimal::from(20));

        let statement = ledger.statement(&alice.id, "1111").await.unwrap();
        assert_eq!(statement.len(), 4);
        assert_eq!(storage.all_records().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_transfer_to_self_is_rejected() {
        let ledger = Ledger::new(MemoryStorage::new());
        let alice = ledger.create_account("Alice", "1111").await.unwrap();
        ledger
            .deposit(&alice.id, "1111", &BigDecimal::from(10))
            .await
            .unwrap();

        let err = ledger
            .transfer(&alice.id, "1111", &alice.id, &BigDecimal::from(5))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_transfer_to_missing_destination() {
        let ledger = Ledger::new(MemoryStorage::new());
        let alice = ledger.create_account("Alice", "1111").await.unwrap();
        let missing = if alice.id == "000000" { "000001" } else { "000000" };

        let err = ledger
            .transfer(&alice.id, "1111", missing, &BigDecimal::from(5))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDestination));
    }

    #[tokio::test]
    async fn test_transfer_to_malformed_destination() {
        let ledger = Ledger::new(MemoryStorage::new());
        let alice = ledger.create_account("Alice", "1111").await.unwrap();
        ledger
            .deposit(&alice.id, "1111", &BigDecimal::from(10))
            .await
            .unwrap();

        for destination in ["12345", "1234567", "12ab56", ""] {
            let err = ledger
                .transfer(&alice.id, "1111", destination, &BigDecimal::from(5))
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)), "{destination:?}");
        }

        let alice_now = ledger.get_account(&alice.id).await.unwrap().unwrap();
        assert_eq!(alice_now.balance, BigDecimal::from(10));
    }

    #[tokio::test]
    async fn test_zero_attempt_budget_reports_conflict() {
        let config = LedgerConfig {
            max_update_attempts: 0,
        };
        let ledger = Ledger::with_config(MemoryStorage::new(), config);
        let alice = ledger.create_account("Alice", "1111").await.unwrap();

        let err = ledger
            .deposit(&alice.id, "1111", &BigDecimal::from(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
        assert_eq!(err.class(), ErrorClass::Server);
    }
}
