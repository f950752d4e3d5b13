//! Account management: creation, authentication and PIN changes

use tracing::{debug, info, warn};

use crate::credential::pin_digest;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::is_well_formed_pin;

/// Account manager for creating and authenticating accounts
pub struct AccountManager<S: AccountStore> {
    pub(crate) storage: S,
    validator: Box<dyn AccountValidator>,
    id_generator: Box<dyn AccountIdGenerator>,
}

impl<S: AccountStore> AccountManager<S> {
    /// Create a new account manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultAccountValidator),
            id_generator: Box::new(RandomAccountIds),
        }
    }

    /// Create a new account manager with a custom validator and id source
    pub fn with_components(
        storage: S,
        validator: Box<dyn AccountValidator>,
        id_generator: Box<dyn AccountIdGenerator>,
    ) -> Self {
        Self {
            storage,
            validator,
            id_generator,
        }
    }

    /// Create a new account with a zero balance
    ///
    /// A freshly sampled account number that is already taken is rejected
    /// rather than regenerated.
    pub async fn create_account(&self, name: &str, pin: &str) -> LedgerResult<Account> {
        self.validator.validate_new_account(name, pin)?;

        let id = self.id_generator.next_id();

        // Check if account already exists
        if self.storage.get_account(&id).await?.is_some() {
            warn!(account = %id, "sampled account number already in use");
            return Err(LedgerError::DuplicateAccount(id));
        }

        let account = Account::new(id, name.trim().to_string(), pin_digest(pin));
        self.storage.insert_account(&account).await?;

        info!(account = %account.id, "account created");
        Ok(account)
    }

    /// Resolve an account number and PIN to exactly one account
    ///
    /// Unknown accounts and wrong PINs are reported identically.
    pub async fn authenticate(&self, account_id: &str, pin: &str) -> LedgerResult<Account> {
        if !is_well_formed_pin(pin) {
            warn!(account = %account_id, "authentication failed");
            return Err(LedgerError::InvalidCredentials);
        }

        match self.storage.find_account(account_id, &pin_digest(pin)).await? {
            Some(account) => {
                debug!(account = %account_id, "authenticated");
                Ok(account)
            }
            None => {
                warn!(account = %account_id, "authentication failed");
                Err(LedgerError::InvalidCredentials)
            }
        }
    }

    /// Get an account by id without authenticating
    pub async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        self.storage.get_account(account_id).await
    }

    /// Replace the PIN of an account, authenticated with the current one
    pub async fn change_pin(&self, account_id: &str, old_pin: &str, new_pin: &str) -> LedgerResult<()> {
        self.validator.validate_new_pin(new_pin)?;

        let account = self.authenticate(account_id, old_pin).await?;

        let swapped = self
            .storage
            .update_pin_digest(&account.id, &account.pin_digest, &pin_digest(new_pin))
            .await?;
        if !swapped {
            // PIN was changed by a concurrent request after we authenticated
            warn!(account = %account_id, "PIN change lost a concurrent update");
            return Err(LedgerError::InvalidCredentials);
        }

        info!(account = %account_id, "PIN changed");
        Ok(())
    }
}
