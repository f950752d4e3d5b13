//! In-memory storage implementation for testing and development

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::traits::*;
use crate::types::*;

type AccountCell = Arc<Mutex<Account>>;

/// In-memory account store and transaction log
///
/// The index lock is only held to look up or insert an account cell; every
/// balance or digest change happens under that account's own mutex, so
/// operations on unrelated accounts never wait on each other. Multi-account
/// updates lock their cells in ascending id order.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    accounts: Arc<RwLock<HashMap<String, AccountCell>>>,
    transactions: Arc<RwLock<Vec<TransactionRecord>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            transactions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of stored accounts
    pub fn account_count(&self) -> LedgerResult<usize> {
        Ok(self.accounts.read()?.len())
    }

    /// Every stored record in append order
    pub fn all_records(&self) -> LedgerResult<Vec<TransactionRecord>> {
        Ok(self.transactions.read()?.clone())
    }

    fn cell(&self, account_id: &str) -> LedgerResult<Option<AccountCell>> {
        Ok(self.accounts.read()?.get(account_id).cloned())
    }

    fn required_cell(&self, account_id: &str) -> LedgerResult<AccountCell> {
        self.cell(account_id)?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for MemoryStorage {
    async fn insert_account(&self, account: &Account) -> LedgerResult<()> {
        let mut accounts = self.accounts.write()?;
        if accounts.contains_key(&account.id) {
            return Err(LedgerError::DuplicateAccount(account.id.clone()));
        }
        accounts.insert(account.id.clone(), Arc::new(Mutex::new(account.clone())));
        Ok(())
    }

    async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        match self.cell(account_id)? {
            Some(cell) => Ok(Some(cell.lock()?.clone())),
            None => Ok(None),
        }
    }

    async fn find_account(
        &self,
        account_id: &str,
        pin_digest: &str,
    ) -> LedgerResult<Option<Account>> {
        let account = self.get_account(account_id).await?;
        Ok(account.filter(|a| a.pin_digest == pin_digest))
    }

    async fn update_balance(
        &self,
        account_id: &str,
        expected: &BigDecimal,
        new_balance: &BigDecimal,
    ) -> LedgerResult<bool> {
        let cell = self.required_cell(account_id)?;
        let mut account = cell.lock()?;
        if account.balance != *expected {
            return Ok(false);
        }
        account.balance = new_balance.clone();
        account.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_pin_digest(
        &self,
        account_id: &str,
        expected: &str,
        new_digest: &str,
    ) -> LedgerResult<bool> {
        let cell = self.required_cell(account_id)?;
        let mut account = cell.lock()?;
        if account.pin_digest != expected {
            return Ok(false);
        }
        account.pin_digest = new_digest.to_string();
        account.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_balances(&self, updates: &[BalanceUpdate]) -> LedgerResult<bool> {
        let mut ordered: Vec<&BalanceUpdate> = updates.iter().collect();
        ordered.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        if ordered
            .windows(2)
            .any(|pair| pair[0].account_id == pair[1].account_id)
        {
            return Err(LedgerError::Storage(
                "an account may appear only once in a multi-account update".to_string(),
            ));
        }

        let cells = ordered
            .iter()
            .map(|u| self.required_cell(&u.account_id))
            .collect::<LedgerResult<Vec<_>>>()?;

        let mut guards = Vec::with_capacity(cells.len());
        for cell in &cells {
            guards.push(cell.lock()?);
        }

        let all_current = guards
            .iter()
            .zip(&ordered)
            .all(|(account, update)| account.balance == update.expected);
        if !all_current {
            return Ok(false);
        }

        let now = Utc::now();
        for (account, update) in guards.iter_mut().zip(&ordered) {
            account.balance = update.new_balance.clone();
            account.updated_at = now;
        }
        Ok(true)
    }
}

#[async_trait]
impl TransactionLog for MemoryStorage {
    async fn append(&self, record: &TransactionRecord) -> LedgerResult<()> {
        self.transactions.write()?.push(record.clone());
        Ok(())
    }

    async fn records_for_account(&self, account_id: &str) -> LedgerResult<Vec<TransactionRecord>> {
        let transactions = self.transactions.read()?;
        Ok(transactions
            .iter()
            .filter(|record| record.involves(account_id))
            .cloned()
            .collect())
    }
}
