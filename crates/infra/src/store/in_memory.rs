use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use ledgerbank_core::{AccountNumber, DomainError, Money};
use ledgerbank_ledger::{Account, TransactionRecord};

use super::port::{LedgerStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<AccountNumber, Account>,
    log: Vec<TransactionRecord>,
}

/// In-memory ledger + log store.
///
/// Intended for tests/dev. A single mutex serializes every transactional
/// unit, which trivially satisfies the per-account ordering contract (at the
/// cost of cross-account parallelism, which dev/test does not need).
///
/// Atomicity: mutations are staged on clones of the affected accounts and the
/// shared state is only written back after the log append has succeeded, so a
/// failed append leaves balances exactly as they were.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: Mutex<Inner>,
    fail_log_appends: AtomicBool,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Testing aid: make every subsequent log append fail, to exercise the
    /// rollback path of the transactional unit.
    pub fn fail_log_appends(&self, fail: bool) {
        self.fail_log_appends.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Io("lock poisoned".to_string()))
    }

    fn append_guard(&self) -> Result<(), StoreError> {
        if self.fail_log_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Io("log append failed (injected)".to_string()));
        }
        Ok(())
    }

    fn map_domain(e: DomainError) -> StoreError {
        match e {
            DomainError::InsufficientFunds => StoreError::InsufficientFunds,
            other => StoreError::Conflict(other.to_string()),
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn account(&self, number: &AccountNumber) -> Result<Option<Account>, StoreError> {
        Ok(self.lock()?.accounts.get(number).cloned())
    }

    async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.accounts.contains_key(&account.account_number) {
            return Err(StoreError::DuplicateAccount);
        }
        inner.accounts.insert(account.account_number.clone(), account);
        Ok(())
    }

    async fn deposit(
        &self,
        number: &AccountNumber,
        amount: Money,
        record: TransactionRecord,
    ) -> Result<Money, StoreError> {
        let mut inner = self.lock()?;

        let mut account = inner
            .accounts
            .get(number)
            .cloned()
            .ok_or(StoreError::AccountNotFound)?;
        let balance = account.credit(amount).map_err(Self::map_domain)?;

        self.append_guard()?;

        inner.accounts.insert(number.clone(), account);
        inner.log.push(record);
        Ok(balance)
    }

    async fn withdraw(
        &self,
        number: &AccountNumber,
        amount: Money,
        record: TransactionRecord,
    ) -> Result<Money, StoreError> {
        let mut inner = self.lock()?;

        let mut account = inner
            .accounts
            .get(number)
            .cloned()
            .ok_or(StoreError::AccountNotFound)?;
        // Funds check happens here, on the balance held under the lock.
        let balance = account.debit(amount).map_err(Self::map_domain)?;

        self.append_guard()?;

        inner.accounts.insert(number.clone(), account);
        inner.log.push(record);
        Ok(balance)
    }

    async fn transfer(
        &self,
        from: &AccountNumber,
        to: &AccountNumber,
        amount: Money,
        out_record: TransactionRecord,
        in_record: TransactionRecord,
    ) -> Result<Money, StoreError> {
        let mut inner = self.lock()?;

        let mut sender = inner
            .accounts
            .get(from)
            .cloned()
            .ok_or(StoreError::AccountNotFound)?;
        let mut receiver = inner
            .accounts
            .get(to)
            .cloned()
            .ok_or(StoreError::AccountNotFound)?;

        let sender_balance = sender.debit(amount).map_err(Self::map_domain)?;
        receiver.credit(amount).map_err(Self::map_domain)?;

        self.append_guard()?;

        inner.accounts.insert(from.clone(), sender);
        inner.accounts.insert(to.clone(), receiver);
        inner.log.push(out_record);
        inner.log.push(in_record);
        Ok(sender_balance)
    }

    async fn transactions(
        &self,
        number: &AccountNumber,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .log
            .iter()
            .filter(|r| &r.account_number == number)
            .cloned()
            .collect())
    }
}
