//! Ledger storage port.
//!
//! One trait covers both the account ledger (balances) and the transaction
//! log (append-only records), because the money-moving operations must write
//! to both **inside a single transactional unit**. A store implementation
//! either commits the balance change together with its log record(s) or
//! commits nothing.
//!
//! Concurrency contract: operations against the same account are serialized
//! with respect to balance reads/writes (row lock or equivalent), so two
//! concurrent withdrawals can never both pass the funds check against a stale
//! balance. Operations on disjoint accounts may run in parallel.

use async_trait::async_trait;
use thiserror::Error;

use ledgerbank_core::{AccountNumber, Money};
use ledgerbank_ledger::{Account, TransactionRecord};

/// Storage-level error.
///
/// `AccountNotFound` and `InsufficientFunds` are deterministic outcomes of the
/// guarded read-modify-write; `Conflict` and `Io` are infrastructure faults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account not found")]
    AccountNotFound,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("account already exists")]
    DuplicateAccount,

    #[error("storage conflict: {0}")]
    Conflict(String),

    #[error("storage io failure: {0}")]
    Io(String),
}

/// Transactional ledger + log store.
///
/// Every mutating method is one atomic unit: either the balance update(s) and
/// the log append(s) all land, or none do. Implementations must roll back all
/// prior writes in the unit on any mid-unit failure.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetch one account, if present.
    async fn account(&self, number: &AccountNumber) -> Result<Option<Account>, StoreError>;

    /// Insert a new account row (registration collaborator / seeding).
    async fn insert_account(&self, account: Account) -> Result<(), StoreError>;

    /// Atomically credit `amount` and append `record`. Returns the new balance.
    async fn deposit(
        &self,
        number: &AccountNumber,
        amount: Money,
        record: TransactionRecord,
    ) -> Result<Money, StoreError>;

    /// Atomically debit `amount` (checking funds under the lock) and append
    /// `record`. Returns the new balance.
    async fn withdraw(
        &self,
        number: &AccountNumber,
        amount: Money,
        record: TransactionRecord,
    ) -> Result<Money, StoreError>;

    /// Atomically move `amount` from `from` to `to` and append both transfer
    /// legs. Returns the sender's new balance.
    async fn transfer(
        &self,
        from: &AccountNumber,
        to: &AccountNumber,
        amount: Money,
        out_record: TransactionRecord,
        in_record: TransactionRecord,
    ) -> Result<Money, StoreError>;

    /// All log records for an account, oldest first.
    async fn transactions(
        &self,
        number: &AccountNumber,
    ) -> Result<Vec<TransactionRecord>, StoreError>;
}
