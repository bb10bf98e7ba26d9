//! Balance mutation engine (application-level orchestration).
//!
//! Every money movement runs the same pipeline:
//!
//! ```text
//! raw payload
//!   ↓
//! 1. Validate shape (field-level, no storage touched)
//!   ↓
//! 2. Authorization gate (ownership policy, pure)
//!   ↓
//! 3. Atomic store operation (balance write + log append, one unit)
//!   ↓
//! 4. Authoritative post-operation balance back to the caller
//! ```
//!
//! The engine owns the error taxonomy the HTTP layer maps to responses. It
//! composes the [`LedgerStore`] port, so it is testable against the in-memory
//! store and swappable to Postgres without change. The engine never mutates an
//! account outside the store's transactional path.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use ledgerbank_auth::{authorize, AuthzError, LedgerOperation, Principal};
use ledgerbank_core::{AccountNumber, DomainError, Money, TransactionId, TransferId};
use ledgerbank_ledger::{
    parse_movement, parse_transfer, RawMovement, RawTransfer, TransactionRecord,
};

use crate::store::{LedgerStore, StoreError};

/// Terminal failure of a movement operation. Each variant is a distinct
/// externally observable outcome.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input; never reaches storage.
    #[error("{0}")]
    Validation(DomainError),

    /// Target account absent.
    #[error("account not found")]
    NotFound,

    /// Authorization denied — deliberately distinct from `NotFound`.
    #[error("{0}")]
    Forbidden(AuthzError),

    /// Business-rule rejection, not a system fault.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Operation is meaningless as requested (e.g. same-account transfer).
    #[error("{0}")]
    InvalidOperation(String),

    /// Storage conflict (lost race, duplicate key).
    #[error("storage conflict")]
    Conflict(String),

    /// Storage/transaction failure. Logged internally; the message here is
    /// safe to show to clients.
    #[error("storage failure")]
    Storage(String),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AccountNotFound => EngineError::NotFound,
            StoreError::InsufficientFunds => EngineError::InsufficientFunds,
            StoreError::DuplicateAccount => EngineError::Conflict("account already exists".to_string()),
            StoreError::Conflict(msg) => EngineError::Conflict(msg),
            StoreError::Io(msg) => EngineError::Storage(msg),
        }
    }
}

/// Result of a committed deposit/withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub balance: Money,
    pub transaction_id: TransactionId,
}

/// Result of a committed transfer (balance is the sender's).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub balance: Money,
    pub transfer_id: TransferId,
}

/// The balance mutation engine.
///
/// Holds the store behind `Arc<dyn LedgerStore>` so wiring can pick the
/// backend at runtime; cloning is cheap.
#[derive(Clone)]
pub struct MovementEngine {
    store: Arc<dyn LedgerStore>,
}

impl MovementEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Handle to the underlying store (seeding, wiring).
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    #[instrument(skip(self, principal, raw), fields(principal = %principal.id))]
    pub async fn deposit(
        &self,
        principal: &Principal,
        raw: RawMovement,
    ) -> Result<Receipt, EngineError> {
        let payload = parse_movement(raw).map_err(EngineError::Validation)?;
        authorize(principal, LedgerOperation::Deposit, &payload.account_number)
            .map_err(EngineError::Forbidden)?;

        let record =
            TransactionRecord::deposit(payload.account_number.clone(), payload.amount, Utc::now());
        let transaction_id = record.id;

        let balance = self
            .store
            .deposit(&payload.account_number, payload.amount, record)
            .await?;

        tracing::info!(
            account = %payload.account_number,
            amount = payload.amount.minor_units(),
            %transaction_id,
            "deposit committed"
        );
        Ok(Receipt {
            balance,
            transaction_id,
        })
    }

    #[instrument(skip(self, principal, raw), fields(principal = %principal.id))]
    pub async fn withdraw(
        &self,
        principal: &Principal,
        raw: RawMovement,
    ) -> Result<Receipt, EngineError> {
        let payload = parse_movement(raw).map_err(EngineError::Validation)?;
        authorize(principal, LedgerOperation::Withdraw, &payload.account_number)
            .map_err(EngineError::Forbidden)?;

        let record =
            TransactionRecord::withdrawal(payload.account_number.clone(), payload.amount, Utc::now())
                .map_err(EngineError::Validation)?;
        let transaction_id = record.id;

        let balance = self
            .store
            .withdraw(&payload.account_number, payload.amount, record)
            .await?;

        tracing::info!(
            account = %payload.account_number,
            amount = payload.amount.minor_units(),
            %transaction_id,
            "withdrawal committed"
        );
        Ok(Receipt {
            balance,
            transaction_id,
        })
    }

    #[instrument(skip(self, principal, raw), fields(principal = %principal.id))]
    pub async fn transfer(
        &self,
        principal: &Principal,
        raw: RawTransfer,
    ) -> Result<TransferReceipt, EngineError> {
        let payload = parse_transfer(raw).map_err(EngineError::Validation)?;

        // Same-account transfers are rejected before any storage work,
        // regardless of balance or amount.
        if payload.from_account == payload.to_account {
            return Err(EngineError::InvalidOperation(
                "cannot transfer to the same account".to_string(),
            ));
        }

        // The caller must be allowed to move funds out of the source account.
        authorize(principal, LedgerOperation::Transfer, &payload.from_account)
            .map_err(EngineError::Forbidden)?;

        let (out_record, in_record, transfer_id) = TransactionRecord::transfer_pair(
            payload.from_account.clone(),
            payload.to_account.clone(),
            payload.amount,
            Utc::now(),
        )
        .map_err(EngineError::Validation)?;

        let balance = self
            .store
            .transfer(
                &payload.from_account,
                &payload.to_account,
                payload.amount,
                out_record,
                in_record,
            )
            .await?;

        tracing::info!(
            from = %payload.from_account,
            to = %payload.to_account,
            amount = payload.amount.minor_units(),
            %transfer_id,
            "transfer committed"
        );
        Ok(TransferReceipt {
            balance,
            transfer_id,
        })
    }

    /// Authoritative balance of one account.
    #[instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn balance(
        &self,
        principal: &Principal,
        account_number: &AccountNumber,
    ) -> Result<Money, EngineError> {
        authorize(principal, LedgerOperation::ViewBalance, account_number)
            .map_err(EngineError::Forbidden)?;

        let account = self
            .store
            .account(account_number)
            .await?
            .ok_or(EngineError::NotFound)?;
        Ok(account.balance())
    }

    /// Transaction history of one account, oldest first.
    #[instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn history(
        &self,
        principal: &Principal,
        account_number: &AccountNumber,
    ) -> Result<Vec<TransactionRecord>, EngineError> {
        authorize(principal, LedgerOperation::ViewHistory, account_number)
            .map_err(EngineError::Forbidden)?;

        if self.store.account(account_number).await?.is_none() {
            return Err(EngineError::NotFound);
        }
        self.store
            .transactions(account_number)
            .await
            .map_err(Into::into)
    }
}
