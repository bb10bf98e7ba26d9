//! Postgres-backed ledger + log store.
//!
//! Accounts and transaction records live in two tables; every money movement
//! runs inside one sqlx transaction so the balance update(s) and the log
//! append(s) commit or roll back together.
//!
//! ## Error mapping
//!
//! | SQLx error | PostgreSQL code | StoreError | Scenario |
//! |------------|-----------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate account number / transaction id |
//! | Database (check violation) | `23514` | `Conflict` | `balance >= 0` check tripped (guarded update should prevent this) |
//! | Database (other) | any other | `Io` | Other database errors |
//! | PoolClosed / network | n/a | `Io` | Connection failures, pool shutdown |
//!
//! ## Locking
//!
//! Movements take `SELECT ... FOR UPDATE` row locks. Transfers lock both rows
//! in ascending account-number order, so two opposing transfers cannot
//! deadlock. The funds check happens on the locked balance, which serializes
//! concurrent withdrawals against the same account.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE accounts (
//!     account_number TEXT PRIMARY KEY,
//!     owner_id       UUID NOT NULL,
//!     balance        BIGINT NOT NULL CHECK (balance >= 0)
//! );
//! CREATE TABLE transactions (
//!     transaction_id UUID PRIMARY KEY,
//!     account_number TEXT NOT NULL,
//!     kind           TEXT NOT NULL,
//!     signed_amount  BIGINT NOT NULL,
//!     transfer_id    UUID,
//!     occurred_at    TIMESTAMPTZ NOT NULL,
//!     status         TEXT NOT NULL
//! );
//! CREATE INDEX transactions_account_idx ON transactions (account_number, occurred_at);
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use ledgerbank_auth::PrincipalId;
use ledgerbank_core::{AccountNumber, Money, TransactionId, TransferId};
use ledgerbank_ledger::{Account, TransactionKind, TransactionRecord, TransactionStatus};

use super::port::{LedgerStore, StoreError};

/// Postgres implementation of [`LedgerStore`].
///
/// Uses the sqlx connection pool (thread-safe, `Send + Sync`); every mutating
/// method opens a transaction and commits only after all writes succeed.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))
    }

    /// Lock one account row and return its balance.
    async fn lock_balance(
        tx: &mut Transaction<'static, Postgres>,
        number: &AccountNumber,
    ) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query(
            "SELECT balance FROM accounts WHERE account_number = $1 FOR UPDATE",
        )
        .bind(number.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_balance", e))?;

        Ok(row.map(|r| r.get::<i64, _>("balance")))
    }

    async fn set_balance(
        tx: &mut Transaction<'static, Postgres>,
        number: &AccountNumber,
        balance: i64,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET balance = $1 WHERE account_number = $2")
            .bind(balance)
            .bind(number.as_str())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("set_balance", e))?;
        Ok(())
    }

    async fn append_record(
        tx: &mut Transaction<'static, Postgres>,
        record: &TransactionRecord,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions
                (transaction_id, account_number, kind, signed_amount, transfer_id, occurred_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.account_number.as_str())
        .bind(record.kind.as_str())
        .bind(record.signed_amount.minor_units())
        .bind(record.transfer_id.map(|t| *t.as_uuid()))
        .bind(record.occurred_at)
        .bind(match record.status {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        })
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("append_record", e))?;
        Ok(())
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> Result<(), StoreError> {
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self), fields(account = %number))]
    async fn account(&self, number: &AccountNumber) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            "SELECT account_number, owner_id, balance FROM accounts WHERE account_number = $1",
        )
        .bind(number.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("account", e))?;

        match row {
            None => Ok(None),
            Some(row) => Ok(Some(row_to_account(&row)?)),
        }
    }

    #[instrument(skip(self, account), fields(account = %account.account_number))]
    async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO accounts (account_number, owner_id, balance) VALUES ($1, $2, $3)",
        )
        .bind(account.account_number.as_str())
        .bind(account.owner.as_uuid())
        .bind(account.balance().minor_units())
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateAccount),
            Err(e) => Err(map_sqlx_error("insert_account", e)),
        }
    }

    #[instrument(skip(self, record), fields(account = %number, amount = %amount))]
    async fn deposit(
        &self,
        number: &AccountNumber,
        amount: Money,
        record: TransactionRecord,
    ) -> Result<Money, StoreError> {
        let mut tx = self.begin().await?;

        let balance = Self::lock_balance(&mut tx, number)
            .await?
            .ok_or(StoreError::AccountNotFound)?;
        let new_balance = balance
            .checked_add(amount.minor_units())
            .ok_or_else(|| StoreError::Conflict("balance overflow".to_string()))?;

        Self::set_balance(&mut tx, number, new_balance).await?;
        Self::append_record(&mut tx, &record).await?;
        Self::commit(tx).await?;

        Ok(Money::from_minor_units(new_balance))
    }

    #[instrument(skip(self, record), fields(account = %number, amount = %amount))]
    async fn withdraw(
        &self,
        number: &AccountNumber,
        amount: Money,
        record: TransactionRecord,
    ) -> Result<Money, StoreError> {
        let mut tx = self.begin().await?;

        let balance = Self::lock_balance(&mut tx, number)
            .await?
            .ok_or(StoreError::AccountNotFound)?;
        if balance < amount.minor_units() {
            // Dropping the transaction rolls back the lock; nothing written.
            return Err(StoreError::InsufficientFunds);
        }
        let new_balance = balance - amount.minor_units();

        Self::set_balance(&mut tx, number, new_balance).await?;
        Self::append_record(&mut tx, &record).await?;
        Self::commit(tx).await?;

        Ok(Money::from_minor_units(new_balance))
    }

    #[instrument(skip(self, out_record, in_record), fields(from = %from, to = %to, amount = %amount))]
    async fn transfer(
        &self,
        from: &AccountNumber,
        to: &AccountNumber,
        amount: Money,
        out_record: TransactionRecord,
        in_record: TransactionRecord,
    ) -> Result<Money, StoreError> {
        let mut tx = self.begin().await?;

        // Lock both rows in ascending account-number order to avoid deadlock
        // between two opposing transfers.
        let (first, second) = if from <= to { (from, to) } else { (to, from) };
        let first_balance = Self::lock_balance(&mut tx, first).await?;
        let second_balance = Self::lock_balance(&mut tx, second).await?;

        let (sender_balance, receiver_balance) = if first == from {
            (first_balance, second_balance)
        } else {
            (second_balance, first_balance)
        };
        let sender_balance = sender_balance.ok_or(StoreError::AccountNotFound)?;
        let receiver_balance = receiver_balance.ok_or(StoreError::AccountNotFound)?;

        if sender_balance < amount.minor_units() {
            return Err(StoreError::InsufficientFunds);
        }
        let new_sender = sender_balance - amount.minor_units();
        let new_receiver = receiver_balance
            .checked_add(amount.minor_units())
            .ok_or_else(|| StoreError::Conflict("balance overflow".to_string()))?;

        Self::set_balance(&mut tx, from, new_sender).await?;
        Self::set_balance(&mut tx, to, new_receiver).await?;
        Self::append_record(&mut tx, &out_record).await?;
        Self::append_record(&mut tx, &in_record).await?;
        Self::commit(tx).await?;

        Ok(Money::from_minor_units(new_sender))
    }

    #[instrument(skip(self), fields(account = %number))]
    async fn transactions(
        &self,
        number: &AccountNumber,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT transaction_id, account_number, kind, signed_amount, transfer_id, occurred_at, status
            FROM transactions
            WHERE account_number = $1
            ORDER BY occurred_at ASC, transaction_id ASC
            "#,
        )
        .bind(number.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("transactions", e))?;

        rows.iter().map(row_to_record).collect()
    }
}

fn row_to_account(row: &sqlx::postgres::PgRow) -> Result<Account, StoreError> {
    let number = AccountNumber::parse(row.get::<&str, _>("account_number"))
        .map_err(|e| StoreError::Io(format!("corrupt account_number in storage: {e}")))?;
    let owner = PrincipalId::from_uuid(row.get::<Uuid, _>("owner_id"));
    let balance = Money::from_minor_units(row.get::<i64, _>("balance"));

    Account::open(number, owner, balance)
        .map_err(|e| StoreError::Io(format!("corrupt account row in storage: {e}")))
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<TransactionRecord, StoreError> {
    let kind = match row.get::<&str, _>("kind") {
        "deposit" => TransactionKind::Deposit,
        "withdrawal" => TransactionKind::Withdrawal,
        "transfer_out" => TransactionKind::TransferOut,
        "transfer_in" => TransactionKind::TransferIn,
        other => {
            return Err(StoreError::Io(format!(
                "corrupt transaction kind in storage: {other}"
            )))
        }
    };
    let status = match row.get::<&str, _>("status") {
        "completed" => TransactionStatus::Completed,
        "failed" => TransactionStatus::Failed,
        other => {
            return Err(StoreError::Io(format!(
                "corrupt transaction status in storage: {other}"
            )))
        }
    };
    let account_number = AccountNumber::parse(row.get::<&str, _>("account_number"))
        .map_err(|e| StoreError::Io(format!("corrupt account_number in storage: {e}")))?;

    Ok(TransactionRecord {
        id: TransactionId::from_uuid(row.get::<Uuid, _>("transaction_id")),
        account_number,
        kind,
        signed_amount: Money::from_minor_units(row.get::<i64, _>("signed_amount")),
        transfer_id: row
            .get::<Option<Uuid>, _>("transfer_id")
            .map(TransferId::from_uuid),
        occurred_at: row.get::<DateTime<Utc>, _>("occurred_at"),
        status,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                // Unique violation: concurrent insert of the same key.
                Some("23505") => StoreError::Conflict(msg),
                // Check violation: the balance >= 0 guard tripped.
                Some("23514") => StoreError::Conflict(msg),
                _ => StoreError::Io(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Io(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Io(format!("sqlx error in {operation}: {err}")),
    }
}
