use serde::{Deserialize, Serialize};

use ledgerbank_auth::PrincipalId;
use ledgerbank_core::{AccountNumber, DomainError, Money};

/// A ledger account row.
///
/// Invariant: `balance >= 0` at every committed state. The only code allowed
/// to change a balance is `credit`/`debit`, and stores call those inside a
/// transactional unit — never through direct field writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_number: AccountNumber,
    pub owner: PrincipalId,
    balance: Money,
}

impl Account {
    /// Open an account. Rejects a negative opening balance.
    pub fn open(
        account_number: AccountNumber,
        owner: PrincipalId,
        opening_balance: Money,
    ) -> Result<Self, DomainError> {
        if opening_balance.is_negative() {
            return Err(DomainError::invariant("opening balance must be non-negative"));
        }
        Ok(Self {
            account_number,
            owner,
            balance: opening_balance,
        })
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Add `amount` to the balance.
    pub fn credit(&mut self, amount: Money) -> Result<Money, DomainError> {
        if !amount.is_positive() {
            return Err(DomainError::invariant("credit amount must be positive"));
        }
        self.balance = self.balance.checked_add(amount)?;
        Ok(self.balance)
    }

    /// Remove `amount` from the balance, failing if it would go below zero.
    ///
    /// The insufficient-funds check happens here, against the balance the
    /// caller holds under its lock, so a stale pre-check elsewhere cannot
    /// overdraw the account.
    pub fn debit(&mut self, amount: Money) -> Result<Money, DomainError> {
        if !amount.is_positive() {
            return Err(DomainError::invariant("debit amount must be positive"));
        }
        if self.balance < amount {
            return Err(DomainError::InsufficientFunds);
        }
        self.balance = self.balance.checked_sub(amount)?;
        Ok(self.balance)
    }
}
