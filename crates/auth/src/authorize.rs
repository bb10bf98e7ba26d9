//! The authorization gate for ledger operations.
//!
//! Pure policy check: no IO, no panics, no business logic. Denial here is a
//! `Forbidden` outcome, deliberately distinct from `NotFound` — the caller
//! learns they may not touch the account, not whether it exists.

use thiserror::Error;

use ledgerbank_core::AccountNumber;

use crate::{Principal, Role};

/// Operation being attempted against a target account.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LedgerOperation {
    Deposit,
    Withdraw,
    Transfer,
    ViewBalance,
    ViewHistory,
}

impl LedgerOperation {
    fn verb(&self) -> &'static str {
        match self {
            LedgerOperation::Deposit => "deposit to",
            LedgerOperation::Withdraw => "withdraw from",
            LedgerOperation::Transfer => "transfer from",
            LedgerOperation::ViewBalance => "view the balance of",
            LedgerOperation::ViewHistory => "view the history of",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("you can only {} your own account", .operation.verb())]
    NotAccountOwner { operation: LedgerOperation },
}

/// Authorize a principal to perform `operation` against `target`.
///
/// Policy: customers may only target the account they own; employees and
/// managers may target any account. The match is exhaustive so adding a role
/// forces a policy decision here.
pub fn authorize(
    principal: &Principal,
    operation: LedgerOperation,
    target: &AccountNumber,
) -> Result<(), AuthzError> {
    match principal.role {
        Role::Customer => {
            if principal.owns(target) {
                Ok(())
            } else {
                Err(AuthzError::NotAccountOwner { operation })
            }
        }
        Role::Employee | Role::Manager => Ok(()),
    }
}
