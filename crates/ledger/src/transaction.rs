use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerbank_core::{AccountNumber, DomainError, Money, TransactionId, TransferId};

/// Kind of money movement a log record describes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    TransferOut,
    TransferIn,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::TransferOut => "transfer_out",
            TransactionKind::TransferIn => "transfer_in",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Failed,
}

/// One immutable row of the append-only transaction log.
///
/// `signed_amount` is negative for outflows and positive for inflows. The two
/// legs of a transfer share a `transfer_id`; standalone movements carry none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub account_number: AccountNumber,
    pub kind: TransactionKind,
    pub signed_amount: Money,
    pub transfer_id: Option<TransferId>,
    pub occurred_at: DateTime<Utc>,
    pub status: TransactionStatus,
}

impl TransactionRecord {
    pub fn deposit(
        account_number: AccountNumber,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            account_number,
            kind: TransactionKind::Deposit,
            signed_amount: amount,
            transfer_id: None,
            occurred_at,
            status: TransactionStatus::Completed,
        }
    }

    pub fn withdrawal(
        account_number: AccountNumber,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: TransactionId::new(),
            account_number,
            kind: TransactionKind::Withdrawal,
            signed_amount: amount.negated()?,
            transfer_id: None,
            occurred_at,
            status: TransactionStatus::Completed,
        })
    }

    /// Build both legs of a transfer, linked by one fresh correlation id.
    pub fn transfer_pair(
        from: AccountNumber,
        to: AccountNumber,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<(Self, Self, TransferId), DomainError> {
        let transfer_id = TransferId::new();
        let out = Self {
            id: TransactionId::new(),
            account_number: from,
            kind: TransactionKind::TransferOut,
            signed_amount: amount.negated()?,
            transfer_id: Some(transfer_id),
            occurred_at,
            status: TransactionStatus::Completed,
        };
        let into = Self {
            id: TransactionId::new(),
            account_number: to,
            kind: TransactionKind::TransferIn,
            signed_amount: amount,
            transfer_id: Some(transfer_id),
            occurred_at,
            status: TransactionStatus::Completed,
        };
        Ok((out, into, transfer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(s: &str) -> AccountNumber {
        AccountNumber::parse(s).unwrap()
    }

    #[test]
    fn deposit_record_is_positive_and_uncorrelated() {
        let r = TransactionRecord::deposit(acct("1234567890"), Money::from_minor_units(100), Utc::now());
        assert_eq!(r.kind, TransactionKind::Deposit);
        assert_eq!(r.signed_amount, Money::from_minor_units(100));
        assert_eq!(r.transfer_id, None);
        assert_eq!(r.status, TransactionStatus::Completed);
    }

    #[test]
    fn withdrawal_record_carries_negative_amount() {
        let r = TransactionRecord::withdrawal(acct("1234567890"), Money::from_minor_units(50), Utc::now())
            .unwrap();
        assert_eq!(r.kind, TransactionKind::Withdrawal);
        assert_eq!(r.signed_amount, Money::from_minor_units(-50));
    }

    #[test]
    fn transfer_pair_is_opposite_signed_and_correlated() {
        let (out, into, transfer_id) = TransactionRecord::transfer_pair(
            acct("AAAAAAAAAA"),
            acct("BBBBBBBBBB"),
            Money::from_minor_units(40),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(out.kind, TransactionKind::TransferOut);
        assert_eq!(into.kind, TransactionKind::TransferIn);
        assert_eq!(out.signed_amount, Money::from_minor_units(-40));
        assert_eq!(into.signed_amount, Money::from_minor_units(40));
        assert_eq!(out.transfer_id, Some(transfer_id));
        assert_eq!(into.transfer_id, Some(transfer_id));
        assert_ne!(out.id, into.id);
    }
}
