//! Request validation: raw payloads in, normalized payloads out.
//!
//! No side effects. Errors name the offending field so clients see exactly
//! which input was malformed.

use serde::Deserialize;

use ledgerbank_core::{AccountNumber, DomainError, Money};

/// Unvalidated single-account movement body (deposit/withdraw).
#[derive(Debug, Clone, Deserialize)]
pub struct RawMovement {
    pub account_number: Option<String>,
    /// Amount in minor units (cents).
    pub amount: Option<i64>,
}

/// Unvalidated transfer body.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransfer {
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    /// Amount in minor units (cents).
    pub amount: Option<i64>,
}

/// Normalized deposit/withdraw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementPayload {
    pub account_number: AccountNumber,
    pub amount: Money,
}

/// Normalized transfer payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPayload {
    pub from_account: AccountNumber,
    pub to_account: AccountNumber,
    pub amount: Money,
}

fn parse_account(field: &'static str, raw: Option<&str>) -> Result<AccountNumber, DomainError> {
    let raw = raw.ok_or_else(|| DomainError::validation(field, "is required"))?;
    AccountNumber::parse(raw).map_err(|e| match e {
        // Re-attribute the generic account-number error to the request field.
        DomainError::Validation { message, .. } => DomainError::Validation { field, message },
        other => other,
    })
}

fn parse_amount(raw: Option<i64>) -> Result<Money, DomainError> {
    let raw = raw.ok_or_else(|| DomainError::validation("amount", "is required"))?;
    if raw <= 0 {
        return Err(DomainError::validation("amount", "must be strictly positive"));
    }
    Ok(Money::from_minor_units(raw))
}

pub fn parse_movement(raw: RawMovement) -> Result<MovementPayload, DomainError> {
    Ok(MovementPayload {
        account_number: parse_account("account_number", raw.account_number.as_deref())?,
        amount: parse_amount(raw.amount)?,
    })
}

pub fn parse_transfer(raw: RawTransfer) -> Result<TransferPayload, DomainError> {
    Ok(TransferPayload {
        from_account: parse_account("from_account", raw.from_account.as_deref())?,
        to_account: parse_account("to_account", raw.to_account.as_deref())?,
        amount: parse_amount(raw.amount)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_happy_path_normalizes() {
        let p = parse_movement(RawMovement {
            account_number: Some("1234567890".into()),
            amount: Some(100),
        })
        .unwrap();
        assert_eq!(p.account_number.as_str(), "1234567890");
        assert_eq!(p.amount, Money::from_minor_units(100));
    }

    #[test]
    fn missing_fields_name_the_field() {
        let err = parse_movement(RawMovement {
            account_number: None,
            amount: Some(100),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { field: "account_number", .. }
        ));

        let err = parse_movement(RawMovement {
            account_number: Some("1234567890".into()),
            amount: None,
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "amount", .. }));
    }

    #[test]
    fn wrong_length_account_is_rejected() {
        let err = parse_movement(RawMovement {
            account_number: Some("12345".into()),
            amount: Some(100),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { field: "account_number", .. }
        ));
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        for amount in [0, -1, -100] {
            let err = parse_movement(RawMovement {
                account_number: Some("1234567890".into()),
                amount: Some(amount),
            })
            .unwrap_err();
            assert!(matches!(err, DomainError::Validation { field: "amount", .. }));
        }
    }

    #[test]
    fn transfer_attributes_errors_to_each_side() {
        let err = parse_transfer(RawTransfer {
            from_account: Some("AAAAAAAAAA".into()),
            to_account: Some("short".into()),
            amount: Some(10),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { field: "to_account", .. }
        ));
    }
}
