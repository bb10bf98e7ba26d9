//! Money and account-number value objects.
//!
//! Value objects here are **immutable** and compared by value. `Money` is an
//! exact integer amount in minor units (cents) — no floating point anywhere on
//! the money path, so balances never accumulate rounding error.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Exact currency amount in minor units (e.g. cents).
///
/// Arithmetic is checked: overflow and negative results surface as
/// `DomainError` instead of wrapping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from minor units. Negative values are representable (signed
    /// log amounts use them); balances enforce non-negativity separately.
    pub const fn from_minor_units(units: i64) -> Self {
        Self(units)
    }

    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Result<Money, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(DomainError::AmountOutOfRange)
    }

    pub fn checked_sub(self, other: Money) -> Result<Money, DomainError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or(DomainError::AmountOutOfRange)
    }

    /// Negation for signed log amounts (outflows).
    pub fn negated(self) -> Result<Money, DomainError> {
        self.0
            .checked_neg()
            .map(Money)
            .ok_or(DomainError::AmountOutOfRange)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// The length every account number must have.
pub const ACCOUNT_NUMBER_LEN: usize = 10;

/// Account number: exactly 10 ASCII alphanumeric characters.
///
/// Parsing is the only way to construct one, so any `AccountNumber` held by
/// domain code is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.len() != ACCOUNT_NUMBER_LEN {
            return Err(DomainError::validation(
                "account_number",
                format!("must be exactly {ACCOUNT_NUMBER_LEN} characters"),
            ));
        }
        if !raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(DomainError::validation(
                "account_number",
                "must contain only ASCII letters and digits",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
