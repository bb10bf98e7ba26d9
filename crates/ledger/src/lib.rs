//! Ledger domain: accounts, transaction records, request validation.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod account;
pub mod transaction;
pub mod validate;

pub use account::Account;
pub use transaction::{TransactionKind, TransactionRecord, TransactionStatus};
pub use validate::{parse_movement, parse_transfer, MovementPayload, RawMovement, RawTransfer, TransferPayload};
