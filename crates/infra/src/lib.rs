//! Infrastructure layer: ledger storage adapters and the balance mutation
//! engine that coordinates them.

pub mod engine;
pub mod store;

pub use engine::{EngineError, MovementEngine, Receipt, TransferReceipt};
pub use store::{InMemoryLedgerStore, LedgerStore, PostgresLedgerStore, StoreError};
