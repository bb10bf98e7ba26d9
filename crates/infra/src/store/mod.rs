pub mod in_memory;
pub mod port;
pub mod postgres;

pub use in_memory::InMemoryLedgerStore;
pub use port::{LedgerStore, StoreError};
pub use postgres::PostgresLedgerStore;
