//! Infrastructure wiring for the API process.
//!
//! Chooses the store backend from the environment: Postgres when
//! `USE_PERSISTENT_STORES=true` (with `DATABASE_URL`), in-memory otherwise.

use std::sync::Arc;

use ledgerbank_infra::{InMemoryLedgerStore, LedgerStore, MovementEngine, PostgresLedgerStore};

/// Services shared across request handlers.
#[derive(Clone)]
pub struct AppServices {
    engine: MovementEngine,
}

impl AppServices {
    pub fn with_store(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            engine: MovementEngine::new(store),
        }
    }

    pub fn engine(&self) -> &MovementEngine {
        &self.engine
    }
}

/// Build services from the environment.
pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .eq_ignore_ascii_case("true");

    if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .expect("USE_PERSISTENT_STORES=true requires DATABASE_URL");
        let pool = sqlx::PgPool::connect(&database_url)
            .await
            .expect("failed to connect to DATABASE_URL");

        tracing::info!("using postgres ledger store");
        AppServices::with_store(Arc::new(PostgresLedgerStore::new(pool)))
    } else {
        tracing::info!("using in-memory ledger store");
        AppServices::with_store(Arc::new(InMemoryLedgerStore::new()))
    }
}
