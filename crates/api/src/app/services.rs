use std::sync::Arc;

use tracing::{info, warn};

use stockledger_infra::stock_store::{InMemoryStockStore, PostgresStockStore, StockBackend};
use stockledger_infra::{StockLedger, StoreConfig};

/// Shared handles used by every request.
pub struct AppServices {
    pub ledger: StockLedger<Arc<dyn StockBackend>>,
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices").finish_non_exhaustive()
    }
}

impl AppServices {
    pub fn new(store: Arc<dyn StockBackend>) -> Self {
        Self {
            ledger: StockLedger::new(store),
        }
    }

    /// Services over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStockStore::new()))
    }
}

/// Select the store from configuration.
///
/// With `DATABASE_URL` set this connects to Postgres (and runs migrations when
/// enabled); otherwise an in-memory store is used.
pub async fn build_services(config: &StoreConfig) -> anyhow::Result<AppServices> {
    let Some(url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set; using in-memory stock store (data is lost on exit)");
        return Ok(AppServices::in_memory());
    };

    let store = PostgresStockStore::connect(config, url).await?;
    if config.run_migrations {
        store.migrate().await?;
        info!("database migrations applied");
    }
    info!(
        max_connections = config.max_connections,
        "connected to postgres stock store"
    );

    Ok(AppServices::new(Arc::new(store)))
}
