//! Results stores selected by configuration.

pub mod postgres;
pub mod rest;
pub mod schema;

use std::sync::Arc;

use funnel_core::persistence::PersistResult;
use funnel_core::{MemoryResultStore, PersistError, ResultStore};
use tracing::info;

use crate::config::{FunnelConfig, StoreKind};

pub use postgres::PgResultStore;
pub use rest::RestResultStore;

/// Build the store named by `config.store`. Call after `config.validate()`.
pub async fn build_store(config: &FunnelConfig) -> PersistResult<Arc<dyn ResultStore>> {
    let store: Arc<dyn ResultStore> = match config.store {
        StoreKind::Memory => Arc::new(MemoryResultStore::new()),
        StoreKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| PersistError::Connection("no database URL configured".into()))?;
            Arc::new(PgResultStore::connect(url, &config.results_table).await?)
        }
        StoreKind::Rest => {
            let url = config
                .rest_url
                .as_deref()
                .ok_or_else(|| PersistError::Connection("no REST URL configured".into()))?;
            Arc::new(RestResultStore::new(
                url,
                &config.results_table,
                config.rest_api_key.clone(),
                config.persist_timeout,
            )?)
        }
    };
    info!(
        store = store.name(),
        table = %config.results_table,
        "Results store ready"
    );
    Ok(store)
}
