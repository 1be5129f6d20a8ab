use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use stockroom_infra::{DocumentStore, InMemoryDocumentStore, ItemRepository, PostgresDocumentStore, StoreError};

use crate::config::AppConfig;

/// Repository over whichever store the process was configured with.
pub type SharedItemRepository = ItemRepository<Arc<dyn DocumentStore>>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to connect to Postgres: {0}")]
    Connect(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Long-lived collaborators shared by every handler.
pub struct AppServices {
    items: SharedItemRepository,
    backend: &'static str,
}

impl AppServices {
    pub fn new(store: Arc<dyn DocumentStore>, backend: &'static str) -> Self {
        Self {
            items: ItemRepository::new(store),
            backend,
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()), "in-memory")
    }

    pub fn items(&self) -> &SharedItemRepository {
        &self.items
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

/// Select and connect the document store named by the configuration.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, ServiceError> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory store");
        return Ok(AppServices::in_memory());
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;

    let store = PostgresDocumentStore::new(pool, config.items_collection.clone())?;
    store.ensure_schema().await?;
    tracing::info!(collection = store.collection(), "using Postgres document store");

    Ok(AppServices::new(Arc::new(store), "postgres"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_database_url_selects_in_memory_store() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        let services = build_services(&config).await.unwrap();
        assert_eq!(services.backend(), "in-memory");
        assert!(services.items().find_all().await.unwrap().is_empty());
    }
}
