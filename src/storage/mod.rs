//! Storage implementations.
//!
//! The backend is chosen once, from [`StorageConfig`], when the process
//! builds its [`OrderStore`].

use std::sync::Arc;

use tracing::{error, info};

use crate::config::{StorageConfig, StorageType};
use crate::interfaces::order_store::{OrderStore, Result, StorageError};

pub mod memory;

#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod helpers;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod schema;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

pub use memory::InMemoryOrderStore;

#[cfg(feature = "postgres")]
pub use sql::postgres::PostgresOrderStore;
#[cfg(feature = "sqlite")]
pub use sql::sqlite::SqliteOrderStore;

/// Initialize storage based on configuration.
pub async fn init_storage(config: &StorageConfig) -> Result<Arc<dyn OrderStore>> {
    info!(storage = %config.storage_type, "initializing order storage");

    match &config.storage_type {
        StorageType::Memory => Ok(Arc::new(InMemoryOrderStore::new())),
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            let path = &config.sqlite.path;
            if let Some(parent) = std::path::Path::new(path).parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Unavailable(format!("cannot create {}: {e}", parent.display()))
                })?;
            }

            let url = format!("sqlite:{path}?mode=rwc");
            let pool = connect_with_retry("sqlite", || {
                sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(&url)
            })
            .await?;

            let store = SqliteOrderStore::new(pool);
            store.init().await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            let pool = connect_with_retry("postgres", || {
                sqlx::postgres::PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(&config.postgres.uri)
            })
            .await?;

            let store = PostgresOrderStore::new(pool);
            store.init().await?;
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        other => {
            error!(storage = %other, "storage backend requested but its feature is not enabled");
            Err(StorageError::Unavailable(format!(
                "storage backend '{other}' not compiled in"
            )))
        }
    }
}

/// Connect a pool with exponential backoff.
#[cfg(any(feature = "sqlite", feature = "postgres"))]
async fn connect_with_retry<P, F, Fut>(backend: &str, connect: F) -> Result<P>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = std::result::Result<P, sqlx::Error>>,
{
    use std::time::Duration;

    use backon::{ExponentialBuilder, Retryable};
    use tracing::warn;

    let backoff = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(10);

    connect
        .retry(backoff)
        .when(|e: &sqlx::Error| matches!(e, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut))
        .notify(|e: &sqlx::Error, delay: Duration| {
            warn!(backend, error = %e, ?delay, "database connection failed, retrying");
        })
        .await
        .map_err(|e| {
            error!(backend, error = %e, "database connection failed");
            StorageError::from(e)
        })
}
