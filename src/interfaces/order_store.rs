//! Order storage interface.

use async_trait::async_trait;

use crate::orders::{Order, StoredOrder};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Invalid decimal in column {column}: {value}")]
    InvalidDecimal { column: &'static str, value: String },

    #[error("Invalid timestamp in column {column}: {value}")]
    InvalidTimestamp { column: &'static str, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Interface for order persistence, keyed by external order id.
///
/// Every operation is async regardless of backend, so orchestration code is
/// backend-agnostic.
///
/// Implementations:
/// - `InMemoryOrderStore`: process-local map
/// - `SqliteOrderStore`: SQLite via sqlx
/// - `PostgresOrderStore`: PostgreSQL via sqlx
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert the order, or update the existing record with the same
    /// external id.
    ///
    /// Updates overwrite the mutable fields but keep the original
    /// `created_at` and the dispatch state. Returns the record as stored.
    async fn upsert(&self, order: &Order) -> Result<StoredOrder>;

    /// Fetch an order by its external id.
    async fn get_by_external_id(&self, external_order_id: &str) -> Result<Option<StoredOrder>>;

    /// Record a successful dispatch.
    ///
    /// Idempotent: a second call keeps the first timestamp and partner id.
    /// Fails with [`StorageError::NotFound`] for an unknown id.
    async fn mark_dispatched(&self, external_order_id: &str, partner_delivery_id: &str) -> Result<()>;

    /// Orders whose status equals `status`, newest first.
    async fn list_by_status(&self, status: &str) -> Result<Vec<StoredOrder>>;

    /// Orders created within the last `window_minutes`, newest first.
    async fn list_recent(&self, window_minutes: u32) -> Result<Vec<StoredOrder>>;

    /// Up to `limit` orders, newest first.
    async fn list_all(&self, limit: u32) -> Result<Vec<StoredOrder>>;

    /// Number of stored orders.
    async fn count(&self) -> Result<u64>;
}
