//! In-memory order store.
//!
//! Used for local development without a database and as the test double for
//! controller and HTTP tests. Failure toggles simulate storage outages.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::interfaces::order_store::{OrderStore, Result, StorageError};
use crate::orders::{Order, StoredOrder};

/// Order store backed by a process-local map.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<String, StoredOrder>>,
    fail_on_upsert: RwLock<bool>,
    fail_on_get: RwLock<bool>,
    fail_on_mark: RwLock<bool>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_upsert(&self, fail: bool) {
        *self.fail_on_upsert.write().await = fail;
    }

    pub async fn set_fail_on_get(&self, fail: bool) {
        *self.fail_on_get.write().await = fail;
    }

    pub async fn set_fail_on_mark(&self, fail: bool) {
        *self.fail_on_mark.write().await = fail;
    }

    async fn check(flag: &RwLock<bool>, operation: &str) -> Result<()> {
        if *flag.read().await {
            return Err(StorageError::Unavailable(format!("{operation} disabled")));
        }
        Ok(())
    }

    /// Newest first, optionally truncated.
    fn newest_first(mut orders: Vec<StoredOrder>, limit: Option<usize>) -> Vec<StoredOrder> {
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            orders.truncate(limit);
        }
        orders
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn upsert(&self, order: &Order) -> Result<StoredOrder> {
        Self::check(&self.fail_on_upsert, "upsert").await?;

        let mut orders = self.orders.write().await;
        let stored = match orders.get(&order.external_order_id) {
            Some(existing) => Order {
                created_at: existing.created_at,
                dispatch: existing.dispatch.clone(),
                ..order.clone()
            },
            None => Order {
                dispatch: Default::default(),
                ..order.clone()
            },
        };
        orders.insert(stored.external_order_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get_by_external_id(&self, external_order_id: &str) -> Result<Option<StoredOrder>> {
        Self::check(&self.fail_on_get, "get").await?;
        Ok(self.orders.read().await.get(external_order_id).cloned())
    }

    async fn mark_dispatched(&self, external_order_id: &str, partner_delivery_id: &str) -> Result<()> {
        Self::check(&self.fail_on_mark, "mark_dispatched").await?;

        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(external_order_id)
            .ok_or_else(|| StorageError::NotFound(external_order_id.to_string()))?;

        if !order.dispatch.sent {
            order.dispatch.sent = true;
            order.dispatch.partner_delivery_id = Some(partner_delivery_id.to_string());
            order.dispatch.sent_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn list_by_status(&self, status: &str) -> Result<Vec<StoredOrder>> {
        let orders = self.orders.read().await;
        let matching = orders.values().filter(|o| o.status == status).cloned().collect();
        Ok(Self::newest_first(matching, None))
    }

    async fn list_recent(&self, window_minutes: u32) -> Result<Vec<StoredOrder>> {
        let cutoff = Utc::now() - chrono::Duration::minutes(i64::from(window_minutes));
        let orders = self.orders.read().await;
        let recent = orders.values().filter(|o| o.created_at >= cutoff).cloned().collect();
        Ok(Self::newest_first(recent, None))
    }

    async fn list_all(&self, limit: u32) -> Result<Vec<StoredOrder>> {
        let orders = self.orders.read().await;
        Ok(Self::newest_first(
            orders.values().cloned().collect(),
            Some(limit as usize),
        ))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.orders.read().await.len() as u64)
    }
}
