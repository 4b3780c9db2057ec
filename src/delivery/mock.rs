//! Mock delivery client for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::payload::DrivePayload;
use crate::interfaces::delivery_client::{
    DeliveryClient, DeliveryCreated, DeliveryError, DeliveryStatus, Result,
};

/// Mock delivery client for testing.
///
/// Records every create attempt. Successful creates are assigned the id
/// `dd-{external_delivery_id}` and become visible to status lookups under
/// both ids.
#[derive(Default)]
pub struct MockDeliveryClient {
    attempts: RwLock<Vec<DrivePayload>>,
    deliveries: RwLock<HashMap<String, DeliveryStatus>>,
    fail_with_status: RwLock<Option<u16>>,
    reject_as_duplicate: RwLock<bool>,
}

impl MockDeliveryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail creates with an API error carrying `status`, or succeed on `None`.
    pub async fn set_fail_with_status(&self, status: Option<u16>) {
        *self.fail_with_status.write().await = status;
    }

    /// Answer creates with 409 as if the delivery already existed.
    pub async fn set_reject_as_duplicate(&self, reject: bool) {
        *self.reject_as_duplicate.write().await = reject;
    }

    /// Register a delivery visible to status lookups.
    pub async fn insert_delivery(&self, id: &str, status: &str) {
        self.deliveries.write().await.insert(
            id.to_string(),
            DeliveryStatus {
                status: status.to_string(),
                tracking_url: None,
            },
        );
    }

    /// Number of create attempts, successful or not.
    pub async fn create_calls(&self) -> usize {
        self.attempts.read().await.len()
    }

    /// Payloads of every create attempt, in order.
    pub async fn attempts(&self) -> Vec<DrivePayload> {
        self.attempts.read().await.clone()
    }
}

#[async_trait]
impl DeliveryClient for MockDeliveryClient {
    async fn create_delivery(&self, payload: &DrivePayload) -> Result<DeliveryCreated> {
        self.attempts.write().await.push(payload.clone());

        if let Some(status) = *self.fail_with_status.read().await {
            return Err(DeliveryError::Api {
                status,
                body: "Mock delivery failure".to_string(),
            });
        }

        if *self.reject_as_duplicate.read().await {
            return Err(DeliveryError::Duplicate {
                body: "Mock duplicate delivery".to_string(),
            });
        }

        let partner_delivery_id = format!("dd-{}", payload.external_delivery_id);
        let status = DeliveryStatus {
            status: "created".to_string(),
            tracking_url: None,
        };

        let mut deliveries = self.deliveries.write().await;
        deliveries.insert(payload.external_delivery_id.clone(), status.clone());
        deliveries.insert(partner_delivery_id.clone(), status.clone());

        Ok(DeliveryCreated {
            partner_delivery_id,
            status: status.status,
            tracking_url: None,
        })
    }

    async fn get_delivery_status(&self, id: &str) -> Result<DeliveryStatus> {
        self.deliveries
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DeliveryError::NotFound { id: id.to_string() })
    }
}
