//! Delivery client used when the integration is switched off.

use async_trait::async_trait;

use super::payload::DrivePayload;
use crate::interfaces::delivery_client::{
    DeliveryClient, DeliveryCreated, DeliveryError, DeliveryStatus, Result,
};

/// Rejects every call with [`DeliveryError::Disabled`].
///
/// Orders still persist; they stay undispatched and become eligible again
/// on their next update once the integration is enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDeliveryClient;

#[async_trait]
impl DeliveryClient for NoopDeliveryClient {
    async fn create_delivery(&self, _payload: &DrivePayload) -> Result<DeliveryCreated> {
        Err(DeliveryError::Disabled)
    }

    async fn get_delivery_status(&self, _id: &str) -> Result<DeliveryStatus> {
        Err(DeliveryError::Disabled)
    }
}
