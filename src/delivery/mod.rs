//! Delivery partner integration.
//!
//! - `auth`: signed bearer tokens and their cache
//! - `payload`: order to delivery-creation body mapping
//! - `client`: the signed HTTP client
//! - `noop`: stand-in used when the integration is disabled
//! - `mock`: scripted client for tests

use std::sync::Arc;

use tracing::info;

use crate::config::DeliveryConfig;
use crate::interfaces::delivery_client::{DeliveryClient, Result};

pub mod auth;
pub mod client;
pub mod mock;
pub mod noop;
pub mod payload;

pub use auth::{JwtSigner, SignedToken, TokenCache};
pub use client::DriveClient;
pub use mock::MockDeliveryClient;
pub use noop::NoopDeliveryClient;
pub use payload::{build_delivery_payload, normalize_phone, DrivePayload};

/// Build the delivery client selected by configuration.
pub fn init_delivery_client(config: &DeliveryConfig) -> Result<Arc<dyn DeliveryClient>> {
    if !config.enabled {
        info!("Delivery integration disabled, orders will be stored only");
        return Ok(Arc::new(NoopDeliveryClient));
    }

    info!(base_url = %config.base_url, "Delivery integration enabled");
    Ok(Arc::new(DriveClient::from_config(config)?))
}
