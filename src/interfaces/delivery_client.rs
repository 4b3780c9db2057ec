//! Delivery partner client interface.

use async_trait::async_trait;
use serde::Serialize;

use crate::delivery::DrivePayload;

/// Result type for delivery partner operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Errors that can occur when talking to the delivery partner.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Delivery API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Delivery already exists: {body}")]
    Duplicate { body: String },

    #[error("Delivery not found: {id}")]
    NotFound { id: String },

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("Unexpected delivery API response: {0}")]
    Decode(String),

    #[error("Order total {0} does not fit in minor units")]
    InvalidAmount(rust_decimal::Decimal),

    #[error("Invalid delivery API URL: {0}")]
    InvalidUrl(String),

    #[error("Delivery integration disabled")]
    Disabled,
}

impl DeliveryError {
    /// Upstream HTTP status, when the failure carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DeliveryError::Api { status, .. } => Some(*status),
            DeliveryError::Duplicate { .. } => Some(409),
            DeliveryError::NotFound { .. } => Some(404),
            DeliveryError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A delivery accepted by the partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryCreated {
    pub partner_delivery_id: String,
    pub status: String,
    pub tracking_url: Option<String>,
}

/// Partner-reported delivery state.
///
/// `status` is opaque: the partner moves deliveries through
/// `created -> claimed -> picked_up -> delivered` (or `cancelled`), but any
/// other value is passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryStatus {
    pub status: String,
    pub tracking_url: Option<String>,
}

/// Interface for the delivery partner API.
///
/// Implementations:
/// - `DriveClient`: signed HTTP calls to the partner
/// - `NoopDeliveryClient`: integration disabled
/// - `MockDeliveryClient`: scripted responses for tests
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Create a delivery. A single attempt; never retried internally.
    async fn create_delivery(&self, payload: &DrivePayload) -> Result<DeliveryCreated>;

    /// Look up a delivery by partner id or external delivery id.
    async fn get_delivery_status(&self, id: &str) -> Result<DeliveryStatus>;
}
