//! HTTP client for the partner's Drive API.
//!
//! Every request carries a cached signed bearer token. Creates are a single
//! POST. Status lookups walk three routes, moving on only when a route
//! answers 404.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::auth::{JwtSigner, TokenCache};
use super::payload::DrivePayload;
use crate::config::DeliveryConfig;
use crate::interfaces::delivery_client::{
    DeliveryClient, DeliveryCreated, DeliveryError, DeliveryStatus, Result,
};

const CREATE_PATH: &str = "/drive/v2/deliveries";

/// Lookup route prefixes as path segments, tried in order: partner id,
/// external id, legacy route. The id is appended as one escaped segment.
const STATUS_ROUTES: &[&[&str]] = &[
    &["drive", "v2", "deliveries"],
    &["drive", "v2", "deliveries", "external"],
    &["drive", "v1", "deliveries"],
];

/// Status reported when a response omits one.
const UNKNOWN_STATUS: &str = "unknown";

/// Signed client for the Drive API.
pub struct DriveClient {
    client: Client,
    base_url: Url,
    tokens: TokenCache,
}

impl DriveClient {
    /// Create a client against `base_url`, an origin with an optional path prefix.
    pub fn new(base_url: &str, signer: JwtSigner, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(base_url)
            .map_err(|e| DeliveryError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DeliveryError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client,
            base_url,
            tokens: TokenCache::new(signer),
        })
    }

    /// Create from the delivery section of the configuration.
    pub fn from_config(config: &DeliveryConfig) -> Result<Self> {
        let signer = JwtSigner::new(&config.developer_id, &config.key_id, &config.signing_secret)?;
        Self::new(&config.base_url, signer, config.timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// `route` under the base URL with `id` as a single percent-encoded segment.
    fn status_url(&self, route: &[&str], id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DeliveryError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(route)
            .push(id);
        Ok(url)
    }

    async fn get_status_at(&self, route: &[&str], id: &str) -> Result<DeliveryStatus> {
        let url = self.status_url(route, id)?;
        let bearer = self.tokens.bearer().await?;

        let response = self.client.get(url).bearer_auth(bearer).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(DeliveryError::NotFound { id: id.to_string() });
        }
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DeliveryError::Decode(e.to_string()))?;

        Ok(DeliveryStatus {
            status: delivery_status(&body),
            tracking_url: text_field(&body, &["tracking_url"]),
        })
    }
}

#[async_trait]
impl DeliveryClient for DriveClient {
    async fn create_delivery(&self, payload: &DrivePayload) -> Result<DeliveryCreated> {
        let url = self.url(CREATE_PATH);
        let bearer = self.tokens.bearer().await?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(bearer)
            .json(payload)
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            warn!(
                external_delivery_id = %payload.external_delivery_id,
                body = %body,
                "Delivery already exists at partner"
            );
            return Err(DeliveryError::Duplicate { body });
        }
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DeliveryError::Decode(e.to_string()))?;

        let partner_delivery_id = text_field(&body, &["delivery_id", "id", "external_delivery_id"])
            .ok_or_else(|| DeliveryError::Decode("response carries no delivery id".to_string()))?;

        info!(
            external_delivery_id = %payload.external_delivery_id,
            partner_delivery_id = %partner_delivery_id,
            "Delivery created"
        );

        Ok(DeliveryCreated {
            partner_delivery_id,
            status: delivery_status(&body),
            tracking_url: text_field(&body, &["tracking_url"]),
        })
    }

    async fn get_delivery_status(&self, id: &str) -> Result<DeliveryStatus> {
        for route in STATUS_ROUTES {
            match self.get_status_at(route, id).await {
                Err(DeliveryError::NotFound { .. }) => {
                    debug!(id, route = %route.join("/"), "Delivery not found on route, trying next");
                }
                other => return other,
            }
        }

        Err(DeliveryError::NotFound { id: id.to_string() })
    }
}

async fn api_error(status: StatusCode, response: Response) -> DeliveryError {
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, body = %body, "Delivery API request failed");
    DeliveryError::Api {
        status: status.as_u16(),
        body,
    }
}

fn delivery_status(body: &Value) -> String {
    text_field(body, &["status", "delivery_status"]).unwrap_or_else(|| UNKNOWN_STATUS.to_string())
}

fn text_field(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| body.get(key).and_then(crate::orders::extract::scalar_text))
}
