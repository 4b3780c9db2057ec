//! Delivery partner configuration types.

use std::time::Duration;

use serde::Deserialize;

/// Delivery partner ("Drive") configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Dispatch delivery orders. When false, orders are stored only.
    pub enabled: bool,
    /// API origin, without path.
    pub base_url: String,
    /// Developer id, the `iss` claim of the signed token.
    pub developer_id: String,
    /// Key id, the `kid` claim of the signed token.
    pub key_id: String,
    /// Base64url-encoded signing secret.
    pub signing_secret: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Pickup details used when the order payload lacks them.
    pub pickup: PickupConfig,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://openapi.doordash.com".to_string(),
            developer_id: String::new(),
            key_id: String::new(),
            signing_secret: String::new(),
            timeout_secs: 30,
            pickup: PickupConfig::default(),
        }
    }
}

impl DeliveryConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Names of required credentials that are empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("developer_id", &self.developer_id),
            ("key_id", &self.key_id),
            ("signing_secret", &self.signing_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Fallback pickup details for the store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    pub business_name: String,
    pub phone: String,
    pub address: String,
    pub instructions: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_config_default() {
        let config = DeliveryConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(
            config.missing_credentials(),
            vec!["developer_id", "key_id", "signing_secret"]
        );
    }

    #[test]
    fn test_missing_credentials_complete() {
        let config = DeliveryConfig {
            developer_id: "dev".to_string(),
            key_id: "key".to_string(),
            signing_secret: "c2VjcmV0".to_string(),
            ..DeliveryConfig::default()
        };
        assert!(config.missing_credentials().is_empty());
    }
}
