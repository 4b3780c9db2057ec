//! Server and webhook configuration types.

use serde::Deserialize;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Inbound webhook configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Route the ordering platform posts to.
    pub path: String,
    /// Shared key expected from the sender. Unset disables the check.
    pub api_key: Option<String>,
    /// Answer 503 instead of 200 when an order could not be stored, so the
    /// sender retries. Default: false (200 with `success: false`).
    pub retry_on_storage_failure: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            path: "/webhook".to_string(),
            api_key: None,
            retry_on_storage_failure: false,
        }
    }
}
