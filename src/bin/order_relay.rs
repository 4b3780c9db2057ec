//! order-relay: webhook intake and delivery dispatch server
//!
//! ## Configuration
//! ```yaml
//! server:
//!   port: 8080
//! storage:
//!   type: sqlite
//!   sqlite:
//!     path: data/orders.db
//! webhook:
//!   path: /webhook
//! delivery:
//!   enabled: true
//!   developer_id: ...
//!   key_id: ...
//!   signing_secret: ...
//! ```
//!
//! Every key can be overridden with `ORDER_RELAY__SECTION__KEY`.

use tracing::{error, info};

use order_relay::config::Config;
use order_relay::http;
use order_relay::utils::bootstrap::{build_app_state, init_tracing, parse_config_path};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        storage = %config.storage.storage_type,
        delivery_enabled = config.delivery.enabled,
        "Starting order-relay"
    );

    let state = build_app_state(&config).await.map_err(|e| {
        error!("Failed to initialize: {}", e);
        e as Box<dyn std::error::Error>
    })?;

    http::serve(state, &config.server.bind_address())
        .await
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    Ok(())
}
