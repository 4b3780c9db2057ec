//! Process bootstrap for the order-relay binary.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, LOG_ENV_VAR};
use crate::delivery::init_delivery_client;
use crate::dispatch::DispatchController;
use crate::http::AppState;
use crate::storage::init_storage;

/// Boxed startup error.
pub type BootstrapError = Box<dyn std::error::Error + Send + Sync>;

/// Initialize tracing with the ORDER_RELAY_LOG environment variable.
///
/// Defaults to "info" level if ORDER_RELAY_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Config file path from `--config <path>` or `-c <path>`, if given.
pub fn parse_config_path() -> Option<String> {
    config_path_from(std::env::args().skip(1))
}

fn config_path_from(mut args: impl Iterator<Item = String>) -> Option<String> {
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

/// Wire storage, the delivery client and the controller from configuration.
pub async fn build_app_state(config: &Config) -> Result<Arc<AppState>, BootstrapError> {
    let store = init_storage(&config.storage).await?;
    let delivery = init_delivery_client(&config.delivery)?;
    let controller = DispatchController::new(store, delivery, config.delivery.pickup.clone());

    Ok(Arc::new(AppState {
        controller,
        webhook: config.webhook.clone(),
    }))
}
