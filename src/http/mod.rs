//! HTTP surface: the inbound webhook and the read API.
//!
//! - `POST {webhook.path}`: order intake
//! - `GET /health`
//! - `GET /orders`, `/orders/count`, `/orders/recent`, `/orders/status/:status`,
//!   `/orders/:id`
//! - `GET /deliveries/:id/status`: partner status lookup

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::WebhookConfig;
use crate::dispatch::DispatchController;

mod orders;
mod webhook;


/// Shared state for axum handlers.
pub struct AppState {
    pub controller: DispatchController,
    pub webhook: WebhookConfig,
}

type SharedState = Arc<AppState>;

/// Build the axum router (separated for testing).
pub fn router(state: Arc<AppState>) -> Router {
    let webhook_path = state.webhook.path.clone();

    Router::new()
        .route(&webhook_path, post(webhook::receive))
        .route("/health", get(health))
        .route("/orders", get(orders::list_all))
        .route("/orders/count", get(orders::count))
        .route("/orders/recent", get(orders::list_recent))
        .route("/orders/status/:status", get(orders::list_by_status))
        .route("/orders/:id", get(orders::get_order))
        .route("/deliveries/:id/status", get(orders::delivery_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `address` and serve until the process stops.
pub async fn serve(
    state: Arc<AppState>,
    address: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let webhook_path = state.webhook.path.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(address).await?;
    info!(
        address = %listener.local_addr()?,
        webhook = %webhook_path,
        "order-relay listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// JSON error body `{"error": message}` with a status code.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"error": self.message}))).into_response()
    }
}
