//! Order intake endpoint.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use super::SharedState;
use crate::dispatch::WebhookReport;

const API_KEY_HEADER: &str = "x-api-key";
const API_KEY_QUERY: &str = "key";

/// Accept a webhook body and run it through the controller.
///
/// Malformed bodies and orders without an id answer 200 with
/// `success: false` so the sender does not retry them forever.
pub(super) async fn receive(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(expected) = state.webhook.api_key.as_deref() {
        if !presented_key_matches(expected, &headers, &query) {
            warn!("Webhook request rejected: missing or wrong API key");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"success": false, "message": "Unauthorized"})),
            )
                .into_response();
        }
    }

    let report = match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => state.controller.handle_webhook(&payload).await,
        Err(e) => {
            warn!(error = %e, "Webhook body is not valid JSON");
            WebhookReport::malformed(e)
        }
    };

    let status = if report.storage_failed && state.webhook.retry_on_storage_failure {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status, Json(report)).into_response()
}

fn presented_key_matches(
    expected: &str,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
) -> bool {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim());
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim);
    let query_key = query.get(API_KEY_QUERY).map(String::as_str);

    [authorization, api_key, query_key]
        .into_iter()
        .flatten()
        .any(|key| key == expected)
}
