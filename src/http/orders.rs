//! Read API over stored orders and partner delivery state.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use super::{ApiError, SharedState};
use crate::interfaces::{DeliveryError, DeliveryStatus};
use crate::orders::StoredOrder;

const DEFAULT_LIMIT: u32 = 50;
const DEFAULT_WINDOW_MINUTES: u32 = 60;

#[derive(Debug, Deserialize)]
pub(super) struct LimitParams {
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WindowParams {
    minutes: Option<u32>,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn storage_error(e: impl std::fmt::Display) -> ApiError {
    error!(error = %e, "Order read failed");
    ApiError::internal(e)
}

pub(super) async fn list_all(
    State(state): State<SharedState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Vec<StoredOrder>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let orders = state.controller.store().list_all(limit).await.map_err(storage_error)?;
    Ok(Json(orders))
}

pub(super) async fn count(State(state): State<SharedState>) -> ApiResult<Value> {
    let count = state.controller.store().count().await.map_err(storage_error)?;
    Ok(Json(json!({"count": count})))
}

pub(super) async fn list_recent(
    State(state): State<SharedState>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Vec<StoredOrder>> {
    let minutes = params.minutes.unwrap_or(DEFAULT_WINDOW_MINUTES);
    let orders = state
        .controller
        .store()
        .list_recent(minutes)
        .await
        .map_err(storage_error)?;
    Ok(Json(orders))
}

pub(super) async fn list_by_status(
    State(state): State<SharedState>,
    Path(status): Path<String>,
) -> ApiResult<Vec<StoredOrder>> {
    let orders = state
        .controller
        .store()
        .list_by_status(&status)
        .await
        .map_err(storage_error)?;
    Ok(Json(orders))
}

pub(super) async fn get_order(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StoredOrder> {
    state
        .controller
        .store()
        .get_by_external_id(&id)
        .await
        .map_err(storage_error)?
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("Order not found: {id}")))
}

pub(super) async fn delivery_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<DeliveryStatus> {
    state
        .controller
        .delivery()
        .get_delivery_status(&id)
        .await
        .map(Json)
        .map_err(|e| {
            let status = match e {
                DeliveryError::NotFound { .. } => StatusCode::NOT_FOUND,
                DeliveryError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            };
            warn!(id = %id, error = %e, "Delivery status lookup failed");
            ApiError::new(status, e.to_string())
        })
}
