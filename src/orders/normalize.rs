//! Raw payload to canonical [`Order`].

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use super::extract::{extract_customer, lookup, scalar_text};
use super::model::{
    DispatchState, Order, OrderItem, DEFAULT_CURRENCY, UNKNOWN_ORDER_TYPE, UNKNOWN_STATUS,
};

/// Errors that prevent a payload from becoming an order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("payload has no order id (expected `id` or `order_id`)")]
    MissingOrderId,
}

/// Normalize a raw payload using the current time.
pub fn normalize(raw: &Value) -> Result<Order, NormalizeError> {
    normalize_at(raw, Utc::now())
}

/// Normalize a raw payload with an explicit clock reading.
///
/// `updated_at` and `fetched_at` are always `now`; `created_at` comes from the
/// payload when it carries a parseable timestamp.
pub fn normalize_at(raw: &Value, now: DateTime<Utc>) -> Result<Order, NormalizeError> {
    let external_order_id = first_text(raw, &["id", "order_id"]);
    if external_order_id.is_empty() {
        return Err(NormalizeError::MissingOrderId);
    }

    let customer = extract_customer(raw);

    let total_price = ["total_price", "total"]
        .iter()
        .find_map(|key| raw.get(key))
        .map(parse_decimal)
        .unwrap_or(Decimal::ZERO);

    let items = ["items", "order_items"]
        .iter()
        .find_map(|key| raw.get(key).and_then(Value::as_array))
        .map(|items| items.iter().map(parse_item).collect())
        .unwrap_or_default();

    let created_at = ["created_at", "order_date"]
        .iter()
        .find_map(|key| raw.get(key).and_then(parse_timestamp))
        .unwrap_or(now);

    Ok(Order {
        external_order_id,
        store_id: first_text(raw, &["store_id", "restaurant_id"]),
        customer_name: customer.name,
        customer_phone: customer.phone,
        customer_email: customer.email,
        delivery_address: customer.address,
        total_price,
        currency: or_default(first_text(raw, &["currency"]), DEFAULT_CURRENCY),
        status: or_default(first_text(raw, &["status", "order_status"]), UNKNOWN_STATUS),
        order_type: or_default(first_text(raw, &["order_type", "type"]), UNKNOWN_ORDER_TYPE),
        items,
        raw_payload: raw.clone(),
        created_at,
        updated_at: now,
        fetched_at: now,
        dispatch: DispatchState::default(),
    })
}

/// Extract the order objects carried by a webhook body.
///
/// Accepted shapes: the order itself, `{order: ..}`, `{data: {order: ..}}`,
/// a bare array (first element only) and `{orders: [..]}` (every element).
pub fn unwrap_envelope(body: &Value) -> Vec<Value> {
    match body {
        Value::Array(list) => list.first().filter(|v| v.is_object()).cloned().into_iter().collect(),
        Value::Object(map) => {
            if let Some(orders) = map.get("orders").and_then(Value::as_array) {
                return orders.iter().filter(|v| v.is_object()).cloned().collect();
            }
            if let Some(order) = map.get("order").filter(|v| v.is_object()) {
                return vec![order.clone()];
            }
            if let Some(order) = lookup(body, &["data", "order"]).filter(|v| v.is_object()) {
                return vec![order.clone()];
            }
            vec![body.clone()]
        }
        _ => Vec::new(),
    }
}

fn first_text(raw: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| raw.get(key).and_then(scalar_text))
        .unwrap_or_default()
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Decimal from a number or numeric string; zero on anything else.
fn parse_decimal(value: &Value) -> Decimal {
    let Some(text) = scalar_text(value) else {
        return Decimal::ZERO;
    };
    let text = text.trim_start_matches('$');
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

fn parse_item(value: &Value) -> OrderItem {
    let quantity = value
        .get("quantity")
        .and_then(scalar_text)
        .and_then(|q| q.parse::<f64>().ok())
        .filter(|q| q.is_finite() && *q >= 0.0)
        .map(|q| q as u32)
        .unwrap_or(1);

    OrderItem {
        name: value.get("name").and_then(scalar_text).unwrap_or_default(),
        quantity,
        unit_price: ["price", "unit_price"]
            .iter()
            .find_map(|key| value.get(key))
            .map(parse_decimal)
            .unwrap_or(Decimal::ZERO),
    }
}

/// Years a stored timestamp can carry in four-digit RFC 3339 form.
const TIMESTAMP_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or unix seconds, within
/// [`TIMESTAMP_YEARS`].
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    parse_any_timestamp(value).filter(|dt| TIMESTAMP_YEARS.contains(&dt.year()))
}

fn parse_any_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(secs) = value.as_i64() {
        return DateTime::from_timestamp(secs, 0);
    }
    let text = value.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}
