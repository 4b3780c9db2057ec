//! Shared storage helper functions.
//!
//! Row encoding and decoding used by the SQL backends.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sea_query::SimpleExpr;

use crate::interfaces::order_store::{Result, StorageError};
use crate::orders::{DispatchState, Order};

/// Fixed-width RFC 3339 UTC, so stored timestamps sort lexically.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
pub fn parse_timestamp(column: &'static str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StorageError::InvalidTimestamp {
            column,
            value: value.to_string(),
        })
}

/// Values for [`UPSERT_COLUMNS`](super::schema::UPSERT_COLUMNS), in order.
pub fn upsert_values(order: &Order) -> Result<Vec<SimpleExpr>> {
    Ok(vec![
        order.external_order_id.as_str().into(),
        order.store_id.as_str().into(),
        order.customer_name.as_str().into(),
        order.customer_phone.as_str().into(),
        order.customer_email.as_str().into(),
        order.delivery_address.as_str().into(),
        order.total_price.to_string().into(),
        order.currency.as_str().into(),
        order.status.as_str().into(),
        order.order_type.as_str().into(),
        serde_json::to_string(&order.items)?.into(),
        serde_json::to_string(&order.raw_payload)?.into(),
        format_timestamp(&order.created_at).into(),
        format_timestamp(&order.updated_at).into(),
        format_timestamp(&order.fetched_at).into(),
    ])
}

/// Raw column values of one `orders` row.
pub struct OrderRow {
    pub external_order_id: String,
    pub store_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub delivery_address: String,
    pub total_price: String,
    pub currency: String,
    pub status: String,
    pub order_type: String,
    pub items: String,
    pub raw_payload: String,
    pub created_at: String,
    pub updated_at: String,
    pub fetched_at: String,
    pub dispatch_sent: i32,
    pub partner_delivery_id: Option<String>,
    pub dispatched_at: Option<String>,
}

impl OrderRow {
    /// Decode into the canonical order.
    pub fn into_order(self) -> Result<Order> {
        let total_price =
            Decimal::from_str(&self.total_price).map_err(|_| StorageError::InvalidDecimal {
                column: "total_price",
                value: self.total_price.clone(),
            })?;

        let sent_at = self
            .dispatched_at
            .as_deref()
            .map(|ts| parse_timestamp("dispatched_at", ts))
            .transpose()?;

        Ok(Order {
            external_order_id: self.external_order_id,
            store_id: self.store_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            delivery_address: self.delivery_address,
            total_price,
            currency: self.currency,
            status: self.status,
            order_type: self.order_type,
            items: serde_json::from_str(&self.items)?,
            raw_payload: serde_json::from_str(&self.raw_payload)?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            fetched_at: parse_timestamp("fetched_at", &self.fetched_at)?,
            dispatch: DispatchState {
                sent: self.dispatch_sent != 0,
                partner_delivery_id: self.partner_delivery_id,
                sent_at,
            },
        })
    }
}

/// Decode an `orders` row from any sqlx row type.
macro_rules! decode_order_row {
    ($row:expr) => {{
        use sqlx::Row;
        let row = $row;
        $crate::storage::helpers::OrderRow {
            external_order_id: row.try_get("external_order_id")?,
            store_id: row.try_get("store_id")?,
            customer_name: row.try_get("customer_name")?,
            customer_phone: row.try_get("customer_phone")?,
            customer_email: row.try_get("customer_email")?,
            delivery_address: row.try_get("delivery_address")?,
            total_price: row.try_get("total_price")?,
            currency: row.try_get("currency")?,
            status: row.try_get("status")?,
            order_type: row.try_get("order_type")?,
            items: row.try_get("items")?,
            raw_payload: row.try_get("raw_payload")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            fetched_at: row.try_get("fetched_at")?,
            dispatch_sent: row.try_get("dispatch_sent")?,
            partner_delivery_id: row.try_get("partner_delivery_id")?,
            dispatched_at: row.try_get("dispatched_at")?,
        }
        .into_order()
    }};
}

pub(crate) use decode_order_row;
