//! Canonical order record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer name used when no name field can be resolved.
pub const UNKNOWN_CUSTOMER: &str = "Unknown";
/// Currency used when the payload does not carry one.
pub const DEFAULT_CURRENCY: &str = "USD";
/// Status used when the payload does not carry one.
pub const UNKNOWN_STATUS: &str = "unknown";
/// Order type used when the payload does not carry one.
pub const UNKNOWN_ORDER_TYPE: &str = "unknown";
/// Order type value that makes an order eligible for dispatch.
pub const DELIVERY_ORDER_TYPE: &str = "delivery";

/// Line item of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItem {
    /// Quantity times unit price, `None` on overflow.
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Dispatch state of an order with the delivery partner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchState {
    pub sent: bool,
    pub partner_delivery_id: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Canonical order record.
///
/// Produced by [`normalize`](super::normalize) from a raw webhook payload and
/// persisted by an [`OrderStore`](crate::interfaces::OrderStore). The store
/// returns the same shape, so callers observe authoritative state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub external_order_id: String,
    pub store_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub delivery_address: String,
    pub total_price: Decimal,
    pub currency: String,
    pub status: String,
    pub order_type: String,
    pub items: Vec<OrderItem>,
    pub raw_payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
    #[serde(default)]
    pub dispatch: DispatchState,
}

/// An order as read back from the store.
pub type StoredOrder = Order;

impl Order {
    /// Whether the order type gates it into dispatch.
    pub fn is_delivery(&self) -> bool {
        self.order_type.trim().eq_ignore_ascii_case(DELIVERY_ORDER_TYPE)
    }

    /// Sum of all line totals, `None` on overflow.
    pub fn items_subtotal(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?))
    }

    /// Total price in integer minor units, rounded half away from zero.
    ///
    /// `None` when the amount does not fit an `i64` number of minor units.
    pub fn total_cents(&self) -> Option<i64> {
        use rust_decimal::prelude::ToPrimitive;
        use rust_decimal::RoundingStrategy;

        self.total_price
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }
}
