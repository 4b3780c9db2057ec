//! Mapping from canonical orders to the partner's delivery-creation body.

use serde::Serialize;
use serde_json::Value;

use crate::config::PickupConfig;
use crate::interfaces::delivery_client::{DeliveryError, Result};
use crate::orders::extract::scalar_text;
use crate::orders::Order;

/// Structured store address fields carried on the raw order, in output order.
const PICKUP_COMPONENTS: &[&str] = &[
    "restaurant_street",
    "restaurant_city",
    "restaurant_state",
    "restaurant_zipcode",
    "restaurant_country",
];
const PICKUP_ADDRESS_KEYS: &[&str] = &["restaurant_address", "store_address"];
const PICKUP_NAME_KEYS: &[&str] = &["restaurant_name", "store_name"];
const PICKUP_PHONE_KEYS: &[&str] = &["restaurant_phone", "store_phone"];
const DROPOFF_INSTRUCTION_KEYS: &[&str] = &["instructions", "delivery_instructions"];

/// Delivery-creation request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrivePayload {
    pub external_delivery_id: String,
    pub pickup_address: String,
    pub pickup_business_name: String,
    pub pickup_phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_instructions: Option<String>,
    pub dropoff_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_business_name: Option<String>,
    pub dropoff_phone_number: String,
    pub dropoff_contact_given_name: String,
    pub dropoff_contact_family_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_instructions: Option<String>,
    /// Order value in minor units.
    pub order_value: i64,
    pub currency: String,
}

/// Build the delivery-creation body for `order`.
///
/// `external_delivery_id` replaces the order's external id when given, so a
/// retry can be issued under a fresh id. Pickup details come from the store
/// fields of the raw payload and fall back to `pickup`. Fails with
/// [`DeliveryError::InvalidAmount`] when the total has no minor-unit form.
pub fn build_delivery_payload(
    order: &Order,
    pickup: &PickupConfig,
    external_delivery_id: Option<&str>,
) -> Result<DrivePayload> {
    let raw = &order.raw_payload;
    let (given_name, family_name) = split_name(&order.customer_name);
    let order_value = order
        .total_cents()
        .ok_or(DeliveryError::InvalidAmount(order.total_price))?;

    Ok(DrivePayload {
        external_delivery_id: external_delivery_id
            .unwrap_or(&order.external_order_id)
            .to_string(),
        pickup_address: pickup_address(raw).unwrap_or_else(|| pickup.address.clone()),
        pickup_business_name: first_text(raw, PICKUP_NAME_KEYS)
            .unwrap_or_else(|| pickup.business_name.clone()),
        pickup_phone_number: normalize_phone(
            &first_text(raw, PICKUP_PHONE_KEYS).unwrap_or_else(|| pickup.phone.clone()),
        ),
        pickup_instructions: non_empty(&pickup.instructions),
        dropoff_address: order.delivery_address.clone(),
        dropoff_business_name: None,
        dropoff_phone_number: normalize_phone(&order.customer_phone),
        dropoff_contact_given_name: given_name,
        dropoff_contact_family_name: family_name,
        dropoff_instructions: first_text(raw, DROPOFF_INSTRUCTION_KEYS),
        order_value,
        currency: order.currency.clone(),
    })
}

/// Keep digits and a leading `+`. No country code is inferred.
pub fn normalize_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if trimmed.starts_with('+') && !digits.is_empty() {
        format!("+{digits}")
    } else {
        digits
    }
}

/// Split a full name into given and family name on the first space.
fn split_name(name: &str) -> (String, String) {
    match name.trim().split_once(char::is_whitespace) {
        Some((given, family)) => (given.to_string(), family.trim().to_string()),
        None => (name.trim().to_string(), String::new()),
    }
}

fn pickup_address(raw: &Value) -> Option<String> {
    let components: Vec<String> = PICKUP_COMPONENTS
        .iter()
        .filter_map(|key| raw.get(key).and_then(scalar_text))
        .collect();

    if components.is_empty() {
        first_text(raw, PICKUP_ADDRESS_KEYS)
    } else {
        Some(components.join(", "))
    }
}

fn first_text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| raw.get(key).and_then(scalar_text))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
