//! Customer field extraction from variably-shaped order payloads.
//!
//! The upstream payload shape has drifted between integration versions, so
//! each field is resolved from an ordered table of [`Source`]s. The first
//! source yielding a non-empty value wins. Tables are ordered from the newest,
//! most specific shape to the most generic one:
//!
//! 1. root flat fields (`client_first_name`, `client_phone`, ...)
//! 2. nested `client.*`
//! 3. nested `customer.*`
//! 4. generic root `name` / `phone` / `email` / `address`
//!
//! Every function here is pure and total: missing or malformed nested values
//! resolve to empty strings.

use serde_json::Value;

use super::model::UNKNOWN_CUSTOMER;

/// Key path into a JSON object.
pub type Path = &'static [&'static str];

/// Where a field value may be found.
#[derive(Debug, Clone, Copy)]
pub enum Source {
    /// Scalar at a path.
    Text(Path),
    /// First and last name at two paths, joined with a space.
    FullName { first: Path, last: Path },
    /// Address at a path: a structured object is assembled, a string is used as-is.
    Address(Path),
}

pub const NAME_SOURCES: &[Source] = &[
    Source::FullName {
        first: &["client_first_name"],
        last: &["client_last_name"],
    },
    Source::Text(&["client_name"]),
    Source::FullName {
        first: &["client", "first_name"],
        last: &["client", "last_name"],
    },
    Source::Text(&["client", "name"]),
    Source::FullName {
        first: &["customer", "first_name"],
        last: &["customer", "last_name"],
    },
    Source::Text(&["customer", "name"]),
    Source::Text(&["customer_name"]),
    Source::Text(&["name"]),
];

pub const PHONE_SOURCES: &[Source] = &[
    Source::Text(&["client_phone"]),
    Source::Text(&["client", "phone"]),
    Source::Text(&["customer", "phone"]),
    Source::Text(&["customer_phone"]),
    Source::Text(&["phone"]),
];

pub const EMAIL_SOURCES: &[Source] = &[
    Source::Text(&["client_email"]),
    Source::Text(&["client", "email"]),
    Source::Text(&["customer", "email"]),
    Source::Text(&["customer_email"]),
    Source::Text(&["email"]),
];

pub const ADDRESS_SOURCES: &[Source] = &[
    Source::Address(&["client_address_parts"]),
    Source::Address(&["client_address"]),
    Source::Address(&["delivery", "address"]),
    Source::Address(&["client", "address_parts"]),
    Source::Address(&["client", "address"]),
    Source::Address(&["customer", "address_parts"]),
    Source::Address(&["customer", "address"]),
    Source::Address(&["delivery_address"]),
    Source::Address(&["address"]),
];

// Component keys of a structured address, in output order.
const STREET_KEYS: &[&str] = &["street", "street_address", "address1", "address_line_1", "line1"];
const UNIT_KEYS: &[&str] = &["more_address", "unit", "apt", "address2", "address_line_2", "line2"];
const CITY_KEYS: &[&str] = &["city"];
const STATE_KEYS: &[&str] = &["state", "province", "region"];
const ZIP_KEYS: &[&str] = &["zipcode", "zip", "postal_code", "postcode"];
const COUNTRY_KEYS: &[&str] = &["country"];

const ADDRESS_COMPONENTS: &[&[&str]] = &[
    STREET_KEYS,
    UNIT_KEYS,
    CITY_KEYS,
    STATE_KEYS,
    ZIP_KEYS,
    COUNTRY_KEYS,
];

/// Customer fields resolved from a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFields {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

/// Resolve all customer fields.
pub fn extract_customer(payload: &Value) -> CustomerFields {
    CustomerFields {
        name: extract_name(payload),
        phone: extract_phone(payload),
        email: extract_email(payload),
        address: extract_address(payload),
    }
}

/// Customer name, or [`UNKNOWN_CUSTOMER`] when nothing resolves.
pub fn extract_name(payload: &Value) -> String {
    let name = resolve(payload, NAME_SOURCES);
    if name.is_empty() {
        UNKNOWN_CUSTOMER.to_string()
    } else {
        name
    }
}

pub fn extract_phone(payload: &Value) -> String {
    resolve(payload, PHONE_SOURCES)
}

pub fn extract_email(payload: &Value) -> String {
    resolve(payload, EMAIL_SOURCES)
}

pub fn extract_address(payload: &Value) -> String {
    resolve(payload, ADDRESS_SOURCES)
}

/// First non-empty value among `sources`, or an empty string.
pub fn resolve(payload: &Value, sources: &[Source]) -> String {
    sources
        .iter()
        .find_map(|source| read_source(payload, source))
        .unwrap_or_default()
}

fn read_source(payload: &Value, source: &Source) -> Option<String> {
    match source {
        Source::Text(path) => lookup(payload, path).and_then(scalar_text),
        Source::FullName { first, last } => {
            let first = lookup(payload, first).and_then(scalar_text);
            let last = lookup(payload, last).and_then(scalar_text);
            match (first, last) {
                (Some(f), Some(l)) => Some(format!("{f} {l}")),
                (Some(f), None) => Some(f),
                (None, Some(l)) => Some(l),
                (None, None) => None,
            }
        }
        Source::Address(path) => {
            let value = lookup(payload, path)?;
            if value.is_object() {
                format_address(value)
            } else {
                scalar_text(value)
            }
        }
    }
}

/// Walk `path` from `value`. Non-object intermediates resolve to `None`.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

/// Trimmed, non-empty string form of a string or number.
pub fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Join a structured address into `street, unit, city, state, zip, country`,
/// skipping empty components. `None` if every component is empty.
pub fn format_address(parts: &Value) -> Option<String> {
    let components: Vec<String> = ADDRESS_COMPONENTS
        .iter()
        .filter_map(|keys| keys.iter().find_map(|key| parts.get(key).and_then(scalar_text)))
        .collect();

    if components.is_empty() {
        None
    } else {
        Some(components.join(", "))
    }
}
