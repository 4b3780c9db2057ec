//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Orders table schema.
#[derive(Iden, Clone, Copy)]
pub enum Orders {
    Table,
    #[iden = "external_order_id"]
    ExternalOrderId,
    #[iden = "store_id"]
    StoreId,
    #[iden = "customer_name"]
    CustomerName,
    #[iden = "customer_phone"]
    CustomerPhone,
    #[iden = "customer_email"]
    CustomerEmail,
    #[iden = "delivery_address"]
    DeliveryAddress,
    #[iden = "total_price"]
    TotalPrice,
    #[iden = "currency"]
    Currency,
    #[iden = "status"]
    Status,
    #[iden = "order_type"]
    OrderType,
    #[iden = "items"]
    Items,
    #[iden = "raw_payload"]
    RawPayload,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
    #[iden = "fetched_at"]
    FetchedAt,
    #[iden = "dispatch_sent"]
    DispatchSent,
    #[iden = "partner_delivery_id"]
    PartnerDeliveryId,
    #[iden = "dispatched_at"]
    DispatchedAt,
}

/// Every column, in the order rows are decoded.
pub const ORDER_COLUMNS: [Orders; 18] = [
    Orders::ExternalOrderId,
    Orders::StoreId,
    Orders::CustomerName,
    Orders::CustomerPhone,
    Orders::CustomerEmail,
    Orders::DeliveryAddress,
    Orders::TotalPrice,
    Orders::Currency,
    Orders::Status,
    Orders::OrderType,
    Orders::Items,
    Orders::RawPayload,
    Orders::CreatedAt,
    Orders::UpdatedAt,
    Orders::FetchedAt,
    Orders::DispatchSent,
    Orders::PartnerDeliveryId,
    Orders::DispatchedAt,
];

/// Columns written by an upsert. Dispatch columns are left to their defaults.
pub const UPSERT_COLUMNS: [Orders; 15] = [
    Orders::ExternalOrderId,
    Orders::StoreId,
    Orders::CustomerName,
    Orders::CustomerPhone,
    Orders::CustomerEmail,
    Orders::DeliveryAddress,
    Orders::TotalPrice,
    Orders::Currency,
    Orders::Status,
    Orders::OrderType,
    Orders::Items,
    Orders::RawPayload,
    Orders::CreatedAt,
    Orders::UpdatedAt,
    Orders::FetchedAt,
];

/// Columns overwritten when the external id already exists.
///
/// `created_at` and the dispatch columns are never overwritten.
pub const MUTABLE_COLUMNS: [Orders; 13] = [
    Orders::StoreId,
    Orders::CustomerName,
    Orders::CustomerPhone,
    Orders::CustomerEmail,
    Orders::DeliveryAddress,
    Orders::TotalPrice,
    Orders::Currency,
    Orders::Status,
    Orders::OrderType,
    Orders::Items,
    Orders::RawPayload,
    Orders::UpdatedAt,
    Orders::FetchedAt,
];

/// SQL for creating the orders table. Portable across SQLite and PostgreSQL.
pub const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    external_order_id TEXT NOT NULL PRIMARY KEY,
    store_id TEXT NOT NULL DEFAULT '',
    customer_name TEXT NOT NULL,
    customer_phone TEXT NOT NULL DEFAULT '',
    customer_email TEXT NOT NULL DEFAULT '',
    delivery_address TEXT NOT NULL DEFAULT '',
    total_price TEXT NOT NULL,
    currency TEXT NOT NULL,
    status TEXT NOT NULL,
    order_type TEXT NOT NULL,
    items TEXT NOT NULL,
    raw_payload TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    dispatch_sent INTEGER NOT NULL DEFAULT 0,
    partner_delivery_id TEXT,
    dispatched_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at);
"#;
