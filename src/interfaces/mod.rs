//! Abstract interfaces for order-relay components.
//!
//! These traits define the contracts for:
//! - Order storage (persistence)
//! - Delivery partner access (dispatch and status lookup)

pub mod delivery_client;
pub mod order_store;

pub use delivery_client::{DeliveryClient, DeliveryCreated, DeliveryError, DeliveryStatus};
pub use order_store::{OrderStore, StorageError};
