//! Order model, field extraction and payload normalization.

pub mod extract;
pub mod model;
pub mod normalize;

pub use extract::{extract_customer, CustomerFields};
pub use model::{DispatchState, Order, OrderItem, StoredOrder};
pub use normalize::{normalize, normalize_at, unwrap_envelope, NormalizeError};
