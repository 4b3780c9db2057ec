//! Dispatch controller.
//!
//! Drives each inbound order through normalize, upsert and, for delivery
//! orders not yet sent, a single create call at the delivery partner.
//! Partner failures leave `dispatch.sent` false; the next update for the same
//! order is the only retry path.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::PickupConfig;
use crate::delivery::build_delivery_payload;
use crate::interfaces::{DeliveryClient, DeliveryError, OrderStore};
use crate::orders::{normalize, unwrap_envelope, NormalizeError, StoredOrder};


/// Result of the dispatch stage for one stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Not a delivery order.
    NotEligible,
    /// Dispatched by an earlier event.
    AlreadySent,
    /// Accepted by the partner and recorded.
    Sent { partner_delivery_id: String },
    /// Not dispatched; eligible again on the next update.
    Failed { reason: String },
}

/// Result of handling one raw order.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// No order id could be extracted. Nothing was stored.
    Rejected(NormalizeError),
    /// The store failed. Dispatch was skipped.
    StorageFailed { order_id: String, reason: String },
    /// Stored; `created` is false for an update of a known order.
    Stored {
        order: Box<StoredOrder>,
        created: bool,
        dispatch: DispatchOutcome,
    },
}

impl IngestOutcome {
    pub fn order_id(&self) -> Option<&str> {
        match self {
            IngestOutcome::Rejected(_) => None,
            IngestOutcome::StorageFailed { order_id, .. } => Some(order_id),
            IngestOutcome::Stored { order, .. } => Some(&order.external_order_id),
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, IngestOutcome::Stored { .. })
    }
}

/// Per-order line of a webhook response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReport {
    pub order_id: Option<String>,
    pub stored: bool,
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&IngestOutcome> for OrderReport {
    fn from(outcome: &IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Rejected(e) => OrderReport {
                order_id: None,
                stored: false,
                created: false,
                dispatch: None,
                error: Some(e.to_string()),
            },
            IngestOutcome::StorageFailed { order_id, reason } => OrderReport {
                order_id: Some(order_id.clone()),
                stored: false,
                created: false,
                dispatch: None,
                error: Some(reason.clone()),
            },
            IngestOutcome::Stored {
                order,
                created,
                dispatch,
            } => OrderReport {
                order_id: Some(order.external_order_id.clone()),
                stored: true,
                created: *created,
                dispatch: Some(dispatch.clone()),
                error: None,
            },
        }
    }
}

/// Aggregate result of one webhook body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookReport {
    /// Every order in the body was stored.
    pub success: bool,
    /// Id of the first order in the body.
    pub order_id: Option<String>,
    pub message: String,
    pub orders: Vec<OrderReport>,
    /// At least one order failed in the store.
    #[serde(skip)]
    pub storage_failed: bool,
}

impl WebhookReport {
    /// Report for a body that could not be read as JSON.
    pub fn malformed(reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            order_id: None,
            message: format!("Malformed payload: {reason}"),
            orders: Vec::new(),
            storage_failed: false,
        }
    }

    fn from_outcomes(outcomes: &[IngestOutcome]) -> Self {
        let orders: Vec<OrderReport> = outcomes.iter().map(OrderReport::from).collect();
        let stored = outcomes.iter().filter(|o| o.is_stored()).count();
        let storage_failed = outcomes
            .iter()
            .any(|o| matches!(o, IngestOutcome::StorageFailed { .. }));

        let message = match (outcomes.len(), outcomes.first()) {
            (0, _) => "No order found in payload".to_string(),
            (1, Some(IngestOutcome::Rejected(e))) => e.to_string(),
            (1, Some(IngestOutcome::StorageFailed { .. })) => "Failed to store order".to_string(),
            (1, Some(IngestOutcome::Stored { created: true, .. })) => "Order created".to_string(),
            (1, _) => "Order updated".to_string(),
            (n, _) => format!("Stored {stored} of {n} orders"),
        };

        Self {
            success: !outcomes.is_empty() && stored == outcomes.len(),
            order_id: outcomes
                .first()
                .and_then(IngestOutcome::order_id)
                .map(str::to_string),
            message,
            orders,
            storage_failed,
        }
    }
}

/// Runs the ingest and dispatch pipeline.
pub struct DispatchController {
    store: Arc<dyn OrderStore>,
    delivery: Arc<dyn DeliveryClient>,
    pickup: PickupConfig,
}

impl DispatchController {
    pub fn new(
        store: Arc<dyn OrderStore>,
        delivery: Arc<dyn DeliveryClient>,
        pickup: PickupConfig,
    ) -> Self {
        Self {
            store,
            delivery,
            pickup,
        }
    }

    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    pub fn delivery(&self) -> &Arc<dyn DeliveryClient> {
        &self.delivery
    }

    /// Handle every order carried by a webhook body, in order.
    pub async fn handle_webhook(&self, body: &Value) -> WebhookReport {
        let orders = unwrap_envelope(body);
        if orders.is_empty() {
            warn!("Webhook body carries no order object");
        }

        let mut outcomes = Vec::with_capacity(orders.len());
        for raw in &orders {
            outcomes.push(self.handle_order(raw).await);
        }

        WebhookReport::from_outcomes(&outcomes)
    }

    /// Normalize, store and, when eligible, dispatch one raw order.
    pub async fn handle_order(&self, raw: &Value) -> IngestOutcome {
        let order = match normalize(raw) {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "Rejected order payload");
                return IngestOutcome::Rejected(e);
            }
        };
        let order_id = order.external_order_id.clone();

        let prior = match self.store.get_by_external_id(&order_id).await {
            Ok(prior) => prior,
            Err(e) => return storage_failed(order_id, e),
        };

        let stored = match self.store.upsert(&order).await {
            Ok(stored) => stored,
            Err(e) => return storage_failed(order_id, e),
        };

        let created = prior.is_none();
        info!(
            order_id = %order_id,
            created,
            status = %stored.status,
            order_type = %stored.order_type,
            "Order stored"
        );

        let already_sent = prior.as_ref().is_some_and(|p| p.dispatch.sent);
        let dispatch = if !stored.is_delivery() {
            DispatchOutcome::NotEligible
        } else if already_sent {
            debug!(order_id = %order_id, "Order already dispatched");
            DispatchOutcome::AlreadySent
        } else {
            self.dispatch(&stored).await
        };

        let order = match dispatch {
            DispatchOutcome::Sent { .. } => self.reload(stored).await,
            _ => stored,
        };

        IngestOutcome::Stored {
            order: Box::new(order),
            created,
            dispatch,
        }
    }

    async fn dispatch(&self, order: &StoredOrder) -> DispatchOutcome {
        let order_id = &order.external_order_id;
        let payload = match build_delivery_payload(order, &self.pickup, None) {
            Ok(payload) => payload,
            Err(e) => return dispatch_failed(order_id, e),
        };

        let partner_delivery_id = match self.delivery.create_delivery(&payload).await {
            Ok(created) => created.partner_delivery_id,
            Err(DeliveryError::Duplicate { .. }) => {
                match self.reconcile_duplicate(&payload.external_delivery_id).await {
                    Ok(id) => id,
                    Err(e) => return dispatch_failed(order_id, e),
                }
            }
            Err(e) => return dispatch_failed(order_id, e),
        };

        if let Err(e) = self
            .store
            .mark_dispatched(order_id, &partner_delivery_id)
            .await
        {
            error!(
                order_id = %order_id,
                partner_delivery_id = %partner_delivery_id,
                error = %e,
                "Delivery created but dispatch state not recorded"
            );
            return DispatchOutcome::Failed {
                reason: format!("delivery {partner_delivery_id} created but not recorded: {e}"),
            };
        }

        info!(
            order_id = %order_id,
            partner_delivery_id = %partner_delivery_id,
            "Order dispatched"
        );
        DispatchOutcome::Sent {
            partner_delivery_id,
        }
    }

    /// The partner already holds a delivery under this external id. Confirm it
    /// exists and adopt it instead of creating another.
    async fn reconcile_duplicate(&self, external_delivery_id: &str) -> Result<String, DeliveryError> {
        let status = self.delivery.get_delivery_status(external_delivery_id).await?;
        info!(
            external_delivery_id,
            status = %status.status,
            "Adopted existing partner delivery"
        );
        Ok(external_delivery_id.to_string())
    }

    async fn reload(&self, order: StoredOrder) -> StoredOrder {
        match self.store.get_by_external_id(&order.external_order_id).await {
            Ok(Some(fresh)) => fresh,
            _ => order,
        }
    }
}

fn storage_failed(order_id: String, e: impl std::fmt::Display) -> IngestOutcome {
    error!(order_id = %order_id, error = %e, "Order storage failed, dispatch skipped");
    IngestOutcome::StorageFailed {
        order_id,
        reason: e.to_string(),
    }
}

fn dispatch_failed(order_id: &str, e: DeliveryError) -> DispatchOutcome {
    warn!(
        order_id = %order_id,
        status = ?e.status_code(),
        error = %e,
        "Dispatch failed, order left undispatched"
    );
    DispatchOutcome::Failed {
        reason: e.to_string(),
    }
}
