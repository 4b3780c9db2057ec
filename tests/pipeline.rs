//! End-to-end pipeline tests: webhook payload through normalize, store and
//! dispatch, using the in-memory store and the mock delivery client.
//!
//! Run with: cargo test --test pipeline

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{json, Value};

use order_relay::config::PickupConfig;
use order_relay::delivery::MockDeliveryClient;
use order_relay::dispatch::{DispatchController, DispatchOutcome, IngestOutcome};
use order_relay::interfaces::OrderStore;
use order_relay::storage::InMemoryOrderStore;

struct Pipeline {
    store: Arc<InMemoryOrderStore>,
    delivery: Arc<MockDeliveryClient>,
    controller: DispatchController,
}

fn pipeline() -> Pipeline {
    let store = Arc::new(InMemoryOrderStore::new());
    let delivery = Arc::new(MockDeliveryClient::new());
    let controller = DispatchController::new(
        store.clone(),
        delivery.clone(),
        PickupConfig {
            business_name: "Test Kitchen".to_string(),
            phone: "+1 555 0100".to_string(),
            address: "1 Main St".to_string(),
            instructions: String::new(),
        },
    );
    Pipeline {
        store,
        delivery,
        controller,
    }
}

fn order(id: &str, order_type: Option<&str>, status: &str) -> Value {
    let mut payload = json!({"id": id, "status": status, "client_name": "Ana Cruz"});
    if let Some(order_type) = order_type {
        payload["type"] = json!(order_type);
    }
    payload
}

fn dispatch_of(outcome: &IngestOutcome) -> &DispatchOutcome {
    match outcome {
        IngestOutcome::Stored { dispatch, .. } => dispatch,
        other => panic!("expected a stored order, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concrete_order_555() {
    let p = pipeline();
    let payload = json!({
        "id": "555",
        "type": "delivery",
        "client_first_name": "Ana",
        "client_last_name": "Cruz",
        "client_phone": "09171234567",
        "client_address": "12 Rizal St, Manila",
        "total_price": "25.00"
    });

    let outcome = p.controller.handle_order(&payload).await;
    assert_eq!(
        dispatch_of(&outcome),
        &DispatchOutcome::Sent {
            partner_delivery_id: "dd-555".to_string()
        }
    );

    let stored = p.store.get_by_external_id("555").await.unwrap().unwrap();
    assert_eq!(stored.external_order_id, "555");
    assert_eq!(stored.customer_name, "Ana Cruz");
    assert_eq!(stored.delivery_address, "12 Rizal St, Manila");
    assert_eq!(stored.total_price, Decimal::new(2500, 2));
    assert!(stored.dispatch.sent);
    assert_eq!(stored.dispatch.partner_delivery_id.as_deref(), Some("dd-555"));

    let attempts = p.delivery.attempts().await;
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].order_value, 2500);
    assert_eq!(attempts[0].external_delivery_id, "555");
    assert_eq!(attempts[0].dropoff_phone_number, "09171234567");
}

#[tokio::test]
async fn test_dispatch_gating_by_order_type() {
    let p = pipeline();

    let cases = [
        ("g1", Some("Delivery"), true),
        ("g2", Some("DELIVERY"), true),
        ("g3", Some("delivery"), true),
        ("g4", Some("pickup"), false),
        ("g5", Some("dine-in"), false),
        ("g6", None, false),
    ];

    for (id, order_type, eligible) in cases {
        let outcome = p.controller.handle_order(&order(id, order_type, "pending")).await;
        let dispatch = dispatch_of(&outcome);
        if eligible {
            assert!(
                matches!(dispatch, DispatchOutcome::Sent { .. }),
                "{order_type:?} should dispatch"
            );
        } else {
            assert_eq!(dispatch, &DispatchOutcome::NotEligible, "{order_type:?}");
        }
    }

    assert_eq!(p.delivery.create_calls().await, 3);
    assert_eq!(p.store.count().await.unwrap(), 6);
}

#[tokio::test]
async fn test_new_delivery_order_dispatched_regardless_of_status() {
    let p = pipeline();

    let outcome = p
        .controller
        .handle_order(&order("s1", Some("delivery"), "awaiting_acceptance"))
        .await;

    assert!(matches!(dispatch_of(&outcome), DispatchOutcome::Sent { .. }));
}

#[tokio::test]
async fn test_single_dispatch_across_updates() {
    let p = pipeline();

    let first = p
        .controller
        .handle_order(&order("d1", Some("delivery"), "pending"))
        .await;
    assert!(matches!(first, IngestOutcome::Stored { created: true, .. }));

    for status in ["accepted", "ready", "completed"] {
        let outcome = p
            .controller
            .handle_order(&order("d1", Some("delivery"), status))
            .await;
        assert!(matches!(outcome, IngestOutcome::Stored { created: false, .. }));
        assert_eq!(dispatch_of(&outcome), &DispatchOutcome::AlreadySent);
    }

    assert_eq!(p.delivery.create_calls().await, 1);
    assert_eq!(p.store.count().await.unwrap(), 1);

    let stored = p.store.get_by_external_id("d1").await.unwrap().unwrap();
    assert_eq!(stored.status, "completed");
    assert!(stored.dispatch.sent);
}

#[tokio::test]
async fn test_retry_after_partner_failure() {
    let p = pipeline();
    p.delivery.set_fail_with_status(Some(500)).await;

    let first = p
        .controller
        .handle_order(&order("r1", Some("delivery"), "pending"))
        .await;
    assert!(matches!(dispatch_of(&first), DispatchOutcome::Failed { .. }));

    let stored = p.store.get_by_external_id("r1").await.unwrap().unwrap();
    assert!(!stored.dispatch.sent, "failed dispatch leaves sent false");

    p.delivery.set_fail_with_status(None).await;
    let second = p
        .controller
        .handle_order(&order("r1", Some("delivery"), "accepted"))
        .await;
    assert!(matches!(dispatch_of(&second), DispatchOutcome::Sent { .. }));

    assert_eq!(p.delivery.create_calls().await, 2);
    let stored = p.store.get_by_external_id("r1").await.unwrap().unwrap();
    assert!(stored.dispatch.sent);
}

#[tokio::test]
async fn test_storage_failure_skips_dispatch() {
    let p = pipeline();
    p.store.set_fail_on_upsert(true).await;

    let outcome = p
        .controller
        .handle_order(&order("f1", Some("delivery"), "pending"))
        .await;

    assert!(matches!(outcome, IngestOutcome::StorageFailed { .. }));
    assert_eq!(p.delivery.create_calls().await, 0);
}

#[tokio::test]
async fn test_flat_fields_beat_nested_customer() {
    let p = pipeline();
    let payload = json!({
        "id": "p1",
        "client_first_name": "Ana",
        "client_last_name": "Cruz",
        "customer": {"name": "Someone Else"}
    });

    p.controller.handle_order(&payload).await;

    let stored = p.store.get_by_external_id("p1").await.unwrap().unwrap();
    assert_eq!(stored.customer_name, "Ana Cruz");
}

#[tokio::test]
async fn test_missing_name_defaults_to_unknown() {
    let p = pipeline();

    p.controller.handle_order(&json!({"id": "u1"})).await;

    let stored = p.store.get_by_external_id("u1").await.unwrap().unwrap();
    assert_eq!(stored.customer_name, "Unknown");
}

#[tokio::test]
async fn test_webhook_batch_envelope() {
    let p = pipeline();

    let report = p
        .controller
        .handle_webhook(&json!({"orders": [
            order("b1", Some("delivery"), "pending"),
            order("b2", Some("pickup"), "pending")
        ]}))
        .await;

    assert!(report.success);
    assert_eq!(report.orders.len(), 2);
    assert_eq!(p.delivery.create_calls().await, 1);
}
