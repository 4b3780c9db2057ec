//! OrderStore interface tests.
//!
//! These tests verify the contract of the OrderStore trait.
//! Each storage implementation should run these tests. Every test uses its
//! own `test_*` order ids so the tests can share one store.

use chrono::{DateTime, Duration, SubsecRound, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use order_relay::interfaces::{OrderStore, StorageError};
use order_relay::orders::{normalize_at, Order};

/// Current time at the precision the SQL backends keep.
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Build a normalized order from `payload` as of `now`.
pub fn make_order(payload: Value, now: DateTime<Utc>) -> Order {
    normalize_at(&payload, now).expect("payload should normalize")
}

// =============================================================================
// OrderStore::upsert tests
// =============================================================================

pub async fn test_upsert_inserts_new<S: OrderStore>(store: &S) {
    let now = now_micros();
    let order = make_order(
        json!({
            "id": "test_insert_1",
            "type": "delivery",
            "status": "pending",
            "client_first_name": "Ana",
            "client_last_name": "Cruz",
            "client_phone": "09171234567",
            "client_email": "ana@example.com",
            "client_address": "12 Rizal St, Manila",
            "total_price": "25.00",
            "currency": "PHP",
            "items": [
                {"name": "Adobo", "quantity": 2, "price": "9.50"},
                {"name": "Rice", "quantity": 1, "price": "6.00"}
            ]
        }),
        now,
    );

    let stored = store.upsert(&order).await.expect("upsert should succeed");
    assert_eq!(stored, order, "stored record should equal the input");

    let fetched = store
        .get_by_external_id("test_insert_1")
        .await
        .expect("get should succeed")
        .expect("order should exist");

    assert_eq!(fetched.customer_name, "Ana Cruz");
    assert_eq!(fetched.total_price, Decimal::new(2500, 2));
    assert_eq!(fetched.currency, "PHP");
    assert_eq!(fetched.items.len(), 2);
    assert_eq!(fetched.items[0].unit_price, Decimal::new(950, 2));
    assert_eq!(fetched.raw_payload["client_email"], "ana@example.com");
    assert_eq!(fetched.created_at, now);
    assert!(!fetched.dispatch.sent);
}

pub async fn test_upsert_is_idempotent<S: OrderStore>(store: &S) {
    let first_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    let second_at = first_at + Duration::minutes(5);

    let before = store.count().await.expect("count should succeed");

    store
        .upsert(&make_order(
            json!({"id": "test_idempotent_1", "status": "pending"}),
            first_at,
        ))
        .await
        .expect("first upsert should succeed");
    store
        .upsert(&make_order(
            json!({"id": "test_idempotent_1", "status": "accepted"}),
            second_at,
        ))
        .await
        .expect("second upsert should succeed");

    let after = store.count().await.expect("count should succeed");
    assert_eq!(after, before + 1, "same id should yield one record");

    let order = store
        .get_by_external_id("test_idempotent_1")
        .await
        .expect("get should succeed")
        .expect("order should exist");
    assert_eq!(order.status, "accepted");
    assert_eq!(order.created_at, first_at, "created_at from first write");
    assert_eq!(order.updated_at, second_at, "updated_at from second write");
}

pub async fn test_upsert_preserves_dispatch<S: OrderStore>(store: &S) {
    let now = now_micros();
    let order = make_order(json!({"id": "test_preserve_1", "type": "delivery"}), now);

    store.upsert(&order).await.expect("upsert should succeed");
    store
        .mark_dispatched("test_preserve_1", "dd-preserve")
        .await
        .expect("mark should succeed");

    let update = make_order(
        json!({"id": "test_preserve_1", "type": "delivery", "status": "ready"}),
        now + Duration::seconds(1),
    );
    let stored = store.upsert(&update).await.expect("update should succeed");

    assert!(stored.dispatch.sent, "update must not clear dispatch state");
    assert_eq!(
        stored.dispatch.partner_delivery_id.as_deref(),
        Some("dd-preserve")
    );
    assert_eq!(stored.status, "ready");
}

pub async fn test_upsert_out_of_range_created_at<S: OrderStore>(store: &S) {
    let now = now_micros();
    // 10000-01-01T00:00:00Z has no four-digit year.
    let order = make_order(
        json!({"id": "test_far_future_1", "created_at": 253402300800i64}),
        now,
    );

    let stored = store.upsert(&order).await.expect("upsert should succeed");
    assert_eq!(stored.created_at, now, "unrepresentable created_at falls back to now");

    let all = store.list_all(1000).await.expect("list should succeed");
    assert!(all
        .iter()
        .any(|o| o.external_order_id == "test_far_future_1"));
}

// =============================================================================
// OrderStore::mark_dispatched tests
// =============================================================================

pub async fn test_mark_dispatched_is_idempotent<S: OrderStore>(store: &S) {
    let order = make_order(json!({"id": "test_mark_1"}), now_micros());
    store.upsert(&order).await.expect("upsert should succeed");

    store
        .mark_dispatched("test_mark_1", "dd-first")
        .await
        .expect("first mark should succeed");
    let first = store
        .get_by_external_id("test_mark_1")
        .await
        .expect("get should succeed")
        .expect("order should exist");

    store
        .mark_dispatched("test_mark_1", "dd-second")
        .await
        .expect("second mark should succeed");
    let second = store
        .get_by_external_id("test_mark_1")
        .await
        .expect("get should succeed")
        .expect("order should exist");

    assert!(second.dispatch.sent);
    assert_eq!(second.dispatch.partner_delivery_id.as_deref(), Some("dd-first"));
    assert!(second.dispatch.sent_at.is_some());
    assert_eq!(second.dispatch.sent_at, first.dispatch.sent_at);
}

pub async fn test_mark_dispatched_unknown_order<S: OrderStore>(store: &S) {
    let result = store.mark_dispatched("test_mark_missing", "dd-x").await;
    assert!(
        matches!(result, Err(StorageError::NotFound(ref id)) if id == "test_mark_missing"),
        "unknown id should be NotFound, got {result:?}"
    );
}

// =============================================================================
// Query tests
// =============================================================================

pub async fn test_get_missing_order<S: OrderStore>(store: &S) {
    let result = store
        .get_by_external_id("test_get_missing")
        .await
        .expect("get should succeed");
    assert!(result.is_none());
}

pub async fn test_list_by_status<S: OrderStore>(store: &S) {
    let now = now_micros();
    for (id, status) in [
        ("test_status_1", "test_status_cooking"),
        ("test_status_2", "test_status_cooking"),
        ("test_status_3", "test_status_done"),
    ] {
        store
            .upsert(&make_order(json!({"id": id, "status": status}), now))
            .await
            .expect("upsert should succeed");
    }

    let cooking = store
        .list_by_status("test_status_cooking")
        .await
        .expect("list should succeed");
    let mut ids: Vec<_> = cooking.iter().map(|o| o.external_order_id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["test_status_1", "test_status_2"]);

    let none = store
        .list_by_status("test_status_unused")
        .await
        .expect("list should succeed");
    assert!(none.is_empty());
}

pub async fn test_list_recent<S: OrderStore>(store: &S) {
    let now = now_micros();
    let old = now - Duration::hours(3);

    store
        .upsert(&make_order(json!({"id": "test_recent_new"}), now))
        .await
        .expect("upsert should succeed");
    store
        .upsert(&make_order(
            json!({"id": "test_recent_old", "created_at": old.to_rfc3339()}),
            now,
        ))
        .await
        .expect("upsert should succeed");

    let recent = store.list_recent(60).await.expect("list should succeed");
    let ids: Vec<_> = recent.iter().map(|o| o.external_order_id.as_str()).collect();

    assert!(ids.contains(&"test_recent_new"));
    assert!(!ids.contains(&"test_recent_old"));
}

pub async fn test_list_all_newest_first<S: OrderStore>(store: &S) {
    let base = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    for (offset, id) in [(0, "test_all_a"), (2, "test_all_c"), (1, "test_all_b")] {
        let created = base + Duration::minutes(offset);
        store
            .upsert(&make_order(
                json!({"id": id, "created_at": created.to_rfc3339()}),
                created,
            ))
            .await
            .expect("upsert should succeed");
    }

    let top = store.list_all(2).await.expect("list should succeed");
    let ids: Vec<_> = top.iter().map(|o| o.external_order_id.as_str()).collect();
    assert_eq!(ids, vec!["test_all_c", "test_all_b"]);

    let all = store.list_all(1000).await.expect("list should succeed");
    assert!(all
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

/// Run all OrderStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_order_store_tests {
    ($store:expr) => {
        use $crate::storage::order_store_tests::*;

        // upsert tests
        test_upsert_inserts_new($store).await;
        println!("  test_upsert_inserts_new: PASSED");

        test_upsert_is_idempotent($store).await;
        println!("  test_upsert_is_idempotent: PASSED");

        test_upsert_preserves_dispatch($store).await;
        println!("  test_upsert_preserves_dispatch: PASSED");

        test_upsert_out_of_range_created_at($store).await;
        println!("  test_upsert_out_of_range_created_at: PASSED");

        // mark_dispatched tests
        test_mark_dispatched_is_idempotent($store).await;
        println!("  test_mark_dispatched_is_idempotent: PASSED");

        test_mark_dispatched_unknown_order($store).await;
        println!("  test_mark_dispatched_unknown_order: PASSED");

        // query tests
        test_get_missing_order($store).await;
        println!("  test_get_missing_order: PASSED");

        test_list_by_status($store).await;
        println!("  test_list_by_status: PASSED");

        test_list_recent($store).await;
        println!("  test_list_recent: PASSED");

        test_list_all_newest_first($store).await;
        println!("  test_list_all_newest_first: PASSED");
    };
}
