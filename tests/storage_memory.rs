//! In-memory storage integration tests.
//!
//! Run with: cargo test --test storage_memory

mod storage;

use order_relay::storage::InMemoryOrderStore;

#[tokio::test]
async fn test_memory_order_store() {
    println!("=== In-memory OrderStore Tests ===");

    let store = InMemoryOrderStore::new();
    run_order_store_tests!(&store);

    println!("=== All in-memory OrderStore tests PASSED ===");
}
