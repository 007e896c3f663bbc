mod common;

use gateway_failover::application::dispatcher::Dispatcher;
use gateway_failover::domain::counter::{CountDelta, CounterLimits};
use gateway_failover::domain::ports::{CounterStore, CounterStoreBox, GatewayBox};
use gateway_failover::infrastructure::dummy::DummyGateway;
use gateway_failover::infrastructure::in_memory::InMemoryCounterStore;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let store: CounterStoreBox = Arc::new(InMemoryCounterStore::new());
    let gateway: GatewayBox = Arc::new(DummyGateway::new("dummy"));

    // Verify Send + Sync by spawning tasks
    let store_handle = {
        let store = store.clone();
        tokio::spawn(async move {
            store.ensure_provider("dummy").await.unwrap();
            store
                .set_counts("dummy", CountDelta::transaction(dec!(3)))
                .await
                .unwrap()
        })
    };

    let dispatcher = Dispatcher::single(gateway);
    let dispatch_handle = tokio::spawn(async move {
        let mut tx = common::card_transaction(&dispatcher, dec!(3));
        tx.charge().await.unwrap()
    });

    let counts = store_handle.await.unwrap();
    assert_eq!(counts.day_count, 1);
    assert_eq!(dispatch_handle.await.unwrap(), "dummy-1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_charges_respect_limit() {
    let store: CounterStoreBox = Arc::new(InMemoryCounterStore::new());
    let counted: GatewayBox = Arc::new(
        gateway_failover::application::counter::CountedGateway::new(
            Arc::new(DummyGateway::new("shared")),
            store.clone(),
            CounterLimits::new().day_transactions(21),
        ),
    );
    let dispatcher = Dispatcher::single(counted);

    let handles: Vec<_> = (0..40)
        .map(|_| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                common::card_transaction(&dispatcher, dec!(1))
                    .charge()
                    .await
                    .is_ok()
            })
        })
        .collect();

    let mut approved = 0;
    for handle in handles {
        if handle.await.unwrap() {
            approved += 1;
        }
    }

    assert_eq!(approved, 20);
    assert_eq!(store.get_counts("shared").await.unwrap().day_count, 20);
}
