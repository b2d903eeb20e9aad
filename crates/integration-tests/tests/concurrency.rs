//! Interleaved cart updates and change-signal ordering.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use shopwise_client::Signal;
use shopwise_client::events::CartBadge;
use shopwise_client::testing::TestClient;
use shopwise_core::ProductId;
use shopwise_integration_tests::item;

#[tokio::test(start_paused = true)]
async fn test_interleaved_quantity_updates_end_at_last_value() {
    let client = TestClient::new();
    client.login().await;
    let cart = client.state.cart();
    cart.add(item("p", 1000, 3)).await.unwrap();
    let id = ProductId::new("p");

    // The first push stalls so the second update lands while it is in flight.
    client
        .gateway
        .delay_next_update_cart(Duration::from_millis(200));
    tokio::join!(cart.update_quantity(&id, 5), cart.update_quantity(&id, 2));

    assert_eq!(cart.items()[0].quantity, 2);
    assert_eq!(client.gateway.remote_cart().get(&id).unwrap().quantity, 2);
    let last_push = client.gateway.update_cart_calls().pop().unwrap();
    assert_eq!(last_push[0].quantity, 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_adds_from_tasks_are_all_kept() {
    let client = TestClient::new();
    client.login().await;
    client
        .gateway
        .delay_next_update_cart(Duration::from_millis(50));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let cart = client.state.cart();
            tokio::spawn(async move { cart.add(item("p", 100, 1)).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let id = ProductId::new("p");
    assert_eq!(client.state.cart().items()[0].quantity, 5);
    assert_eq!(client.gateway.remote_cart().get(&id).unwrap().quantity, 5);
}

#[tokio::test]
async fn test_session_signal_precedes_cart_signal() {
    let client = TestClient::new();
    let mut signals = client.state.bus().subscribe();

    client.login().await;
    assert_eq!(
        signals.drain(),
        [Signal::SessionChanged, Signal::CartChanged]
    );

    client.state.cart().add(item("a", 100, 1)).await.unwrap();
    assert_eq!(signals.drain(), [Signal::CartChanged]);

    client.state.session().logout();
    assert_eq!(
        signals.drain(),
        [Signal::SessionChanged, Signal::CartChanged]
    );
}

#[tokio::test]
async fn test_badge_follows_cart() {
    let client = TestClient::new();
    let badge = CartBadge::spawn(client.state.cart(), client.state.bus());
    assert_eq!(badge.count(), 0);

    let cart = client.state.cart();
    cart.add(item("a", 100, 2)).await.unwrap();
    cart.add(item("b", 100, 1)).await.unwrap();

    tokio::time::timeout(Duration::from_secs(1), async {
        while badge.count() != 3 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    cart.clear().await;
    tokio::time::timeout(Duration::from_secs(1), async {
        while badge.count() != 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
}
