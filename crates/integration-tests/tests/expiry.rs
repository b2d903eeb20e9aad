//! Rejected credentials end the session, show the notice and redirect.

#![allow(clippy::unwrap_used)]

use shopwise_client::navigator::{SESSION_EXPIRED_MESSAGE, View};
use shopwise_client::services::{Orders, Wishlist};
use shopwise_client::storage::{AUTH_KEY, CART_KEY};
use shopwise_client::testing::{NavEvent, TestClient};
use shopwise_client::Signal;
use shopwise_core::ProductId;
use shopwise_integration_tests::item;
use tokio::time::Instant;

fn notice() -> NavEvent {
    NavEvent::Notice(SESSION_EXPIRED_MESSAGE.to_string())
}

#[tokio::test(start_paused = true)]
async fn test_rejected_cart_push_expires_session_then_redirects() {
    let client = TestClient::new();
    client.login().await;
    let mut signals = client.state.bus().subscribe();
    client.gateway.reject_credentials(true);

    client.state.cart().add(item("a", 100, 1)).await.unwrap();

    let session = client.state.session();
    assert!(!session.is_authenticated());
    assert!(client.state.cart().items().is_empty());
    assert!(!client.storage.contains(AUTH_KEY));
    assert!(!client.storage.contains(CART_KEY));
    assert_eq!(
        signals.drain(),
        [
            Signal::CartChanged,
            Signal::SessionChanged,
            Signal::CartChanged
        ]
    );
    assert_eq!(client.navigator.events(), [notice()]);

    let started = Instant::now();
    session.pending_redirect().unwrap().await.unwrap();

    assert!(started.elapsed() >= TestClient::EXPIRY_DELAY);
    assert_eq!(
        client.navigator.events(),
        [notice(), NavEvent::Dismissed, NavEvent::Navigated(View::Landing)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_repeated_rejections_show_one_notice() {
    let client = TestClient::new();
    client.login().await;
    client.gateway.reject_credentials(true);

    let orders = Orders::new(client.state.clone()).list().await;
    let favorites = Wishlist::new(client.state.clone())
        .toggle(&ProductId::new("1"))
        .await;

    assert!(orders.unwrap_err().is_unauthorized());
    // The session is already gone, so the wishlist refuses locally.
    assert!(!favorites.unwrap_err().is_unauthorized());
    assert_eq!(client.navigator.events(), [notice()]);
}

#[tokio::test(start_paused = true)]
async fn test_login_during_notice_cancels_redirect() {
    let client = TestClient::new();
    client.login().await;
    client.gateway.reject_credentials(true);
    let _ = Orders::new(client.state.clone()).list().await;
    client.gateway.reject_credentials(false);

    client.login().await;
    tokio::time::sleep(TestClient::EXPIRY_DELAY * 2).await;

    assert!(client.state.session().is_authenticated());
    assert_eq!(client.navigator.events(), [notice()]);
}
