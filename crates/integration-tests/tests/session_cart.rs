//! Session transitions and cart reconciliation across the local and remote
//! tiers.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use shopwise_client::ClientState;
use shopwise_client::session::{AuthRecord, SessionPhase};
use shopwise_client::storage::{
    AUTH_KEY, CART_KEY, FileStorage, LocalStorage, MemoryStorage, read_json, write_json,
};
use shopwise_client::testing::{
    FakeGateway, RecordingNavigator, TestClient, expired_token, sample_user, valid_token,
};
use shopwise_client::Credential;
use shopwise_core::{Cart, Email, LineItem, Price, ProductId, User};
use shopwise_integration_tests::item;

// =============================================================================
// Cart invariants
// =============================================================================

#[tokio::test]
async fn test_repeated_adds_merge_into_one_line() {
    let client = TestClient::new();
    let cart = client.state.cart();

    cart.add(item("p1", 1000, 2)).await.unwrap();
    cart.add(item("p1", 1000, 1)).await.unwrap();

    let items = cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(cart.subtotal(), Price::from_cents(3000));
    assert_eq!(cart.total_item_count(), 3);
}

#[tokio::test]
async fn test_non_positive_quantities_never_remain() {
    let client = TestClient::new();
    let cart = client.state.cart();
    cart.add(item("a", 100, 1)).await.unwrap();
    cart.add(item("b", 100, 4)).await.unwrap();

    cart.update_quantity(&ProductId::new("a"), 0).await;
    cart.update_quantity(&ProductId::new("b"), -3).await;

    assert!(cart.items().is_empty());
    assert!(!client.storage.contains(CART_KEY));
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn test_user_defined_only_with_valid_credential() {
    let client = TestClient::new();
    let session = client.state.session();
    assert_eq!(session.phase(), SessionPhase::Anonymous);
    assert!(session.current_user().is_none());
    assert!(session.credential().is_none());

    client.login().await;

    assert_eq!(session.phase(), SessionPhase::Authenticated);
    assert_eq!(session.current_user(), Some(sample_user()));
    assert!(session.credential().is_some_and(|c| c.is_valid()));
}

#[test]
fn test_stored_expired_session_starts_anonymous() {
    let storage = MemoryStorage::new();
    let record = AuthRecord {
        user: sample_user(),
        token: Credential::new(expired_token()).unwrap(),
    };
    write_json(&storage, AUTH_KEY, &record).unwrap();
    write_json(&storage, CART_KEY, &[item("a", 100, 1)]).unwrap();

    let client = TestClient::with_storage(storage);

    assert!(!client.state.session().is_authenticated());
    assert!(!client.storage.contains(AUTH_KEY));
    assert!(!client.storage.contains(CART_KEY));
}

#[tokio::test]
async fn test_logout_empties_cart_and_storage() {
    let client = TestClient::new();
    client.login().await;
    client.state.cart().add(item("a", 500, 2)).await.unwrap();
    assert!(client.storage.contains(CART_KEY));

    client.state.session().logout();

    assert!(client.state.cart().items().is_empty());
    assert!(!client.storage.contains(CART_KEY));
    assert!(!client.storage.contains(AUTH_KEY));
    // The account keeps its cart for the next login.
    assert_eq!(client.gateway.remote_cart().total_item_count(), 2);
}

#[tokio::test]
async fn test_login_pushes_local_cart_to_empty_remote() {
    let client = TestClient::new();
    let cart = client.state.cart();
    cart.add(item("a", 250, 1)).await.unwrap();
    cart.add(item("b", 1000, 2)).await.unwrap();
    let local = cart.items();

    client.login().await;

    assert_eq!(cart.items(), local);
    assert_eq!(client.gateway.merge_cart_calls(), vec![local.clone()]);
    assert_eq!(client.gateway.remote_cart().lines(), local.as_slice());
    assert!(cart.is_loaded());
}

#[tokio::test]
async fn test_login_adopts_remote_cart_over_local() {
    let client = TestClient::new();
    client.state.cart().add(item("local", 100, 1)).await.unwrap();
    client
        .gateway
        .set_remote_cart(Cart::from_lines([item("remote", 900, 3)]));

    client.login().await;

    let items = client.state.cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, ProductId::new("remote"));
    assert!(client.gateway.merge_cart_calls().is_empty());

    let stored: Vec<LineItem> = read_json(client.storage.as_ref(), CART_KEY).unwrap();
    assert_eq!(stored, items);
}

#[tokio::test]
async fn test_second_login_does_not_carry_first_users_cart() {
    let client = TestClient::new();
    client.login().await;
    client.state.cart().add(item("private", 700, 4)).await.unwrap();
    client.gateway.set_remote_cart(Cart::new());

    let other = User {
        id: "u-2".into(),
        name: "Grace Hopper".to_string(),
        email: Email::parse("grace@example.com").unwrap(),
    };
    client
        .state
        .session()
        .login(other.clone(), Credential::new(valid_token()).unwrap())
        .await
        .unwrap();

    assert_eq!(client.state.session().current_user(), Some(other));
    assert!(client.state.cart().items().is_empty());
    assert!(client.gateway.merge_cart_calls().is_empty());
    assert!(client.gateway.remote_cart().is_empty());
}

#[tokio::test]
async fn test_session_and_cart_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(FakeGateway::new());
    let delay = Duration::from_secs(5);

    {
        let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
        let state = ClientState::start(
            gateway.clone(),
            storage,
            Arc::new(RecordingNavigator::new()),
            delay,
        );
        let credential = Credential::new(valid_token()).unwrap();
        state.session().login(sample_user(), credential).await.unwrap();
        state.cart().add(item("kept", 1999, 2)).await.unwrap();
    }

    let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
    assert!(storage.get(AUTH_KEY).is_some());
    let state = ClientState::start(
        gateway.clone(),
        storage,
        Arc::new(RecordingNavigator::new()),
        delay,
    );

    assert_eq!(state.session().current_user(), Some(sample_user()));
    state.cart().load().await;
    assert_eq!(state.cart().total_item_count(), 2);
    assert_eq!(state.cart().subtotal(), Price::from_cents(3998));
}
