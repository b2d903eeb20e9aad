//! Add to cart, apply a coupon and place an order.

#![allow(clippy::unwrap_used)]

use shopwise_client::ClientError;
use shopwise_client::services::{Checkout, Orders};
use shopwise_client::testing::TestClient;
use shopwise_core::{CheckoutForm, PaymentMethod, Price, ValidationError};
use shopwise_integration_tests::item;

fn form(phone: &str, address: &str) -> CheckoutForm {
    CheckoutForm {
        phone_number: phone.to_string(),
        address: address.to_string(),
        payment_method: Some(PaymentMethod::CreditCard),
    }
}

#[tokio::test]
async fn test_coupon_applies_once() {
    let client = TestClient::new();
    client.state.cart().add(item("p", 10_000, 1)).await.unwrap();
    let mut checkout = Checkout::new(client.state.clone());

    assert_eq!(
        checkout.apply_coupon("coupon888").unwrap(),
        "Coupon successfully applied!"
    );
    assert_eq!(checkout.total(), Price::from_cents(8800));

    let err = checkout.apply_coupon("coupon888").unwrap_err();
    assert_eq!(err.to_string(), "Coupon already applied.");
    assert_eq!(checkout.total(), Price::from_cents(8800));
}

#[tokio::test]
async fn test_checkout_validation_order() {
    let client = TestClient::new();
    let mut checkout = Checkout::new(client.state.clone());

    let err = checkout.place_order(&form("", "")).await.unwrap_err();
    assert_eq!(err.to_string(), "Please log in to place an order.");

    client.login().await;
    let err = checkout.place_order(&form("", "")).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(ValidationError::EmptyCart)));

    client.state.cart().add(item("p", 100, 1)).await.unwrap();
    let err = checkout.place_order(&form("", "")).await.unwrap_err();
    assert_eq!(err.to_string(), "Please fill in all fields");

    let err = checkout
        .place_order(&form("12345", "1 Main St"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid 10-digit phone number");

    let err = checkout
        .place_order(&form("5551234567", &"x".repeat(31)))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Address must not exceed 30 characters");

    assert!(client.gateway.created_orders().is_empty());
}

#[tokio::test]
async fn test_placed_order_appears_in_history() {
    let client = TestClient::new();
    client.login().await;
    client.state.cart().add(item("a", 1500, 2)).await.unwrap();
    client.state.cart().add(item("b", 500, 1)).await.unwrap();

    let mut checkout = Checkout::new(client.state.clone());
    checkout.apply_coupon("coupon888").unwrap();
    let receipt = checkout
        .place_order(&form("5551234567", "1 Main St"))
        .await
        .unwrap();
    let placed = receipt.order.unwrap();

    assert!(client.state.cart().items().is_empty());
    assert!(client.gateway.remote_cart().is_empty());

    let history = Orders::new(client.state.clone()).list().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, placed.id);
    assert_eq!(history[0].total, Price::from_cents(3080));
    assert_eq!(history[0].item_count(), 3);
}
