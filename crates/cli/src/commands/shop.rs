//! Wishlist, orders and checkout commands.

use shopwise_client::Result;
use shopwise_client::services::{Checkout, Orders, Wishlist};
use shopwise_core::{CheckoutForm, PaymentMethod, ProductId};

use super::Context;

pub async fn wishlist(ctx: &Context) -> Result<()> {
    let products = Wishlist::new(ctx.state.clone())
        .favorite_products(&ctx.catalog)
        .await?;
    if products.is_empty() {
        tracing::info!("No favorites yet.");
    }
    for product in products {
        tracing::info!("[{}] {} - {}", product.id, product.title, product.price);
    }
    Ok(())
}

pub async fn toggle_favorite(ctx: &Context, product_id: &str) -> Result<()> {
    let id = ProductId::new(product_id);
    if Wishlist::new(ctx.state.clone()).toggle(&id).await? {
        tracing::info!("Added {id} to favorites.");
    } else {
        tracing::info!("Removed {id} from favorites.");
    }
    Ok(())
}

pub async fn orders(ctx: &Context) -> Result<()> {
    let orders = Orders::new(ctx.state.clone()).list().await?;
    if orders.is_empty() {
        tracing::info!("No orders yet.");
    }
    for order in orders {
        tracing::info!(
            "{}  {}  {} item(s)  {}",
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.id,
            order.item_count(),
            order.total
        );
    }
    Ok(())
}

pub async fn checkout(
    ctx: &Context,
    phone_number: String,
    address: String,
    payment: &str,
    coupon: Option<&str>,
) -> Result<()> {
    ctx.state.cart().load().await;

    let mut checkout = Checkout::new(ctx.state.clone());
    if let Some(code) = coupon {
        tracing::info!("{}", checkout.apply_coupon(code)?);
    }
    let form = CheckoutForm {
        phone_number,
        address,
        payment_method: Some(payment.parse::<PaymentMethod>()?),
    };
    let total = checkout.total();

    let receipt = checkout.place_order(&form).await?;
    match receipt.order {
        Some(order) => tracing::info!("Order {} placed. Total {total}.", order.id),
        None => tracing::info!("Order placed. Total {total}."),
    }
    Ok(())
}
