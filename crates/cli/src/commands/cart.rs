//! Cart commands.
//!
//! Each command reconciles the cart first so a logged-in user edits the
//! merged cart rather than a stale local copy.

use shopwise_client::Result;
use shopwise_client::cart::CartStore;
use shopwise_core::{ProductId, Quantity};

use super::Context;

async fn loaded(ctx: &Context) -> CartStore {
    let cart = ctx.state.cart();
    cart.load().await;
    cart
}

fn print(cart: &CartStore) {
    let items = cart.items();
    if items.is_empty() {
        tracing::info!("Your cart is empty.");
        return;
    }
    for item in &items {
        tracing::info!(
            "{:>4} x {:<40} {:>10}  [{}]",
            item.quantity,
            item.name,
            item.line_total().to_string(),
            item.product_id
        );
    }
    tracing::info!(
        "{} item(s), subtotal {}",
        cart.total_item_count(),
        cart.subtotal()
    );
}

pub async fn show(ctx: &Context) {
    print(&loaded(ctx).await);
}

pub async fn add(ctx: &Context, product_id: &str, quantity: u32) -> Result<()> {
    let quantity = Quantity::for_product_view(quantity)?;
    let product = ctx.catalog.product(&ProductId::new(product_id)).await?;
    let cart = loaded(ctx).await;
    cart.add(product.to_line_item(quantity)).await?;
    tracing::info!("Added {} x {}.", quantity.get(), product.title);
    print(&cart);
    Ok(())
}

pub async fn set(ctx: &Context, product_id: &str, quantity: i64) {
    let cart = loaded(ctx).await;
    cart.update_quantity(&ProductId::new(product_id), quantity)
        .await;
    print(&cart);
}

pub async fn remove(ctx: &Context, product_id: &str) {
    let cart = loaded(ctx).await;
    cart.remove(&ProductId::new(product_id)).await;
    print(&cart);
}

pub async fn clear(ctx: &Context) {
    let cart = loaded(ctx).await;
    cart.clear().await;
    tracing::info!("Cart cleared.");
}
