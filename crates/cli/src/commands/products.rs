//! Catalog browsing.

use shopwise_client::Result;
use shopwise_core::{Product, ProductId};

use super::Context;

fn print_list(products: &[Product]) {
    if products.is_empty() {
        tracing::info!("No products found.");
    }
    for product in products {
        tracing::info!(
            "[{:>3}] {:<60} {:>10}",
            product.id,
            product.title,
            product.price.to_string()
        );
    }
}

pub async fn list(ctx: &Context, category: Option<&str>) -> Result<()> {
    let products = match category {
        Some(name) => ctx.catalog.products_in_category(name).await?,
        None => {
            let categories = ctx.catalog.categories().await?;
            tracing::info!("Categories: {}", categories.join(", "));
            ctx.catalog.products().await?
        }
    };
    print_list(&products);
    Ok(())
}

pub async fn show(ctx: &Context, product_id: &str) -> Result<()> {
    let product = ctx.catalog.product(&ProductId::new(product_id)).await?;
    tracing::info!("{} ({})", product.title, product.category);
    tracing::info!("Price: {}", product.price);
    if let Some(rating) = &product.rating {
        tracing::info!("Rating: {:.1} ({} reviews)", rating.rate, rating.count);
    }
    if !product.description.is_empty() {
        tracing::info!("{}", product.description);
    }

    let related = ctx.catalog.recommendations(&product).await?;
    if !related.is_empty() {
        tracing::info!("You may also like:");
        print_list(&related);
    }
    Ok(())
}

pub async fn search(ctx: &Context, query: &str) -> Result<()> {
    print_list(&ctx.catalog.search(query).await?);
    Ok(())
}
