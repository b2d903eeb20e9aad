//! Catalog products.

use serde::{Deserialize, Serialize};

use crate::cart::LineItem;
use crate::types::{Price, ProductId, Quantity};

/// Aggregate review score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

/// A product from the remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

impl Product {
    /// Build the cart line for adding this product.
    #[must_use]
    pub fn to_line_item(&self, quantity: Quantity) -> LineItem {
        LineItem {
            product_id: self.id.clone(),
            name: self.title.clone(),
            price: self.price,
            quantity: quantity.get(),
            image: self.image.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_product() {
        let product: Product = serde_json::from_str(
            r#"{"id":1,"title":"Backpack","price":109.95,"description":"Fits a laptop",
                "category":"men's clothing","image":"https://fakestoreapi.com/img/1.jpg",
                "rating":{"rate":3.9,"count":120}}"#,
        )
        .unwrap();

        let line = product.to_line_item(Quantity::for_product_view(2).unwrap());
        assert_eq!(line.product_id.as_str(), "1");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.line_total(), Price::from_cents(21_990));
        assert_eq!(line.image.as_deref(), Some("https://fakestoreapi.com/img/1.jpg"));
    }
}
