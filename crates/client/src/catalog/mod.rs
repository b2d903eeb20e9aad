//! Read-only product catalog client.
//!
//! Talks to a Fake Store compatible API. Listings, single products and
//! categories are cached with `moka` for 5 minutes.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shopwise_core::{Product, ProductId};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use cache::{CacheKey, CacheValue};

/// Errors that can occur when reading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Product does not exist.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Anything that can resolve a product ID to a product.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Look up one product.
    async fn product(&self, id: &ProductId) -> Result<Product, CatalogError>;
}

/// Client for the product catalog API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a catalog client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client fails to build.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, CatalogError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::builder().timeout(timeout).build()?,
                base_url,
                cache,
            }),
        })
    }

    /// GET a path under the base URL and decode the JSON body.
    ///
    /// `Ok(None)` means the catalog has no such resource.
    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::Parse("catalog base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(segments);

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        // Unknown product IDs come back as 200 with an empty body.
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.fetch(&["products"]).await?.unwrap_or_default();
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// One product by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for unknown IDs, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .fetch(&["products", id.as_str()])
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Category names.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<String> = self
            .fetch(&["products", "categories"])
            .await?
            .unwrap_or_default();
        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Products in one category. An unknown category is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_in_category(&self, name: &str) -> Result<Vec<Product>, CatalogError> {
        let key = CacheKey::Category(name.to_string());
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .fetch(&["products", "category", name])
            .await?
            .unwrap_or_default();
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Products whose title contains `query`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError> {
        Ok(filter_by_title(self.products().await?, query))
    }

    /// Other products from the same category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn recommendations(&self, product: &Product) -> Result<Vec<Product>, CatalogError> {
        let mut related = self.products_in_category(&product.category).await?;
        related.retain(|p| p.id != product.id);
        Ok(related)
    }

    /// Drop every cached response.
    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
    }
}

#[async_trait]
impl ProductSource for CatalogClient {
    async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        Self::product(self, id).await
    }
}

fn filter_by_title(products: Vec<Product>, query: &str) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products;
    }
    products
        .into_iter()
        .filter(|p| p.title.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopwise_core::{Price, Rating};

    use super::*;

    fn product(id: u64, title: &str) -> Product {
        Product {
            id: ProductId::from(id),
            title: title.to_string(),
            price: Price::from_cents(1000),
            description: String::new(),
            category: "jewelery".to_string(),
            image: None,
            rating: Some(Rating { rate: 4.5, count: 10 }),
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let products = vec![
            product(1, "Fjallraven Backpack"),
            product(2, "Mens Casual Shirt"),
            product(3, "Solid Gold Petite Micropave"),
        ];
        let found = filter_by_title(products, "  BACKpack ");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ProductId::new("1"));
    }

    #[test]
    fn test_blank_search_returns_everything() {
        let products = vec![product(1, "A"), product(2, "B")];
        assert_eq!(filter_by_title(products, "").len(), 2);
    }

    #[test]
    fn test_catalog_payload() {
        let json = r#"[{"id":1,"title":"Backpack","price":109.95,"description":"d",
            "category":"men's clothing","image":"https://img/1.jpg",
            "rating":{"rate":3.9,"count":120}}]"#;
        let products: Vec<Product> = serde_json::from_str(json).unwrap();
        assert_eq!(products[0].price, Price::from_cents(10995));
        assert_eq!(products[0].id.as_str(), "1");
    }
}
