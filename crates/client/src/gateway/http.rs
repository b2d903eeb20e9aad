//! `reqwest` implementation of the account gateway.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use shopwise_core::{Cart, Email, LineItem, NewOrder, Order, ProductId, User};
use tracing::{debug, instrument};
use url::Url;

use super::{AccountGateway, AuthResponse, GatewayError, OrderReceipt, Profile, Registration};
use crate::credential::Credential;

/// HTTP client for the account API.
#[derive(Clone)]
pub struct HttpAccountGateway {
    inner: Arc<HttpAccountGatewayInner>,
}

struct HttpAccountGatewayInner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpAccountGateway {
    /// Create a gateway rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Network` if the HTTP client fails to build.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            inner: Arc::new(HttpAccountGatewayInner { client, base_url }),
        })
    }

    /// Build an endpoint URL from path segments under the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::Parse(format!(
                    "base URL cannot have a path: {}",
                    self.inner.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, segments: &[&str]) -> Result<RequestBuilder, GatewayError> {
        Ok(self.inner.client.get(self.endpoint(segments)?))
    }

    fn post(&self, segments: &[&str]) -> Result<RequestBuilder, GatewayError> {
        Ok(self.inner.client.post(self.endpoint(segments)?))
    }

    fn put(&self, segments: &[&str]) -> Result<RequestBuilder, GatewayError> {
        Ok(self.inner.client.put(self.endpoint(segments)?))
    }

    fn delete(&self, segments: &[&str]) -> Result<RequestBuilder, GatewayError> {
        Ok(self.inner.client.delete(self.endpoint(segments)?))
    }

    fn remove_cart_item_request(
        &self,
        product_id: &ProductId,
    ) -> Result<RequestBuilder, GatewayError> {
        self.delete(&["users", "cart", product_id.as_str()])
    }

    /// Send a request and return the body of a success response.
    async fn send(request: RequestBuilder) -> Result<String, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Account API returned non-success status"
            );
            return Err(classify(status, &body));
        }

        Ok(body)
    }

    async fn send_authed(
        request: RequestBuilder,
        credential: &Credential,
    ) -> Result<String, GatewayError> {
        Self::send(request.bearer_auth(credential.expose())).await
    }
}

/// Map a non-success status and body to a gateway error.
fn classify(status: StatusCode, body: &str) -> GatewayError {
    let message = server_message(body);
    match status {
        StatusCode::UNAUTHORIZED => GatewayError::Unauthorized,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => GatewayError::Validation(
            message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Invalid request")
                    .to_string()
            }),
        ),
        _ => GatewayError::Api {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| body.chars().take(200).collect()),
        },
    }
}

/// The `message` field of a JSON error body, if any.
fn server_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|e| GatewayError::Parse(e.to_string()))
}

// =============================================================================
// Response payloads
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    user: User,
    token: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

/// The API returns some collections bare and some wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum CartBody {
    Bare(Vec<LineItem>),
    Wrapped { cart: Vec<LineItem> },
}

impl From<CartBody> for Cart {
    fn from(body: CartBody) -> Self {
        match body {
            CartBody::Bare(lines) | CartBody::Wrapped { cart: lines } => Self::from_lines(lines),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FavoritesBody {
    Bare(Vec<ProductId>),
    Wrapped { favorites: Vec<ProductId> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrdersBody {
    Bare(Vec<Order>),
    Wrapped { orders: Vec<Order> },
}

#[async_trait]
impl AccountGateway for HttpAccountGateway {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse, GatewayError> {
        let request = self.post(&["users", "login"])?.json(&json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        }));
        let body: LoginBody = parse(&Self::send(request).await?)?;
        let token = Credential::new(body.token).map_err(|e| GatewayError::Parse(e.to_string()))?;

        Ok(AuthResponse {
            user: body.user,
            token,
            message: body.message,
        })
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    async fn register(&self, registration: &Registration) -> Result<String, GatewayError> {
        let request = self.post(&["users", "register"])?.json(&json!({
            "name": registration.name,
            "email": registration.email.as_str(),
            "password": registration.password.expose_secret(),
        }));
        let body = Self::send(request).await?;
        let message = parse::<MessageBody>(&body).ok().and_then(|b| b.message);
        Ok(message.unwrap_or_else(|| "Registration successful".to_string()))
    }

    #[instrument(skip(self, credential))]
    async fn get_profile(&self, credential: &Credential) -> Result<Profile, GatewayError> {
        let body = Self::send_authed(self.get(&["users", "profile"])?, credential).await?;
        parse(&body)
    }

    #[instrument(skip(self, credential))]
    async fn get_cart(&self, credential: &Credential) -> Result<Cart, GatewayError> {
        let body = Self::send_authed(self.get(&["users", "cart"])?, credential).await?;
        Ok(parse::<CartBody>(&body)?.into())
    }

    #[instrument(skip(self, credential, items), fields(lines = items.len()))]
    async fn update_cart(
        &self,
        credential: &Credential,
        items: &[LineItem],
    ) -> Result<(), GatewayError> {
        let request = self.put(&["users", "cart"])?.json(items);
        Self::send_authed(request, credential).await?;
        Ok(())
    }

    #[instrument(skip(self, credential, items), fields(lines = items.len()))]
    async fn merge_cart(
        &self,
        credential: &Credential,
        items: &[LineItem],
    ) -> Result<(), GatewayError> {
        let request = self
            .post(&["users", "merge-cart"])?
            .json(&json!({ "cart": items }));
        Self::send_authed(request, credential).await?;
        Ok(())
    }

    #[instrument(skip(self, credential), fields(product_id = %product_id))]
    async fn remove_cart_item(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        Self::send_authed(self.remove_cart_item_request(product_id)?, credential).await?;
        Ok(())
    }

    #[instrument(skip(self, credential))]
    async fn clear_cart(&self, credential: &Credential) -> Result<(), GatewayError> {
        Self::send_authed(self.delete(&["users", "cart"])?, credential).await?;
        Ok(())
    }

    #[instrument(skip(self, credential))]
    async fn get_favorites(&self, credential: &Credential) -> Result<Vec<ProductId>, GatewayError> {
        let body = Self::send_authed(self.get(&["users", "favorites"])?, credential).await?;
        Ok(match parse::<FavoritesBody>(&body)? {
            FavoritesBody::Bare(ids) | FavoritesBody::Wrapped { favorites: ids } => ids,
        })
    }

    #[instrument(skip(self, credential), fields(product_id = %product_id))]
    async fn add_favorite(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        let request = self
            .post(&["users", "favorites", "add"])?
            .json(&json!({ "productId": product_id }));
        Self::send_authed(request, credential).await?;
        Ok(())
    }

    #[instrument(skip(self, credential), fields(product_id = %product_id))]
    async fn remove_favorite(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        let request = self
            .post(&["users", "favorites", "remove"])?
            .json(&json!({ "productId": product_id }));
        Self::send_authed(request, credential).await?;
        Ok(())
    }

    #[instrument(skip(self, credential, order), fields(total = %order.total))]
    async fn create_order(
        &self,
        credential: &Credential,
        order: &NewOrder,
    ) -> Result<OrderReceipt, GatewayError> {
        let request = self.post(&["users", "orders"])?.json(order);
        let body = Self::send_authed(request, credential).await?;
        parse(&body)
    }

    #[instrument(skip(self, credential))]
    async fn get_orders(&self, credential: &Credential) -> Result<Vec<Order>, GatewayError> {
        let body = Self::send_authed(self.get(&["users", "orders"])?, credential).await?;
        Ok(match parse::<OrdersBody>(&body)? {
            OrdersBody::Bare(orders) | OrdersBody::Wrapped { orders } => orders,
        })
    }
}
