//! Remote account API contract.
//!
//! # Architecture
//!
//! - [`AccountGateway`] is the only way the client talks to the account,
//!   cart, favorites and order endpoints
//! - [`HttpAccountGateway`] implements it over `reqwest`
//! - Every failure is a [`GatewayError`] whose [`ErrorKind`] tells the
//!   session store whether the credential was rejected
//!
//! The gateway never swallows errors. Classification into "show inline",
//! "end the session" or "best-effort, log it" happens in the stores.

mod http;

pub use http::HttpAccountGateway;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use shopwise_core::{Cart, Email, LineItem, NewOrder, Order, ProductId, User};
use thiserror::Error;

use crate::credential::Credential;

/// Coarse failure classes the stores react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected; show the message inline.
    Validation,
    /// Credential rejected; end the session.
    Unauthorized,
    /// Request did not complete or the server failed.
    Network,
}

/// Errors returned by the remote account API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The server rejected the credential (HTTP 401).
    #[error("Unauthorized")]
    Unauthorized,

    /// The request could not be completed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server rejected the input (HTTP 400/422).
    #[error("{0}")]
    Validation(String),

    /// Any other non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A success response had an unexpected body.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GatewayError {
    /// Failure class for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) | Self::Api { .. } | Self::Parse(_) => ErrorKind::Network,
        }
    }
}

/// Successful login response.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub user: User,
    pub token: Credential,
    pub message: Option<String>,
}

/// New account details.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
}

/// Profile details shown on the account page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

/// Result of submitting an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order: Option<Order>,
}

/// The remote account, cart, favorites and order API.
///
/// Authenticated operations take the session credential and send it as a
/// bearer token.
#[async_trait]
pub trait AccountGateway: Send + Sync {
    /// Exchange email and password for a user record and credential.
    async fn login(&self, email: &Email, password: &SecretString)
    -> Result<AuthResponse, GatewayError>;

    /// Create an account. Returns the server's confirmation message.
    async fn register(&self, registration: &Registration) -> Result<String, GatewayError>;

    /// Fetch the signed-in user's profile.
    async fn get_profile(&self, credential: &Credential) -> Result<Profile, GatewayError>;

    /// Fetch the remote cart.
    async fn get_cart(&self, credential: &Credential) -> Result<Cart, GatewayError>;

    /// Replace the remote cart.
    async fn update_cart(&self, credential: &Credential, items: &[LineItem])
    -> Result<(), GatewayError>;

    /// Push a local cart into an empty remote cart at login.
    async fn merge_cart(&self, credential: &Credential, items: &[LineItem])
    -> Result<(), GatewayError>;

    /// Delete one line from the remote cart.
    async fn remove_cart_item(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), GatewayError>;

    /// Empty the remote cart.
    async fn clear_cart(&self, credential: &Credential) -> Result<(), GatewayError>;

    /// Favorite product IDs.
    async fn get_favorites(&self, credential: &Credential) -> Result<Vec<ProductId>, GatewayError>;

    /// Mark a product as a favorite.
    async fn add_favorite(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), GatewayError>;

    /// Unmark a favorite product.
    async fn remove_favorite(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), GatewayError>;

    /// Submit an order.
    async fn create_order(
        &self,
        credential: &Credential,
        order: &NewOrder,
    ) -> Result<OrderReceipt, GatewayError>;

    /// Order history, in server order.
    async fn get_orders(&self, credential: &Credential) -> Result<Vec<Order>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(GatewayError::Unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            GatewayError::Validation("Email taken".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            GatewayError::Api {
                status: 503,
                message: String::new()
            }
            .kind(),
            ErrorKind::Network
        );
        assert_eq!(GatewayError::Parse("eof".into()).kind(), ErrorKind::Network);
    }

    #[test]
    fn test_validation_display_is_server_message() {
        assert_eq!(
            GatewayError::Validation("Email already registered".into()).to_string(),
            "Email already registered"
        );
    }
}
