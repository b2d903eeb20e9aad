//! Unified error handling with Sentry integration.
//!
//! Every fallible client operation returns [`Result<T>`]. Front ends show the
//! `Display` text to the user and call [`ClientError::report`] so that
//! unexpected failures reach Sentry while validation and expiry do not.

use shopwise_core::ValidationError;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::gateway::{ErrorKind, GatewayError};
use crate::storage::StorageError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// User input or a business rule was rejected.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Remote account API call failed.
    #[error("{0}")]
    Gateway(#[from] GatewayError),

    /// Product catalog call failed.
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    /// Durable client state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The operation needs a logged-in user.
    #[error("{0}")]
    NotAuthenticated(&'static str),

    /// The account API refused or failed to create an order.
    #[error("Failed to create order. Please try again.")]
    OrderFailed(#[source] GatewayError),
}

impl ClientError {
    /// Whether this failure ended the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Gateway(GatewayError::Unauthorized))
    }

    /// Whether this failure should be sent to error tracking.
    ///
    /// Validation, expiry and missing-session failures are expected and are
    /// shown inline instead.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::NotAuthenticated(_) => false,
            Self::Gateway(err) => {
                !matches!(err.kind(), ErrorKind::Validation | ErrorKind::Unauthorized)
            }
            Self::Catalog(err) => !matches!(err, CatalogError::NotFound(_)),
            Self::Storage(_) | Self::OrderFailed(_) => true,
        }
    }

    /// Capture the error to Sentry (when reportable) and log it.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Client error"
            );
        } else {
            tracing::debug!(error = %self, "Client error not reported");
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context.
///
/// Called after a successful login to associate errors with the user.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Called on logout and on session expiry.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a session or cart transition.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_passes_through_user_messages() {
        let err = ClientError::from(ValidationError::CouponAlreadyApplied);
        assert_eq!(err.to_string(), "Coupon already applied.");

        let err = ClientError::NotAuthenticated("Please log in to view your orders.");
        assert_eq!(err.to_string(), "Please log in to view your orders.");
    }

    #[test]
    fn test_reportable_classification() {
        assert!(!ClientError::from(ValidationError::EmptyCart).is_reportable());
        assert!(!ClientError::from(GatewayError::Unauthorized).is_reportable());
        assert!(!ClientError::from(GatewayError::Validation("bad".into())).is_reportable());
        assert!(
            ClientError::from(GatewayError::Api {
                status: 500,
                message: "boom".into()
            })
            .is_reportable()
        );
        assert!(ClientError::from(GatewayError::Parse("eof".into())).is_reportable());
        assert!(!ClientError::from(CatalogError::NotFound("9".into())).is_reportable());
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ClientError::from(GatewayError::Unauthorized).is_unauthorized());
        assert!(!ClientError::from(ValidationError::EmptyCart).is_unauthorized());
    }
}
