//! Checkout: coupon, totals and order submission.

use shopwise_core::{CheckoutForm, CouponState, NewOrder, Price, ValidationError};
use tracing::{info, instrument};

use crate::error::{ClientError, Result, add_breadcrumb};
use crate::gateway::{GatewayError, OrderReceipt};
use crate::state::ClientState;

const LOGIN_TO_ORDER: &str = "Please log in to place an order.";

/// One checkout over the current cart.
#[derive(Debug, Clone)]
pub struct Checkout {
    state: ClientState,
    coupon: CouponState,
}

impl Checkout {
    #[must_use]
    pub fn new(state: ClientState) -> Self {
        Self {
            state,
            coupon: CouponState::default(),
        }
    }

    /// Apply a coupon code, returning the confirmation message.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown code or a second coupon.
    pub fn apply_coupon(&mut self, code: &str) -> std::result::Result<&'static str, ValidationError> {
        self.coupon.apply(code)
    }

    pub fn remove_coupon(&mut self) {
        self.coupon.remove();
    }

    #[must_use]
    pub const fn coupon(&self) -> CouponState {
        self.coupon
    }

    /// Cart subtotal before any coupon.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.state.cart().subtotal()
    }

    /// Amount due, recomputed from the current cart.
    #[must_use]
    pub fn total(&self) -> Price {
        self.coupon.total(self.subtotal())
    }

    /// Validate the form and submit the order.
    ///
    /// On success the cart is cleared in both tiers and the coupon reset.
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` when nobody is logged in
    /// - `Validation` for an empty cart or an invalid form
    /// - `Gateway(Unauthorized)` when the credential is rejected; the
    ///   session has already expired by the time this returns
    /// - `OrderFailed` for any other gateway failure
    #[instrument(skip(self, form))]
    pub async fn place_order(&mut self, form: &CheckoutForm) -> Result<OrderReceipt> {
        let credential = self.state.require_credential(LOGIN_TO_ORDER)?;

        let cart = self.state.cart();
        let items = cart.items();
        if items.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        let shipping_info = form.validate()?;

        let order = NewOrder {
            total: self.total(),
            items,
            shipping_info,
        };
        let result = self.state.gateway().create_order(&credential, &order).await;
        let receipt = match self.state.guard(result) {
            Ok(receipt) => receipt,
            Err(GatewayError::Unauthorized) => {
                return Err(GatewayError::Unauthorized.into());
            }
            Err(e) => return Err(ClientError::OrderFailed(e)),
        };

        info!(
            order_id = ?receipt.order.as_ref().map(|o| &o.id),
            total = %order.total,
            "Order placed"
        );
        add_breadcrumb("checkout", "Order placed", None);

        cart.clear().await;
        self.coupon.remove();
        Ok(receipt)
    }
}
