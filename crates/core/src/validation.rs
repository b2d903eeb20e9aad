//! Field-level validation errors.
//!
//! Validation failures are recovered locally and shown inline next to the
//! offending field. They are never reported to error tracking.

use thiserror::Error;

/// A validation failure for user-supplied input or a business rule.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was left blank.
    #[error("{field} is required")]
    Required {
        /// Name of the missing field.
        field: &'static str,
    },

    /// A checkout form was submitted with blank fields.
    #[error("Please fill in all fields")]
    IncompleteForm,

    /// Email is structurally invalid.
    #[error("Invalid email address: {0}")]
    InvalidEmail(&'static str),

    /// Phone number is not exactly ten digits.
    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,

    /// Shipping address exceeds the maximum length.
    #[error("Address must not exceed {max} characters")]
    AddressTooLong {
        /// Maximum allowed length.
        max: usize,
    },

    /// Unknown payment method label.
    #[error("Unknown payment method: {0}")]
    InvalidPaymentMethod(String),

    /// Quantity outside the accepted range.
    #[error("Quantity must be between {min} and {max}")]
    QuantityOutOfRange {
        /// Smallest accepted quantity.
        min: u32,
        /// Largest accepted quantity.
        max: u32,
    },

    /// Prices cannot be negative.
    #[error("Price cannot be negative")]
    NegativePrice,

    /// Coupon code is not recognized.
    #[error("Invalid coupon code.")]
    InvalidCoupon,

    /// A coupon is already applied to this checkout.
    #[error("Coupon already applied.")]
    CouponAlreadyApplied,

    /// An action requires a logged-in user.
    #[error("{0}")]
    LoginRequired(&'static str),

    /// Checkout attempted with an empty cart.
    #[error("Your cart is empty. Please add items before placing an order.")]
    EmptyCart,

    /// The bearer credential supplied to login was empty.
    #[error("Credential cannot be empty")]
    EmptyCredential,

    /// The bearer credential supplied to login has already expired.
    #[error("Credential has expired")]
    ExpiredCredential,

    /// Rejected by the remote service with a message of its own.
    #[error("{0}")]
    Remote(String),
}
