//! Checkout coupon rules.

use rust_decimal::Decimal;

use crate::types::Price;
use crate::validation::ValidationError;

/// The only coupon code the store honours.
pub const COUPON_CODE: &str = "coupon888";

/// Message shown when a coupon is accepted.
pub const COUPON_APPLIED_MESSAGE: &str = "Coupon successfully applied!";

/// Fraction of the subtotal the customer pays with the coupon (12% off).
#[must_use]
pub fn discount_factor() -> Decimal {
    Decimal::new(88, 2)
}

/// Coupon state for one checkout.
///
/// Only a flag is stored. The discounted total is always derived from the
/// subtotal passed in, so it follows the cart as quantities change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CouponState {
    applied: bool,
}

impl CouponState {
    /// Try to apply a coupon code.
    ///
    /// Returns the confirmation message on success.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::CouponAlreadyApplied`] if any code is already applied
    /// - [`ValidationError::InvalidCoupon`] for an unknown code
    pub fn apply(&mut self, code: &str) -> Result<&'static str, ValidationError> {
        if self.applied {
            return Err(ValidationError::CouponAlreadyApplied);
        }
        if code != COUPON_CODE {
            return Err(ValidationError::InvalidCoupon);
        }
        self.applied = true;
        Ok(COUPON_APPLIED_MESSAGE)
    }

    /// Drop the applied coupon.
    pub fn remove(&mut self) {
        self.applied = false;
    }

    /// Whether a coupon is applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        self.applied
    }

    /// Amount due for a given subtotal.
    #[must_use]
    pub fn total(&self, subtotal: Price) -> Price {
        if self.applied {
            subtotal.scaled(discount_factor())
        } else {
            subtotal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_discounts_and_rejects_reapply() {
        let subtotal = Price::from_cents(10_000);
        let mut coupon = CouponState::default();

        assert_eq!(coupon.apply("coupon888"), Ok(COUPON_APPLIED_MESSAGE));
        assert_eq!(coupon.total(subtotal), Price::from_cents(8_800));

        assert_eq!(
            coupon.apply("coupon888"),
            Err(ValidationError::CouponAlreadyApplied)
        );
        assert_eq!(coupon.total(subtotal), Price::from_cents(8_800));
    }

    #[test]
    fn test_invalid_code() {
        let mut coupon = CouponState::default();
        assert_eq!(coupon.apply("COUPON888"), Err(ValidationError::InvalidCoupon));
        assert!(!coupon.is_applied());
        assert_eq!(coupon.total(Price::from_cents(500)), Price::from_cents(500));
    }

    #[test]
    fn test_code_must_match_exactly() {
        let mut coupon = CouponState::default();
        assert_eq!(coupon.apply(" coupon888 "), Err(ValidationError::InvalidCoupon));
        assert_eq!(coupon.apply("coupon888\n"), Err(ValidationError::InvalidCoupon));
        assert!(!coupon.is_applied());
    }

    #[test]
    fn test_remove_restores_full_total() {
        let mut coupon = CouponState::default();
        coupon.apply(COUPON_CODE).ok();
        coupon.remove();
        assert_eq!(coupon.total(Price::from_cents(10_000)), Price::from_cents(10_000));
        assert!(coupon.apply(COUPON_CODE).is_ok());
    }
}
