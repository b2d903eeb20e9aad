//! Quantities chosen on the product view.

use crate::validation::ValidationError;

/// A quantity picked on the product page before adding to the cart.
///
/// The product view only offers 1 through [`Quantity::MAX_PER_ADD`]; the
/// cart itself has no upper bound because repeated adds accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest quantity the product view accepts.
    pub const MIN_PER_ADD: u32 = 1;
    /// Largest quantity the product view accepts.
    pub const MAX_PER_ADD: u32 = 20;

    /// Validate a typed-in quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::QuantityOutOfRange`] outside `1..=20`.
    pub const fn for_product_view(value: u32) -> Result<Self, ValidationError> {
        if value < Self::MIN_PER_ADD || value > Self::MAX_PER_ADD {
            return Err(ValidationError::QuantityOutOfRange {
                min: Self::MIN_PER_ADD,
                max: Self::MAX_PER_ADD,
            });
        }
        Ok(Self(value))
    }

    /// Step up by one, saturating at the maximum.
    #[must_use]
    pub fn increment(self) -> Self {
        Self((self.0 + 1).min(Self::MAX_PER_ADD))
    }

    /// Step down by one, saturating at the minimum.
    #[must_use]
    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN_PER_ADD))
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(Self::MIN_PER_ADD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Quantity::for_product_view(0).is_err());
        assert!(Quantity::for_product_view(21).is_err());
        assert_eq!(Quantity::for_product_view(20).map(Quantity::get), Ok(20));
    }

    #[test]
    fn test_stepping_saturates() {
        let max = Quantity::for_product_view(20).unwrap_or_default();
        assert_eq!(max.increment().get(), 20);
        assert_eq!(Quantity::default().decrement().get(), 1);
    }
}
