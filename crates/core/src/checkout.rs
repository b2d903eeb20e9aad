//! Shipping form validation for checkout.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Longest shipping address the fulfilment service accepts.
pub const MAX_ADDRESS_LENGTH: usize = 30;

/// Number of digits in a valid phone number.
pub const PHONE_DIGITS: usize = 10;

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "PayPal")]
    PayPal,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

impl PaymentMethod {
    /// Every accepted method, in display order.
    pub const ALL: [Self; 3] = [Self::CreditCard, Self::PayPal, Self::BankTransfer];

    /// Label shown to the customer and sent to the order API.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::PayPal => "PayPal",
            Self::BankTransfer => "Bank Transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|method| {
                method.label().eq_ignore_ascii_case(wanted)
                    || method.label().replace(' ', "-").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ValidationError::InvalidPaymentMethod(wanted.to_owned()))
    }
}

/// Validated shipping details attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub phone_number: String,
    pub address: String,
    pub payment_method: PaymentMethod,
}

/// Raw checkout form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub phone_number: String,
    pub address: String,
    pub payment_method: Option<PaymentMethod>,
}

impl CheckoutForm {
    /// Validate the form into shipping details.
    ///
    /// Blank fields are reported before format problems, matching the order
    /// the checkout view surfaces them in.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::IncompleteForm`] if any field is blank
    /// - [`ValidationError::InvalidPhone`] unless the phone is exactly ten digits
    /// - [`ValidationError::AddressTooLong`] past [`MAX_ADDRESS_LENGTH`] characters
    pub fn validate(&self) -> Result<ShippingInfo, ValidationError> {
        let phone_number = self.phone_number.trim();
        let address = self.address.trim();

        let Some(payment_method) = self.payment_method else {
            return Err(ValidationError::IncompleteForm);
        };
        if phone_number.is_empty() || address.is_empty() {
            return Err(ValidationError::IncompleteForm);
        }

        validate_phone(phone_number)?;
        validate_address(address)?;

        Ok(ShippingInfo {
            phone_number: phone_number.to_owned(),
            address: address.to_owned(),
            payment_method,
        })
    }
}

/// Check that a phone number is exactly ten ASCII digits.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPhone`] otherwise.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// Check the address length limit.
///
/// # Errors
///
/// Returns [`ValidationError::AddressTooLong`] past the limit.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.chars().count() > MAX_ADDRESS_LENGTH {
        return Err(ValidationError::AddressTooLong {
            max: MAX_ADDRESS_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(phone: &str, address: &str) -> CheckoutForm {
        CheckoutForm {
            phone_number: phone.to_owned(),
            address: address.to_owned(),
            payment_method: Some(PaymentMethod::PayPal),
        }
    }

    #[test]
    fn test_valid_form() {
        let info = form("0412345678", "1 Main St").validate().unwrap();
        assert_eq!(info.address, "1 Main St");
        assert_eq!(info.payment_method, PaymentMethod::PayPal);
    }

    #[test]
    fn test_missing_fields_reported_first() {
        assert_eq!(form("", "x").validate(), Err(ValidationError::IncompleteForm));
        let mut no_payment = form("0412345678", "x");
        no_payment.payment_method = None;
        assert_eq!(no_payment.validate(), Err(ValidationError::IncompleteForm));
    }

    #[test]
    fn test_phone_must_be_ten_digits() {
        for bad in ["041234567", "04123456789", "04123-5678", "041234567a"] {
            assert_eq!(form(bad, "x").validate(), Err(ValidationError::InvalidPhone));
        }
    }

    #[test]
    fn test_address_limit() {
        assert!(form("0412345678", &"a".repeat(30)).validate().is_ok());
        assert_eq!(
            form("0412345678", &"a".repeat(31)).validate(),
            Err(ValidationError::AddressTooLong { max: 30 })
        );
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!("paypal".parse::<PaymentMethod>(), Ok(PaymentMethod::PayPal));
        assert_eq!("bank-transfer".parse::<PaymentMethod>(), Ok(PaymentMethod::BankTransfer));
        assert!("cash".parse::<PaymentMethod>().is_err());
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"Credit Card\""
        );
    }
}
