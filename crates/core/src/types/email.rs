//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// An email address with a basic structural check.
///
/// The account service is the real authority on addresses. This only
/// rejects input that could never be deliverable, so the user gets inline
/// feedback before a round trip.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one `@`, with a non-empty local part and domain
/// - The domain contains a `.`
///
/// ```
/// use shopwise_core::Email;
///
/// assert!(Email::parse("shopper@example.com").is_ok());
/// assert!(Email::parse("shopper@localhost").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] for blank input and
    /// [`ValidationError::InvalidEmail`] for anything structurally wrong.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError::Required { field: "email" });
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(ValidationError::InvalidEmail("too long"));
        }

        let (local, domain) = s
            .split_once('@')
            .ok_or(ValidationError::InvalidEmail("missing @"))?;

        if local.is_empty() {
            return Err(ValidationError::InvalidEmail("empty local part"));
        }
        if domain.is_empty() || domain.contains('@') {
            return Err(ValidationError::InvalidEmail("invalid domain"));
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(ValidationError::InvalidEmail("invalid domain"));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
