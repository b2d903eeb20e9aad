//! Bearer credential with an embedded expiry claim.
//!
//! The credential is a JWT issued by the account API. Only the payload's
//! `exp` claim is read here; signature checks belong to the server.

use core::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shopwise_core::ValidationError;

/// An opaque bearer token.
pub struct Credential {
    token: SecretString,
}

impl Credential {
    /// Wrap a token string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCredential`] for a blank token.
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::EmptyCredential);
        }
        Ok(Self {
            token: SecretString::from(token),
        })
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.token.expose_secret()
    }

    /// Expiry claim, if the token carries a decodable one.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        decode_expiry(self.expose())
    }

    /// Whether the token is still valid at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp > now)
    }

    /// Whether the token is still valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// Check a raw token string: valid iff its `exp` claim decodes and lies
/// strictly in the future. Anything malformed is invalid.
#[must_use]
pub fn is_valid(token: &str) -> bool {
    decode_expiry(token).is_some_and(|exp| exp > Utc::now())
}

fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?;

    let millis = if let Some(secs) = exp.as_i64() {
        secs.checked_mul(1000)?
    } else {
        float_secs_to_millis(exp.as_f64().filter(|s| s.is_finite())?)
    };
    DateTime::from_timestamp_millis(millis)
}

#[allow(clippy::cast_possible_truncation)]
fn float_secs_to_millis(secs: f64) -> i64 {
    (secs * 1000.0) as i64
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self {
            token: SecretString::from(self.expose()),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at())
            .finish()
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Credential {}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::new(token).map_err(serde::de::Error::custom)
    }
}
