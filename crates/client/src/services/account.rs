//! Registration, sign-in and profile.

use secrecy::{ExposeSecret, SecretString};
use shopwise_core::{Email, User, ValidationError};
use tracing::{info, instrument};

use crate::error::Result;
use crate::gateway::{GatewayError, Profile, Registration};
use crate::state::ClientState;

const INVALID_LOGIN: &str = "Invalid email or password";

/// Account flows that precede or surround a session.
#[derive(Debug, Clone)]
pub struct Account {
    state: ClientState,
}

impl Account {
    #[must_use]
    pub const fn new(state: ClientState) -> Self {
        Self { state }
    }

    /// Create an account. Returns the server's confirmation message.
    ///
    /// Fields are checked locally before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank field or a malformed email,
    /// or the gateway error (an existing account surfaces as `Validation`).
    #[instrument(skip(self, password))]
    pub async fn register(&self, name: &str, email: &str, password: SecretString) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required { field: "name" }.into());
        }
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            return Err(ValidationError::Required { field: "password" }.into());
        }

        let registration = Registration {
            name: name.to_owned(),
            email,
            password,
        };
        let message = self.state.gateway().register(&registration).await?;
        info!(email = %registration.email, "Account registered");
        Ok(message)
    }

    /// Log in with email and password and start a session.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or rejected credentials, or
    /// the gateway error.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<User> {
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            return Err(ValidationError::Required { field: "password" }.into());
        }

        let response = match self.state.gateway().login(&email, password).await {
            Ok(response) => response,
            Err(GatewayError::Unauthorized) => {
                return Err(ValidationError::Remote(INVALID_LOGIN.to_string()).into());
            }
            Err(e) => return Err(e.into()),
        };

        let user = response.user.clone();
        self.state.session().login(response.user, response.token).await?;
        Ok(user)
    }

    /// Profile of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or the gateway error.
    pub async fn profile(&self) -> Result<Profile> {
        let credential = self
            .state
            .require_credential("Please log in to view your profile.")?;
        let result = self.state.gateway().get_profile(&credential).await;
        Ok(self.state.guard(result)?)
    }
}
