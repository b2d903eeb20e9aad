//! Session store: who is logged in, and with what credential.
//!
//! The session is an explicit two-state machine:
//!
//! ```text
//! Anonymous --login--> Authenticated
//! Authenticated --logout--> Anonymous
//! Authenticated --credential expired--> Anonymous
//! ```
//!
//! A user is present iff a credential is present and still valid. Every
//! read re-checks the credential and performs the expiry transition when it
//! lapsed while idle.

use std::sync::{Arc, PoisonError};

use serde::{Deserialize, Serialize};
use shopwise_core::{User, ValidationError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::credential::{self, Credential};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::events::Signal;
use crate::navigator::{Notice, View};
use crate::state::ClientState;
use crate::storage::{AUTH_KEY, CART_KEY, write_json};

/// Stored form of an authenticated session (`auth` key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub user: User,
    pub token: Credential,
}

/// The two session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticated,
}

/// View of the session half of [`ClientState`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    state: ClientState,
}

impl SessionStore {
    pub(crate) const fn new(state: ClientState) -> Self {
        Self { state }
    }

    /// Pure credential check: valid iff the `exp` claim decodes and lies in
    /// the future.
    #[must_use]
    pub fn is_valid(token: &str) -> bool {
        credential::is_valid(token)
    }

    /// Restore the session from durable storage.
    ///
    /// A stored blob that is malformed or carries an invalid credential is
    /// discarded together with the stored cart, leaving the store anonymous.
    pub fn rehydrate(&self) {
        let storage = &self.state.inner.storage;
        let Some(raw) = storage.get(AUTH_KEY) else {
            return;
        };

        match serde_json::from_str::<AuthRecord>(&raw) {
            Ok(record) if record.token.is_valid() => {
                info!(user_id = %record.user.id, "Session restored");
                set_sentry_user(&record.user.id, Some(record.user.email.as_str()));
                *self.write_session() = Some(record);
            }
            Ok(_) => {
                info!("Stored credential expired, starting anonymous");
                self.discard_stored_session();
            }
            Err(e) => {
                warn!(error = %e, "Discarding malformed stored session");
                self.discard_stored_session();
            }
        }
    }

    /// Start an authenticated session.
    ///
    /// A session that is still active is logged out first, so nothing of
    /// the previous user's cart reaches the new account. The new session is
    /// then persisted and announced, and the cart reconciled with the remote
    /// tier. A failed merge is logged and never fails the login.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an expired credential. The store is
    /// left unchanged.
    #[instrument(skip(self, user, credential), fields(user_id = %user.id))]
    pub async fn login(&self, user: User, credential: Credential) -> Result<(), ValidationError> {
        if !credential.is_valid() {
            return Err(ValidationError::ExpiredCredential);
        }

        self.abort_pending_redirect();

        if self.has_session() {
            debug!("Ending previous session before login");
            self.logout();
        }

        let record = AuthRecord {
            user,
            token: credential,
        };
        if let Err(e) = write_json(self.state.inner.storage.as_ref(), AUTH_KEY, &record) {
            warn!(error = %e, "Failed to persist session");
        }
        set_sentry_user(&record.user.id, Some(record.user.email.as_str()));
        *self.write_session() = Some(record);

        let cart = self.state.cart();
        cart.begin_session();

        add_breadcrumb("session", "Logged in", None);
        info!("Logged in");
        self.state.bus().publish(Signal::SessionChanged);

        cart.refresh().await;
        Ok(())
    }

    /// End the session and clear the cart. Safe to call when anonymous.
    pub fn logout(&self) {
        if self.end_session() {
            add_breadcrumb("session", "Logged out", None);
            info!("Logged out");
        }
        self.state.bus().publish(Signal::SessionChanged);
        self.state.bus().publish(Signal::CartChanged);
    }

    /// React to a rejected or lapsed credential.
    ///
    /// Clears the session like [`logout`](Self::logout), shows the
    /// session-expired notice, and after the configured delay dismisses it
    /// and navigates to the landing view. Only the first call per
    /// authenticated session does anything.
    pub fn expire(&self) {
        if !self.end_session() {
            return;
        }

        add_breadcrumb("session", "Session expired", None);
        warn!("Session expired");

        let bus = self.state.bus();
        bus.publish(Signal::SessionChanged);
        bus.publish(Signal::CartChanged);

        let navigator = Arc::clone(&self.state.inner.navigator);
        navigator.show_notice(&Notice::session_expired());

        let delay = self.state.inner.expiry_redirect_delay;
        match Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    navigator.dismiss_notice();
                    navigator.navigate(View::Landing);
                });
                let previous = self
                    .state
                    .inner
                    .redirect
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .replace(task);
                if let Some(previous) = previous {
                    previous.abort();
                }
            }
            Err(_) => {
                navigator.dismiss_notice();
                navigator.navigate(View::Landing);
            }
        }
    }

    /// Current phase, re-checking credential validity.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.current_user().is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    /// Whether a user is logged in with a valid credential.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase() == SessionPhase::Authenticated
    }

    /// The logged-in user.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.checked().map(|record| record.user)
    }

    /// The session credential.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.checked().map(|record| record.token)
    }

    /// Take the pending post-expiry redirect, if one is scheduled.
    #[must_use]
    pub fn pending_redirect(&self) -> Option<JoinHandle<()>> {
        self.state
            .inner
            .redirect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Snapshot of the session, expiring it first if the credential lapsed.
    fn checked(&self) -> Option<AuthRecord> {
        let record = self
            .state
            .inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;

        if record.token.is_valid() {
            Some(record)
        } else {
            self.expire();
            None
        }
    }

    /// Clear in-memory and durable session and cart state.
    ///
    /// Returns whether a session was active.
    fn end_session(&self) -> bool {
        let previous = self.write_session().take();

        if let Err(e) = self.state.inner.storage.remove(AUTH_KEY) {
            warn!(error = %e, "Failed to remove stored session");
        }
        self.state.cart().reset();
        clear_sentry_user();

        previous.is_some()
    }

    /// Whether a session record is held, valid or not.
    fn has_session(&self) -> bool {
        self.state
            .inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn discard_stored_session(&self) {
        let storage = &self.state.inner.storage;
        for key in [AUTH_KEY, CART_KEY] {
            if let Err(e) = storage.remove(key) {
                warn!(key, error = %e, "Failed to remove stored value");
            }
        }
    }

    fn abort_pending_redirect(&self) {
        if let Some(task) = self.pending_redirect() {
            task.abort();
        }
    }

    fn write_session(&self) -> std::sync::RwLockWriteGuard<'_, Option<AuthRecord>> {
        self.state
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
