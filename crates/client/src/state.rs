//! Client state shared by the session and cart stores.

use core::fmt;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::cart::{CartSlot, CartStore, SyncState};
use crate::config::ClientConfig;
use crate::credential::Credential;
use crate::error::{ClientError, Result};
use crate::events::EventBus;
use crate::gateway::{AccountGateway, GatewayError, HttpAccountGateway};
use crate::navigator::Navigator;
use crate::session::{AuthRecord, SessionStore};
use crate::storage::LocalStorage;

/// Handle to everything a front end needs.
///
/// This struct is cheaply cloneable via `Arc`. The session and cart stores
/// are views over the same inner state, so a cart operation can end the
/// session on a rejected credential and a login can reconcile the cart
/// without either owning the other.
#[derive(Clone)]
pub struct ClientState {
    pub(crate) inner: Arc<ClientStateInner>,
}

pub(crate) struct ClientStateInner {
    pub(crate) gateway: Arc<dyn AccountGateway>,
    pub(crate) storage: Arc<dyn LocalStorage>,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) bus: EventBus,
    pub(crate) expiry_redirect_delay: Duration,
    pub(crate) session: RwLock<Option<AuthRecord>>,
    pub(crate) cart: Mutex<CartSlot>,
    pub(crate) sync: tokio::sync::Mutex<SyncState>,
    pub(crate) redirect: Mutex<Option<JoinHandle<()>>>,
}

impl ClientState {
    /// Create client state without reading durable storage.
    ///
    /// # Arguments
    ///
    /// * `gateway` - Remote account API
    /// * `storage` - Durable key/value storage for the `auth` and `cart` keys
    /// * `navigator` - Front-end hooks for notices and view changes
    /// * `expiry_redirect_delay` - How long the session-expired notice stays up
    #[must_use]
    pub fn new(
        gateway: Arc<dyn AccountGateway>,
        storage: Arc<dyn LocalStorage>,
        navigator: Arc<dyn Navigator>,
        expiry_redirect_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(ClientStateInner {
                gateway,
                storage,
                navigator,
                bus: EventBus::new(),
                expiry_redirect_delay,
                session: RwLock::new(None),
                cart: Mutex::new(CartSlot::default()),
                sync: tokio::sync::Mutex::new(SyncState::default()),
                redirect: Mutex::new(None),
            }),
        }
    }

    /// Create client state and rehydrate the session from storage.
    #[must_use]
    pub fn start(
        gateway: Arc<dyn AccountGateway>,
        storage: Arc<dyn LocalStorage>,
        navigator: Arc<dyn Navigator>,
        expiry_redirect_delay: Duration,
    ) -> Self {
        let state = Self::new(gateway, storage, navigator, expiry_redirect_delay);
        state.session().rehydrate();
        state
    }

    /// Build an HTTP-backed client from configuration and rehydrate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(
        config: &ClientConfig,
        storage: Arc<dyn LocalStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let gateway = HttpAccountGateway::new(config.api_base_url.clone(), config.http_timeout)?;
        Ok(Self::start(
            Arc::new(gateway),
            storage,
            navigator,
            config.expiry_redirect_delay,
        ))
    }

    /// The session store.
    #[must_use]
    pub fn session(&self) -> SessionStore {
        SessionStore::new(self.clone())
    }

    /// The cart store.
    #[must_use]
    pub fn cart(&self) -> CartStore {
        CartStore::new(self.clone())
    }

    /// The change notification bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    /// The remote account API.
    #[must_use]
    pub fn gateway(&self) -> &Arc<dyn AccountGateway> {
        &self.inner.gateway
    }

    /// The session credential, or `NotAuthenticated` with `message`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` when nobody is logged in.
    pub fn require_credential(&self, message: &'static str) -> Result<Credential> {
        self.session()
            .credential()
            .ok_or(ClientError::NotAuthenticated(message))
    }

    /// Pass a gateway result through, ending the session if the credential
    /// was rejected.
    ///
    /// # Errors
    ///
    /// Returns the gateway error unchanged.
    pub fn guard<T>(&self, result: std::result::Result<T, GatewayError>) -> std::result::Result<T, GatewayError> {
        if matches!(result, Err(GatewayError::Unauthorized)) {
            tracing::warn!("Credential rejected by account API");
            self.session().expire();
        }
        result
    }
}

impl fmt::Debug for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientState")
            .field("expiry_redirect_delay", &self.inner.expiry_redirect_delay)
            .finish_non_exhaustive()
    }
}
