//! Command implementations.
//!
//! Output goes through `tracing` at info level, like every other message
//! the CLI prints.

pub mod account;
pub mod cart;
pub mod products;
pub mod shop;

use std::sync::Arc;

use shopwise_client::catalog::CatalogClient;
use shopwise_client::navigator::TracingNavigator;
use shopwise_client::storage::FileStorage;
use shopwise_client::{ClientConfig, ClientError, ClientState, Result};

/// Everything a command needs.
pub struct Context {
    pub state: ClientState,
    pub catalog: CatalogClient,
}

impl Context {
    /// Open file-backed state and build the HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created or an HTTP
    /// client cannot be built.
    pub fn open(config: &ClientConfig) -> Result<Self> {
        let storage = FileStorage::open(&config.state_dir).map_err(ClientError::from)?;
        let state =
            ClientState::from_config(config, Arc::new(storage), Arc::new(TracingNavigator))?;
        let catalog = CatalogClient::new(config.catalog_base_url.clone(), config.http_timeout)
            .map_err(ClientError::from)?;
        tracing::debug!(state_dir = %config.state_dir.display(), "Client ready");
        Ok(Self { state, catalog })
    }
}

/// Wait for a scheduled post-expiry redirect so its notice is dismissed and
/// the landing view reached before the process exits.
pub async fn finish_pending_redirect(state: &ClientState) {
    if let Some(redirect) = state.session().pending_redirect() {
        tracing::debug!("Waiting for session-expired redirect");
        if let Err(e) = redirect.await {
            tracing::debug!(error = %e, "Session-expired redirect did not complete");
        }
    }
}
