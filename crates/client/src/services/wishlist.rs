//! Favorites kept on the remote account.

use shopwise_core::{Product, ProductId, ValidationError};
use tracing::{debug, instrument, warn};

use crate::catalog::{CatalogError, ProductSource};
use crate::credential::Credential;
use crate::error::Result;
use crate::state::ClientState;

const LOGIN_FOR_FAVORITES: &str = "Please login to manage favorites";

/// The logged-in user's wishlist.
///
/// Every call reads the remote list, so two front ends sharing an account
/// see each other's changes.
#[derive(Debug, Clone)]
pub struct Wishlist {
    state: ClientState,
}

impl Wishlist {
    #[must_use]
    pub const fn new(state: ClientState) -> Self {
        Self { state }
    }

    fn credential(&self) -> Result<Credential> {
        self.state
            .session()
            .credential()
            .ok_or_else(|| ValidationError::LoginRequired(LOGIN_FOR_FAVORITES).into())
    }

    async fn fetch(&self, credential: &Credential) -> Result<Vec<ProductId>> {
        let result = self.state.gateway().get_favorites(credential).await;
        Ok(self.state.guard(result)?)
    }

    /// Favorite product ids.
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired` without a session, or the gateway error.
    pub async fn favorites(&self) -> Result<Vec<ProductId>> {
        let credential = self.credential()?;
        self.fetch(&credential).await
    }

    /// # Errors
    ///
    /// Same as [`Wishlist::favorites`].
    pub async fn is_favorite(&self, id: &ProductId) -> Result<bool> {
        Ok(self.favorites().await?.contains(id))
    }

    /// Flip membership and return the new state.
    ///
    /// # Errors
    ///
    /// Same as [`Wishlist::favorites`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn toggle(&self, id: &ProductId) -> Result<bool> {
        let credential = self.credential()?;
        let present = self.fetch(&credential).await?.contains(id);
        self.write(&credential, id, !present).await?;
        Ok(!present)
    }

    /// Add `id`. Already present is a no-op.
    ///
    /// # Errors
    ///
    /// Same as [`Wishlist::favorites`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add(&self, id: &ProductId) -> Result<()> {
        let credential = self.credential()?;
        if self.fetch(&credential).await?.contains(id) {
            debug!("Already a favorite");
            return Ok(());
        }
        self.write(&credential, id, true).await
    }

    /// Remove `id`. Absent is a no-op.
    ///
    /// # Errors
    ///
    /// Same as [`Wishlist::favorites`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: &ProductId) -> Result<()> {
        let credential = self.credential()?;
        if !self.fetch(&credential).await?.contains(id) {
            debug!("Not a favorite");
            return Ok(());
        }
        self.write(&credential, id, false).await
    }

    async fn write(&self, credential: &Credential, id: &ProductId, favorite: bool) -> Result<()> {
        let gateway = self.state.gateway();
        let result = if favorite {
            gateway.add_favorite(credential, id).await
        } else {
            gateway.remove_favorite(credential, id).await
        };
        self.state.guard(result)?;
        Ok(())
    }

    /// Resolve favorites to products, skipping ids the catalog dropped.
    ///
    /// # Errors
    ///
    /// Returns the session or gateway error, or a catalog failure other than
    /// not-found.
    pub async fn favorite_products(&self, catalog: &dyn ProductSource) -> Result<Vec<Product>> {
        let ids = self.favorites().await?;
        let mut products = Vec::with_capacity(ids.len());
        for id in &ids {
            match catalog.product(id).await {
                Ok(product) => products.push(product),
                Err(CatalogError::NotFound(_)) => {
                    warn!(product_id = %id, "Favorite no longer in catalog");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(products)
    }
}
