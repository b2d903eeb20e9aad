//! Cart store: the single authoritative cart across the local and remote
//! tiers.
//!
//! Every mutation is a read-modify-write against the latest in-memory cart
//! under a short lock that is never held across an await. The local tier is
//! written inside that lock. Remote pushes are serialized and always send
//! the newest cart, so interleaved completions cannot resurrect a stale
//! snapshot.

use std::sync::{MutexGuard, PoisonError};

use shopwise_core::{Cart, LineItem, Price, ProductId, ValidationError};
use tracing::{debug, instrument, warn};

use crate::error::add_breadcrumb;
use crate::events::Signal;
use crate::state::ClientState;
use crate::storage::{CART_KEY, read_json, write_json};

/// In-memory cart plus bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct CartSlot {
    cart: Cart,
    loaded: bool,
    /// Bumped on every mutation.
    revision: u64,
    /// Bumped on every session transition.
    epoch: u64,
}

/// Last revision acknowledged by the remote tier.
#[derive(Debug, Default)]
pub(crate) struct SyncState {
    epoch: u64,
    revision: u64,
}

/// View of the cart half of [`ClientState`].
#[derive(Debug, Clone)]
pub struct CartStore {
    state: ClientState,
}

impl CartStore {
    pub(crate) const fn new(state: ClientState) -> Self {
        Self { state }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Reconcile once per session. Later calls return immediately.
    pub async fn load(&self) {
        if self.is_loaded() {
            return;
        }
        self.reconcile().await;
    }

    /// Reconcile even if already loaded.
    pub async fn refresh(&self) {
        self.reconcile().await;
    }

    /// Decide which tier is authoritative.
    ///
    /// - anonymous: the local tier
    /// - remote non-empty: the remote cart replaces the local one
    /// - remote empty, local non-empty: the local cart is merged into the
    ///   remote tier and kept
    /// - remote unreachable: the local tier
    #[instrument(skip(self))]
    async fn reconcile(&self) {
        let (epoch, revision, local) = {
            let slot = self.slot();
            let local = if slot.loaded {
                slot.cart.clone()
            } else {
                self.read_local()
            };
            (slot.epoch, slot.revision, local)
        };

        let cart = match self.state.session().credential() {
            None => local,
            Some(credential) => {
                let gateway = self.state.gateway();
                match self.state.guard(gateway.get_cart(&credential).await) {
                    Ok(remote) if !remote.is_empty() => {
                        if !local.is_empty() {
                            debug!(
                                discarded_lines = local.len(),
                                "Remote cart takes precedence over local cart"
                            );
                        }
                        remote
                    }
                    Ok(_) if local.is_empty() => Cart::new(),
                    Ok(_) => {
                        let merged = self
                            .state
                            .guard(gateway.merge_cart(&credential, local.lines()).await);
                        if let Err(e) = merged {
                            warn!(error = %e, "Failed to merge local cart into remote cart");
                        }
                        local
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to load remote cart, using local cart");
                        local
                    }
                }
            }
        };

        let applied = {
            let mut slot = self.slot();
            if slot.epoch != epoch {
                debug!("Session changed during reconciliation, discarding result");
                false
            } else {
                // A mutation that landed while we were waiting already holds
                // the newest cart.
                if slot.revision == revision {
                    slot.cart = cart;
                    self.write_local(&slot.cart);
                }
                slot.loaded = true;
                true
            }
        };

        if applied {
            self.state.bus().publish(Signal::CartChanged);
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add an item, merging with an existing line for the same product.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero quantity.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub async fn add(&self, item: LineItem) -> Result<(), ValidationError> {
        let product_id = item.product_id.clone();
        self.mutate(|cart| cart.add(item).map(|()| true)).await?;
        add_breadcrumb(
            "cart",
            "Added item",
            Some(&[("product_id", product_id.as_str())]),
        );
        Ok(())
    }

    /// Set a line's quantity exactly. Zero or less removes the line; an
    /// unknown product is a silent no-op.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(&self, product_id: &ProductId, quantity: i64) {
        let _ = self
            .mutate(|cart| Ok(cart.set_quantity(product_id, quantity).changed()))
            .await;
    }

    /// Remove a product's line if present.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) {
        let _ = self.mutate(|cart| Ok(cart.remove(product_id))).await;
    }

    /// Empty the cart in both tiers.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        let _ = self
            .mutate(|cart| {
                cart.clear();
                Ok(true)
            })
            .await;
    }

    /// Apply `change` to the latest cart, persist it locally, announce it
    /// and push it remotely.
    ///
    /// Returns whether the cart changed.
    async fn mutate<F>(&self, change: F) -> Result<bool, ValidationError>
    where
        F: FnOnce(&mut Cart) -> Result<bool, ValidationError>,
    {
        let epoch = {
            let mut slot = self.slot();
            if !slot.loaded {
                slot.cart = self.read_local();
            }
            if !change(&mut slot.cart)? {
                return Ok(false);
            }
            slot.revision += 1;
            self.write_local(&slot.cart);
            slot.epoch
        };

        self.state.bus().publish(Signal::CartChanged);
        self.sync_remote(epoch).await;
        Ok(true)
    }

    /// Push the newest cart to the remote tier when authenticated.
    ///
    /// Pushes are serialized; one that finds its revision already
    /// acknowledged is skipped. Failures are logged and never roll back the
    /// local change.
    async fn sync_remote(&self, epoch: u64) {
        let mut sync = self.state.inner.sync.lock().await;

        let (lines, revision) = {
            let slot = self.slot();
            if slot.epoch != epoch {
                return;
            }
            (slot.cart.lines().to_vec(), slot.revision)
        };
        if sync.epoch == epoch && sync.revision >= revision {
            debug!(revision, "Remote cart already up to date");
            return;
        }

        let Some(credential) = self.state.session().credential() else {
            return;
        };

        let gateway = self.state.gateway();
        let result = if lines.is_empty() {
            gateway.clear_cart(&credential).await
        } else {
            gateway.update_cart(&credential, &lines).await
        };

        match self.state.guard(result) {
            Ok(()) => {
                sync.epoch = epoch;
                sync.revision = revision;
                debug!(revision, lines = lines.len(), "Remote cart updated");
            }
            Err(e) => warn!(error = %e, "Failed to sync cart to remote"),
        }
    }

    // =========================================================================
    // Session transitions
    // =========================================================================

    /// Invalidate in-flight work from the previous session.
    pub(crate) fn begin_session(&self) {
        self.slot().epoch += 1;
    }

    /// Empty the cart and the local tier for a new anonymous session.
    pub(crate) fn reset(&self) {
        let mut slot = self.slot();
        slot.cart.clear();
        slot.loaded = false;
        slot.epoch += 1;
        if let Err(e) = self.state.inner.storage.remove(CART_KEY) {
            warn!(error = %e, "Failed to remove stored cart");
        }
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// Snapshot of the lines.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        self.slot().cart.lines().to_vec()
    }

    /// Snapshot of the cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.slot().cart.clone()
    }

    /// Sum of quantities, for badges.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.slot().cart.total_item_count()
    }

    /// Sum of price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.slot().cart.subtotal()
    }

    /// Whether the cart has been reconciled for the current session.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.slot().loaded
    }

    // =========================================================================
    // Local tier
    // =========================================================================

    fn slot(&self) -> MutexGuard<'_, CartSlot> {
        self.state
            .inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_local(&self) -> Cart {
        read_json(self.state.inner.storage.as_ref(), CART_KEY).unwrap_or_default()
    }

    fn write_local(&self, cart: &Cart) {
        let storage = self.state.inner.storage.as_ref();
        let result = if cart.is_empty() {
            storage.remove(CART_KEY)
        } else {
            write_json(storage, CART_KEY, cart)
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to write local cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::credential::Credential;
    use crate::storage::MemoryStorage;
    use crate::testing::{FakeGateway, TestClient, sample_user, valid_token};

    fn item(id: &str, cents: u32, quantity: u32) -> LineItem {
        LineItem::new(id, format!("Product {id}"), Price::from_cents(cents), quantity)
    }

    fn client() -> (ClientState, Arc<FakeGateway>, Arc<MemoryStorage>) {
        let client = TestClient::new();
        (client.state, client.gateway, client.storage)
    }

    async fn login(state: &ClientState) {
        state
            .session()
            .login(sample_user(), Credential::new(valid_token()).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_anonymous_add_merges_lines() {
        let (state, gateway, storage) = client();
        let cart = state.cart();

        cart.add(item("p1", 1000, 2)).await.unwrap();
        cart.add(item("p1", 1000, 1)).await.unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.subtotal(), Price::from_cents(3000));

        let stored: Cart = read_json(storage.as_ref(), CART_KEY).unwrap();
        assert_eq!(stored, cart.cart());
        assert!(gateway.update_cart_calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_zero_quantity_is_rejected_without_signal() {
        let (state, _, _) = client();
        let mut sub = state.bus().subscribe();
        assert!(state.cart().add(item("p1", 100, 0)).await.is_err());
        assert!(sub.drain().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_id_is_silent() {
        let (state, gateway, _) = client();
        login(&state).await;
        let pushes_before = gateway.update_cart_calls().len();
        let mut sub = state.bus().subscribe();

        state.cart().update_quantity(&ProductId::new("ghost"), 4).await;

        assert!(sub.drain().is_empty());
        assert_eq!(gateway.update_cart_calls().len(), pushes_before);
    }

    #[tokio::test]
    async fn test_load_is_idempotent_and_refresh_is_not() {
        let (state, gateway, _) = client();
        login(&state).await;
        let fetches = gateway.get_cart_calls();

        state.cart().load().await;
        assert_eq!(gateway.get_cart_calls(), fetches);

        state.cart().refresh().await;
        assert_eq!(gateway.get_cart_calls(), fetches + 1);
    }

    #[tokio::test]
    async fn test_anonymous_load_reads_local_tier() {
        let (state, _, storage) = client();
        write_json(storage.as_ref(), CART_KEY, &Cart::from_lines([item("p9", 250, 4)])).unwrap();

        state.cart().load().await;
        assert!(state.cart().is_loaded());
        assert_eq!(state.cart().total_item_count(), 4);
    }

    #[tokio::test]
    async fn test_remote_wins_when_both_non_empty() {
        let (state, gateway, _) = client();
        state.cart().add(item("local", 100, 1)).await.unwrap();
        gateway.set_remote_cart(Cart::from_lines([item("remote", 200, 2)]));

        login(&state).await;

        let ids: Vec<_> = state.cart().items().into_iter().map(|l| l.product_id).collect();
        assert_eq!(ids, [ProductId::new("remote")]);
        assert!(gateway.merge_cart_calls().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let (state, gateway, _) = client();
        state.cart().add(item("p1", 100, 2)).await.unwrap();
        gateway.fail_get_cart(true);

        login(&state).await;

        assert!(state.cart().is_loaded());
        assert_eq!(state.cart().total_item_count(), 2);
    }

    #[tokio::test]
    async fn test_authenticated_clear_empties_remote() {
        let (state, gateway, storage) = client();
        login(&state).await;
        state.cart().add(item("p1", 100, 2)).await.unwrap();
        assert_eq!(gateway.remote_cart().total_item_count(), 2);

        state.cart().clear().await;

        assert!(gateway.remote_cart().is_empty());
        assert!(!storage.contains(CART_KEY));
    }

    #[tokio::test]
    async fn test_remote_push_failure_keeps_local_change() {
        let (state, gateway, _) = client();
        login(&state).await;
        gateway.fail_update_cart(true);

        state.cart().add(item("p1", 100, 1)).await.unwrap();

        assert_eq!(state.cart().total_item_count(), 1);
        assert!(state.session().is_authenticated());
    }
}
