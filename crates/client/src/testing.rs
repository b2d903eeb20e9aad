//! In-memory test doubles for the gateway, navigator and catalog.
//!
//! Enabled for this crate's unit tests and, through the `testing` feature,
//! for the integration test crate.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use shopwise_core::{Cart, Email, LineItem, NewOrder, Order, OrderId, Product, ProductId, User};

use crate::catalog::{CatalogError, ProductSource};
use crate::credential::Credential;
use crate::gateway::{
    AccountGateway, AuthResponse, GatewayError, OrderReceipt, Profile, Registration,
};
use crate::navigator::{Navigator, Notice, View};
use crate::state::ClientState;
use crate::storage::MemoryStorage;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Tokens and fixtures
// =============================================================================

/// An unsigned JWT whose `exp` claim is `at`.
#[must_use]
pub fn token_expiring_at(at: DateTime<Utc>) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(
        r#"{{"id":"u-1","iat":{},"exp":{}}}"#,
        Utc::now().timestamp(),
        at.timestamp()
    ));
    format!("{header}.{payload}.signature")
}

/// A token valid for the next hour.
#[must_use]
pub fn valid_token() -> String {
    token_expiring_at(Utc::now() + chrono::Duration::hours(1))
}

/// A token that expired an hour ago.
#[must_use]
pub fn expired_token() -> String {
    token_expiring_at(Utc::now() - chrono::Duration::hours(1))
}

/// The user every fake login returns.
#[must_use]
pub fn sample_user() -> User {
    User {
        id: "u-1".into(),
        name: "Ada Lovelace".to_string(),
        email: Email::parse("ada@example.com").unwrap_or_else(|_| unreachable!()),
    }
}

fn unavailable() -> GatewayError {
    GatewayError::Api {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

// =============================================================================
// FakeGateway
// =============================================================================

/// Scriptable in-memory account API.
///
/// Holds one remote cart, favorites list and order history. Failures and
/// per-call delays can be injected; every call is recorded.
#[derive(Debug, Default)]
pub struct FakeGateway {
    remote_cart: Mutex<Cart>,
    favorites: Mutex<Vec<ProductId>>,
    orders: Mutex<Vec<Order>>,
    registered: Mutex<Vec<String>>,

    unauthorized: AtomicBool,
    reject_login: AtomicBool,
    fail_get_cart: AtomicBool,
    fail_merge_cart: AtomicBool,
    fail_update_cart: AtomicBool,
    fail_create_order: AtomicBool,

    get_cart_calls: AtomicUsize,
    favorite_writes: AtomicUsize,
    update_cart_calls: Mutex<Vec<Vec<LineItem>>>,
    merge_cart_calls: Mutex<Vec<Vec<LineItem>>>,
    created_orders: Mutex<Vec<NewOrder>>,
    update_cart_delays: Mutex<VecDeque<Duration>>,
}

impl FakeGateway {
    /// A gateway with an empty remote account.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- remote state ---

    /// Replace the remote cart.
    pub fn set_remote_cart(&self, cart: Cart) {
        *lock(&self.remote_cart) = cart;
    }

    /// Current remote cart.
    #[must_use]
    pub fn remote_cart(&self) -> Cart {
        lock(&self.remote_cart).clone()
    }

    /// Replace the remote favorites.
    pub fn set_favorites(&self, ids: Vec<ProductId>) {
        *lock(&self.favorites) = ids;
    }

    /// Current remote favorites.
    #[must_use]
    pub fn favorites(&self) -> Vec<ProductId> {
        lock(&self.favorites).clone()
    }

    /// Replace the remote order history.
    pub fn set_orders(&self, orders: Vec<Order>) {
        *lock(&self.orders) = orders;
    }

    // --- failure injection ---

    /// Reject every authenticated call with 401.
    pub fn reject_credentials(&self, on: bool) {
        self.unauthorized.store(on, Ordering::SeqCst);
    }

    /// Reject login with a validation error.
    pub fn reject_login(&self, on: bool) {
        self.reject_login.store(on, Ordering::SeqCst);
    }

    /// Make `get_cart` fail with a server error.
    pub fn fail_get_cart(&self, on: bool) {
        self.fail_get_cart.store(on, Ordering::SeqCst);
    }

    /// Make `merge_cart` fail with a server error.
    pub fn fail_merge_cart(&self, on: bool) {
        self.fail_merge_cart.store(on, Ordering::SeqCst);
    }

    /// Make `update_cart` and `clear_cart` fail with a server error.
    pub fn fail_update_cart(&self, on: bool) {
        self.fail_update_cart.store(on, Ordering::SeqCst);
    }

    /// Make `create_order` fail with a server error.
    pub fn fail_create_order(&self, on: bool) {
        self.fail_create_order.store(on, Ordering::SeqCst);
    }

    /// Delay the next `update_cart` call by `delay`.
    pub fn delay_next_update_cart(&self, delay: Duration) {
        lock(&self.update_cart_delays).push_back(delay);
    }

    // --- recorded calls ---

    /// Number of `get_cart` calls so far.
    #[must_use]
    pub fn get_cart_calls(&self) -> usize {
        self.get_cart_calls.load(Ordering::SeqCst)
    }

    /// Bodies of every completed `update_cart` call, in completion order.
    #[must_use]
    pub fn update_cart_calls(&self) -> Vec<Vec<LineItem>> {
        lock(&self.update_cart_calls).clone()
    }

    /// Bodies of every `merge_cart` call.
    #[must_use]
    pub fn merge_cart_calls(&self) -> Vec<Vec<LineItem>> {
        lock(&self.merge_cart_calls).clone()
    }

    /// Number of `add_favorite` and `remove_favorite` calls.
    #[must_use]
    pub fn favorite_writes(&self) -> usize {
        self.favorite_writes.load(Ordering::SeqCst)
    }

    /// Every submitted order.
    #[must_use]
    pub fn created_orders(&self) -> Vec<NewOrder> {
        lock(&self.created_orders).clone()
    }

    fn authorize(&self, credential: &Credential) -> Result<(), GatewayError> {
        if self.unauthorized.load(Ordering::SeqCst) || !credential.is_valid() {
            return Err(GatewayError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl AccountGateway for FakeGateway {
    async fn login(
        &self,
        _email: &Email,
        _password: &SecretString,
    ) -> Result<AuthResponse, GatewayError> {
        if self.reject_login.load(Ordering::SeqCst) {
            return Err(GatewayError::Validation(
                "Invalid email or password".to_string(),
            ));
        }
        let token =
            Credential::new(valid_token()).map_err(|e| GatewayError::Parse(e.to_string()))?;
        Ok(AuthResponse {
            user: sample_user(),
            token,
            message: Some("Login successful".to_string()),
        })
    }

    async fn register(&self, registration: &Registration) -> Result<String, GatewayError> {
        let mut registered = lock(&self.registered);
        let email = registration.email.as_str().to_string();
        if registered.contains(&email) {
            return Err(GatewayError::Validation("User already exists".to_string()));
        }
        registered.push(email);
        Ok("User registered successfully".to_string())
    }

    async fn get_profile(&self, credential: &Credential) -> Result<Profile, GatewayError> {
        self.authorize(credential)?;
        let user = sample_user();
        Ok(Profile {
            name: user.name,
            email: user.email.as_str().to_string(),
        })
    }

    async fn get_cart(&self, credential: &Credential) -> Result<Cart, GatewayError> {
        self.get_cart_calls.fetch_add(1, Ordering::SeqCst);
        self.authorize(credential)?;
        if self.fail_get_cart.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.remote_cart())
    }

    async fn update_cart(
        &self,
        credential: &Credential,
        items: &[LineItem],
    ) -> Result<(), GatewayError> {
        self.authorize(credential)?;
        let delay = lock(&self.update_cart_delays).pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_update_cart.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        lock(&self.update_cart_calls).push(items.to_vec());
        self.set_remote_cart(Cart::from_lines(items.to_vec()));
        Ok(())
    }

    async fn merge_cart(
        &self,
        credential: &Credential,
        items: &[LineItem],
    ) -> Result<(), GatewayError> {
        self.authorize(credential)?;
        lock(&self.merge_cart_calls).push(items.to_vec());
        if self.fail_merge_cart.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut remote = lock(&self.remote_cart);
        for item in items {
            remote
                .add(item.clone())
                .map_err(|e| GatewayError::Validation(e.to_string()))?;
        }
        Ok(())
    }

    async fn remove_cart_item(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        self.authorize(credential)?;
        lock(&self.remote_cart).remove(product_id);
        Ok(())
    }

    async fn clear_cart(&self, credential: &Credential) -> Result<(), GatewayError> {
        self.authorize(credential)?;
        if self.fail_update_cart.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        lock(&self.remote_cart).clear();
        Ok(())
    }

    async fn get_favorites(&self, credential: &Credential) -> Result<Vec<ProductId>, GatewayError> {
        self.authorize(credential)?;
        Ok(self.favorites())
    }

    async fn add_favorite(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        self.authorize(credential)?;
        self.favorite_writes.fetch_add(1, Ordering::SeqCst);
        let mut favorites = lock(&self.favorites);
        if !favorites.contains(product_id) {
            favorites.push(product_id.clone());
        }
        Ok(())
    }

    async fn remove_favorite(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        self.authorize(credential)?;
        self.favorite_writes.fetch_add(1, Ordering::SeqCst);
        lock(&self.favorites).retain(|id| id != product_id);
        Ok(())
    }

    async fn create_order(
        &self,
        credential: &Credential,
        order: &NewOrder,
    ) -> Result<OrderReceipt, GatewayError> {
        self.authorize(credential)?;
        if self.fail_create_order.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        lock(&self.created_orders).push(order.clone());

        let mut orders = lock(&self.orders);
        let placed = Order {
            id: OrderId::new(format!("order-{}", orders.len() + 1)),
            created_at: Utc::now(),
            total: order.total,
            items: order.items.clone(),
            shipping_info: Some(order.shipping_info.clone()),
        };
        orders.push(placed.clone());

        Ok(OrderReceipt {
            success: true,
            message: Some("Order created successfully".to_string()),
            order: Some(placed),
        })
    }

    async fn get_orders(&self, credential: &Credential) -> Result<Vec<Order>, GatewayError> {
        self.authorize(credential)?;
        Ok(lock(&self.orders).clone())
    }
}

// =============================================================================
// RecordingNavigator
// =============================================================================

/// Something the client asked the front end to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    Notice(String),
    Dismissed,
    Navigated(View),
}

/// Navigator that records every call.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<NavEvent>>,
}

impl RecordingNavigator {
    /// A navigator with no recorded events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in call order.
    #[must_use]
    pub fn events(&self) -> Vec<NavEvent> {
        lock(&self.events).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn show_notice(&self, notice: &Notice) {
        lock(&self.events).push(NavEvent::Notice(notice.message.clone()));
    }

    fn dismiss_notice(&self) {
        lock(&self.events).push(NavEvent::Dismissed);
    }

    fn navigate(&self, view: View) {
        lock(&self.events).push(NavEvent::Navigated(view));
    }
}

// =============================================================================
// FakeCatalog
// =============================================================================

/// Product lookup backed by a map.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    products: HashMap<ProductId, Product>,
}

impl FakeCatalog {
    /// A catalog holding `products`.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }
}

#[async_trait]
impl ProductSource for FakeCatalog {
    async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.products
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}

// =============================================================================
// TestClient
// =============================================================================

/// A [`ClientState`] wired to fakes, with handles to each fake.
#[derive(Debug)]
pub struct TestClient {
    pub state: ClientState,
    pub gateway: Arc<FakeGateway>,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
}

impl TestClient {
    /// Expiry notice delay used by [`TestClient::new`].
    pub const EXPIRY_DELAY: Duration = Duration::from_secs(5);

    /// Fresh anonymous client with empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(MemoryStorage::new())
    }

    /// Client started from pre-populated storage.
    #[must_use]
    pub fn with_storage(storage: MemoryStorage) -> Self {
        let gateway = Arc::new(FakeGateway::new());
        let storage = Arc::new(storage);
        let navigator = Arc::new(RecordingNavigator::new());
        let state = ClientState::start(
            gateway.clone(),
            storage.clone(),
            navigator.clone(),
            Self::EXPIRY_DELAY,
        );
        Self {
            state,
            gateway,
            storage,
            navigator,
        }
    }

    /// Log in as [`sample_user`] with a fresh token.
    ///
    /// # Panics
    ///
    /// Panics if the login is refused.
    pub async fn login(&self) {
        let credential = Credential::new(valid_token()).unwrap_or_else(|_| unreachable!());
        if let Err(e) = self.state.session().login(sample_user(), credential).await {
            panic!("test login failed: {e}");
        }
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
