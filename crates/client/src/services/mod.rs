//! Account-backed flows built on the session and cart stores.
//!
//! Each service borrows a [`ClientState`](crate::state::ClientState) handle
//! and routes every gateway result through
//! [`ClientState::guard`](crate::state::ClientState::guard), so a rejected
//! credential ends the session no matter which flow saw it.

pub mod account;
pub mod checkout;
pub mod orders;
pub mod wishlist;

pub use account::Account;
pub use checkout::Checkout;
pub use orders::Orders;
pub use wishlist::Wishlist;
