//! Shopwise Core - Shared domain types.
//!
//! This crate provides the types used by every Shopwise component:
//! - `client` - Session and cart synchronization over the remote account API
//! - `cli` - Command-line front end driving the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no storage,
//! no HTTP clients. Every cart invariant lives here so that both storage
//! tiers and every front end share one implementation of it.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and quantities
//! - [`cart`] - Cart line items and the cart invariants
//! - [`coupon`] - Checkout coupon rules
//! - [`checkout`] - Shipping form validation
//! - [`order`] - Orders and order history
//! - [`product`] - Catalog products
//! - [`user`] - Account identity
//! - [`validation`] - Field-level validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod order;
pub mod product;
pub mod types;
pub mod user;
pub mod validation;

pub use cart::{Cart, LineItem, QuantityChange};
pub use checkout::{CheckoutForm, PaymentMethod, ShippingInfo};
pub use coupon::CouponState;
pub use order::{NewOrder, Order};
pub use product::{Product, Rating};
pub use types::*;
pub use user::User;
pub use validation::ValidationError;
