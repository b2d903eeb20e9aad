//! Integration tests for Shopwise.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopwise-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_cart` - Session transitions and cart reconciliation across tiers
//! - `concurrency` - Interleaved cart updates and signal ordering
//! - `expiry` - Rejected credentials, the expiry notice and redirect
//! - `checkout_flow` - Browse, add, coupon and order placement end to end
//!
//! Every test runs against the in-memory fakes from
//! `shopwise_client::testing`; no network access is needed.

use shopwise_core::{LineItem, Price};

/// A line item named after its id.
#[must_use]
pub fn item(id: &str, cents: u32, quantity: u32) -> LineItem {
    LineItem::new(id, format!("Product {id}"), Price::from_cents(cents), quantity)
}
