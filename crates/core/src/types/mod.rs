//! Core types for Shopwise.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod quantity;

pub use email::Email;
pub use id::*;
pub use price::Price;
pub use quantity::Quantity;
