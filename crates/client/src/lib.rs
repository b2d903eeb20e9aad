//! Shopwise client library.
//!
//! The session and cart synchronization layer of the Shopwise storefront.
//! Everything a front end needs to render the shop sits behind one
//! [`ClientState`] handle:
//!
//! - [`session::SessionStore`] - who is logged in, credential expiry
//! - [`cart::CartStore`] - the authoritative cart across local and remote tiers
//! - [`events::EventBus`] - payload-free change signals for observers
//! - [`services`] - checkout, orders, wishlist, and account flows
//!
//! # Architecture
//!
//! - Remote account API behind the [`gateway::AccountGateway`] trait
//! - Durable client state behind the [`storage::LocalStorage`] trait
//! - Product catalog via [`catalog::CatalogClient`], cached with `moka`
//! - Errors captured to Sentry, logs via `tracing`
//!
//! # Example
//!
//! ```rust,ignore
//! use shopwise_client::{ClientConfig, ClientState};
//!
//! let config = ClientConfig::from_env()?;
//! let state = ClientState::from_config(&config, storage, navigator)?;
//!
//! state.cart().load().await;
//! state.cart().add(item).await?;
//! let badge = state.cart().total_item_count();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod credential;
pub mod error;
pub mod events;
pub mod gateway;
pub mod navigator;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{ClientConfig, ConfigError};
pub use credential::Credential;
pub use error::{ClientError, Result};
pub use events::{EventBus, Signal};
pub use state::ClientState;
