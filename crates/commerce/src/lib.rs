//! Carebridge Commerce - caregiver profiles on BigCommerce.
//!
//! Links each caregiver profile to a BigCommerce customer and two carts
//! (immediate purchase and pay-later), and exposes the cart, checkout and
//! order operations the caregiver app needs.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use carebridge_commerce::{BigCommerceClient, BigCommerceConfig, CommerceService, MemoryProfileStore};
//!
//! let config = BigCommerceConfig::from_env()?;
//! let client = BigCommerceClient::new(&config)?;
//! let commerce = CommerceService::with_bigcommerce(Arc::new(MemoryProfileStore::new()), client);
//!
//! let cart = commerce.get_or_create_main_cart(&"profile-1".into()).await?;
//! ```
//!
//! # Modules
//!
//! - [`bigcommerce`] - REST client and the resource traits the facade uses
//! - [`service`] - [`CommerceService`], the facade itself
//! - [`profile`] - profile store seam
//! - [`types`] - carts, line items, profiles and pass-through documents

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bigcommerce;
pub mod config;
pub mod error;
pub mod profile;
pub mod service;
pub mod types;

pub use bigcommerce::{BigCommerceClient, BigCommerceError, CartApi, CustomerApi, OrderApi};
pub use config::{BigCommerceConfig, ConfigError, CustomerLoginConfig};
pub use error::CommerceError;
pub use profile::{MemoryProfileStore, ProfileStore, ProfileStoreError};
pub use service::CommerceService;
pub use service::cart::{find_item_in_cart_by_id, find_item_in_cart_by_sku};
pub use types::CartType;
