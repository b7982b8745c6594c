//! BigCommerce REST API client.
//!
//! Provides the three resource clients the commerce facade composes:
//! customers, carts (plus the checkout endpoints hanging off a cart), and
//! orders.
//!
//! # API Reference
//!
//! - Base URL: `{api_url}/stores/{store_hash}`
//! - Authentication: `X-Auth-Token: <access token>`
//! - v3 responses are wrapped in a `data` envelope; v2 (orders, coupons) are not
//! - v2 list endpoints answer `204 No Content` for an empty list
//!
//! The facade talks to the traits below rather than to [`BigCommerceClient`]
//! directly, so tests can substitute recording fakes.

mod carts;
mod client;
mod customers;
mod login;
mod orders;

pub use client::BigCommerceClient;

use async_trait::async_trait;
use carebridge_core::{CartId, ConsignmentId, CustomerId, Email, LineItemId, OrderId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{
    Cart, CartItems, Checkout, Coupon, Customer, Order, OrderAddress, OrderProduct, Profile,
    RedirectUrls, Shipment, ShippingAddress,
};

/// Errors that can occur when interacting with the BigCommerce API.
#[derive(Debug, Error)]
pub enum BigCommerceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by BigCommerce.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unauthorized (invalid or under-scoped access token).
    #[error("Unauthorized: invalid access token")]
    Unauthorized,

    /// Client or request could not be built from configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Customer login JWT could not be signed.
    #[error("Customer login token error: {0}")]
    LoginToken(#[from] jsonwebtoken::errors::Error),
}

/// Customer lookups and creation.
#[async_trait]
pub trait CustomerApi: Send + Sync {
    /// Find the customer registered under `email`, if any.
    async fn get_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Customer>, BigCommerceError>;

    /// Register a new customer from a caregiver profile.
    async fn create_customer(&self, profile: &Profile) -> Result<Customer, BigCommerceError>;
}

/// Carts and the checkout mutators keyed by cart ID.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetch a cart; `None` when BigCommerce no longer knows it.
    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, BigCommerceError>;

    /// Create an empty cart owned by `customer_id`.
    async fn create_cart(&self, customer_id: CustomerId) -> Result<Cart, BigCommerceError>;

    /// Add OTC and prescription items; returns the updated cart.
    async fn add_items_to_cart(
        &self,
        cart_id: &CartId,
        items: &CartItems,
    ) -> Result<Cart, BigCommerceError>;

    /// Remove one line item.
    async fn delete_item_from_cart(
        &self,
        cart_id: &CartId,
        item_id: &LineItemId,
    ) -> Result<(), BigCommerceError>;

    /// Anonymous cart/checkout URLs.
    async fn create_cart_redirect_urls(
        &self,
        cart_id: &CartId,
    ) -> Result<RedirectUrls, BigCommerceError>;

    /// Checkout URLs that sign the customer in on the way.
    async fn create_logged_in_cart_redirect_urls(
        &self,
        cart_id: &CartId,
        customer_id: CustomerId,
    ) -> Result<RedirectUrls, BigCommerceError>;

    /// Attach the recipient's address to the cart's checkout.
    async fn add_shipping_address(
        &self,
        cart: &Cart,
        address: &ShippingAddress,
    ) -> Result<Checkout, BigCommerceError>;

    /// Create a consignment shipping every line item of the cart to `address`.
    async fn create_consignment(
        &self,
        cart: &Cart,
        address: &ShippingAddress,
    ) -> Result<Checkout, BigCommerceError>;

    /// Set the shipping cost on an existing consignment.
    async fn set_shipping_cost(
        &self,
        cart: &Cart,
        consignment_id: &ConsignmentId,
        shipping_cost_total: Decimal,
    ) -> Result<Checkout, BigCommerceError>;

    /// The store's free-shipping coupon, if one is configured.
    async fn get_free_shipping_coupon(&self) -> Result<Option<Coupon>, BigCommerceError>;

    /// Apply a coupon code to the cart's checkout.
    async fn add_coupon(&self, cart: &Cart, code: &str) -> Result<Checkout, BigCommerceError>;

    /// Remove a coupon code from the cart's checkout.
    async fn remove_coupon(&self, cart: &Cart, code: &str) -> Result<Checkout, BigCommerceError>;
}

/// Read access to placed orders.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn get_orders(&self, customer_id: CustomerId) -> Result<Vec<Order>, BigCommerceError>;

    async fn get_order_by_id(&self, order_id: OrderId) -> Result<Order, BigCommerceError>;

    async fn get_order_addresses(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderAddress>, BigCommerceError>;

    async fn get_order_shipments(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Shipment>, BigCommerceError>;

    async fn get_order_products(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderProduct>, BigCommerceError>;
}
