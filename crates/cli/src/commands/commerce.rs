//! BigCommerce commands.
//!
//! Reads the `BIGCOMMERCE_*` variables documented on
//! [`BigCommerceConfig`](carebridge_commerce::BigCommerceConfig).

use carebridge_commerce::{BigCommerceClient, BigCommerceConfig, CartApi, OrderApi};
use carebridge_core::{CartId, CustomerId, OrderId};
use serde_json::json;
use tracing::info;

use super::{CommandError, print_json};

fn connect() -> Result<BigCommerceClient, CommandError> {
    let config = BigCommerceConfig::from_env()?;
    let client = BigCommerceClient::new(&config)?;
    info!(store_hash = %config.store_hash, "Connected to BigCommerce");
    Ok(client)
}

/// Print a cart.
pub async fn cart(cart_id: &str) -> Result<(), CommandError> {
    let client = connect()?;
    let cart = client
        .get_cart(&CartId::from(cart_id))
        .await?
        .ok_or_else(|| CommandError::NotFound(format!("cart {cart_id}")))?;
    print_json(&cart)
}

/// Print checkout URLs for a cart, signing the customer in when given.
pub async fn redirect(cart_id: &str, customer_id: Option<i64>) -> Result<(), CommandError> {
    let client = connect()?;
    let cart_id = CartId::from(cart_id);
    let urls = match customer_id {
        Some(id) => {
            client
                .create_logged_in_cart_redirect_urls(&cart_id, CustomerId::new(id))
                .await?
        }
        None => client.create_cart_redirect_urls(&cart_id).await?,
    };
    print_json(&urls)
}

/// Print a customer's orders.
pub async fn orders(customer_id: i64) -> Result<(), CommandError> {
    let client = connect()?;
    print_json(&client.get_orders(CustomerId::new(customer_id)).await?)
}

/// Print an order with its shipping addresses, shipments and products.
pub async fn order(order_id: i64) -> Result<(), CommandError> {
    let client = connect()?;
    let order_id = OrderId::new(order_id);

    let order = client.get_order_by_id(order_id).await?;
    let shipping_addresses = client.get_order_addresses(order_id).await?;
    let shipments = client.get_order_shipments(order_id).await?;
    let products = client.get_order_products(order_id).await?;

    print_json(&json!({
        "order": order,
        "shipping_addresses": shipping_addresses,
        "shipments": shipments,
        "products": products,
    }))
}
