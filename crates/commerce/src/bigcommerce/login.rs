//! Customer login tokens.
//!
//! BigCommerce signs a customer into the storefront when the browser visits
//! `{storefront}/login/token/{jwt}`, where the JWT is HS256-signed with the
//! API account's client secret and carries the page to land on.

use carebridge_core::{ChannelId, CustomerId};
use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::ExposeSecret;
use serde::Serialize;
use url::Url;

use super::BigCommerceError;
use crate::config::CustomerLoginConfig;

#[derive(Debug, Serialize)]
struct CustomerLoginClaims<'a> {
    iss: &'a str,
    iat: i64,
    jti: String,
    operation: &'static str,
    store_hash: &'a str,
    customer_id: i64,
    channel_id: i64,
    redirect_to: String,
}

/// Build a storefront URL that logs `customer_id` in and then lands on
/// `destination` (same host, path and query preserved).
pub(crate) fn customer_login_url(
    login: &CustomerLoginConfig,
    store_hash: &str,
    channel_id: ChannelId,
    customer_id: CustomerId,
    destination: &str,
) -> Result<String, BigCommerceError> {
    let destination = Url::parse(destination)
        .map_err(|e| BigCommerceError::Parse(format!("Invalid redirect URL {destination}: {e}")))?;

    let redirect_to = match destination.query() {
        Some(query) => format!("{}?{query}", destination.path()),
        None => destination.path().to_string(),
    };

    let claims = CustomerLoginClaims {
        iss: &login.client_id,
        iat: chrono::Utc::now().timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
        operation: "customer_login",
        store_hash,
        customer_id: customer_id.as_i64(),
        channel_id: channel_id.as_i64(),
        redirect_to,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(login.client_secret.expose_secret().as_bytes()),
    )?;

    Ok(format!("{}/login/token/{token}", destination.origin().ascii_serialization()))
}
