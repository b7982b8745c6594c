//! Integration tests for Carebridge.
//!
//! Each test drives the public client and facade APIs against a `mockito`
//! server standing in for BigCommerce or the pharmacist API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p carebridge-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `commerce_flows` - profile bootstrap, cart moves and checkout against BigCommerce
//! - `pharmacist_flows` - session policy and patient workflows against the pharmacist API

use std::sync::Arc;
use std::time::Duration;

use carebridge_commerce::types::Profile;
use carebridge_commerce::{BigCommerceClient, BigCommerceConfig, CommerceService, MemoryProfileStore};
use carebridge_core::{Email, ProfileId};
use carebridge_pharmacist::{
    MemorySessionStore, PharmacistClient, PharmacistConfig, StaticAuthenticator,
};
use secrecy::SecretString;
use url::Url;

/// Store hash used for every mocked BigCommerce path.
pub const STORE_HASH: &str = "it-store";

/// Username of the pharmacist signed in by [`pharmacist`].
pub const PHARMACIST_USERNAME: &str = "rx-integration";

/// Path prefix of every mocked BigCommerce endpoint.
#[must_use]
pub fn store_path(path: &str) -> String {
    format!("/stores/{STORE_HASH}{path}")
}

/// BigCommerce client pointed at `server`.
///
/// # Panics
///
/// Panics if the mock server URL cannot be parsed.
#[must_use]
pub fn bigcommerce(server: &mockito::ServerGuard) -> BigCommerceClient {
    let config = BigCommerceConfig::new(STORE_HASH, SecretString::from("it-token"))
        .with_api_url(Url::parse(&server.url()).expect("mock server URL"));
    BigCommerceClient::new(&config).expect("BigCommerce client")
}

/// Commerce facade over a BigCommerce mock and the given profiles.
#[must_use]
pub fn commerce(
    server: &mockito::ServerGuard,
    profiles: impl IntoIterator<Item = Profile>,
) -> (CommerceService, Arc<MemoryProfileStore>) {
    let store = Arc::new(MemoryProfileStore::with_profiles(profiles));
    let service = CommerceService::with_bigcommerce(store.clone(), bigcommerce(server));
    (service, store)
}

/// A caregiver profile with no BigCommerce linkage.
///
/// # Panics
///
/// Panics if `email` is not a valid address.
#[must_use]
pub fn caregiver(profile_id: &str, email: &str) -> Profile {
    Profile::new(
        ProfileId::from(profile_id),
        Email::parse(email).expect("valid email"),
    )
}

/// Pharmacist client, authenticator and session store for `server`.
pub struct PharmacistHarness {
    pub client: PharmacistClient,
    pub auth: Arc<StaticAuthenticator>,
    pub sessions: Arc<MemorySessionStore>,
}

/// Pharmacist client pointed at `server` whose session has not started.
///
/// # Panics
///
/// Panics if the mock server URL cannot be parsed.
#[must_use]
pub fn pharmacist(server: &mockito::ServerGuard, session_ttl: Duration) -> PharmacistHarness {
    let auth = Arc::new(StaticAuthenticator::new(
        Some(PHARMACIST_USERNAME.to_string()),
        SecretString::from("it-access"),
        SecretString::from("it-id"),
    ));
    let sessions = Arc::new(MemorySessionStore::new());
    let config = PharmacistConfig::new(Url::parse(&server.url()).expect("mock server URL"))
        .with_session_ttl(session_ttl);
    let client = PharmacistClient::new(&config, auth.clone(), sessions.clone())
        .expect("pharmacist client");

    PharmacistHarness {
        client,
        auth,
        sessions,
    }
}
