//! Pharmacist API commands.
//!
//! # Environment Variables
//!
//! - `PHARMACIST_API_ROOT` - Base URL of the pharmacist API
//! - `PHARMACIST_USERNAME` - Signed-in pharmacist
//! - `PHARMACIST_ACCESS_TOKEN` - Access JWT, sent as `jwtaccesstoken`
//! - `PHARMACIST_ID_TOKEN` - ID JWT, sent as `jwtidtoken`

use std::sync::Arc;

use carebridge_core::ProfileId;
use carebridge_pharmacist::{
    MemorySessionStore, PharmacistClient, PharmacistConfig, StaticAuthenticator,
};
use secrecy::SecretString;
use tracing::info;

use super::{CommandError, print_json};

fn required_env(key: &'static str) -> Result<String, CommandError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(CommandError::MissingEnvVar(key))
}

/// Build a client for the pharmacist named in the environment, with the
/// session starting now.
async fn connect() -> Result<PharmacistClient, CommandError> {
    let config = PharmacistConfig::from_env()?;
    let username = required_env("PHARMACIST_USERNAME")?;
    let authenticator = StaticAuthenticator::new(
        Some(username.clone()),
        SecretString::from(required_env("PHARMACIST_ACCESS_TOKEN")?),
        SecretString::from(required_env("PHARMACIST_ID_TOKEN")?),
    );

    let client = PharmacistClient::new(
        &config,
        Arc::new(authenticator),
        Arc::new(MemorySessionStore::new()),
    )?;
    client.guard().record_login().await?;

    info!(username = %username, api_root = %config.api_root, "Connected to pharmacist API");
    Ok(client)
}

/// Print the signed-in pharmacist's profile.
pub async fn me() -> Result<(), CommandError> {
    let client = connect().await?;
    print_json(&client.get_pharmacist().await?)
}

/// Print patients matching `term`.
pub async fn search(term: &str) -> Result<(), CommandError> {
    let client = connect().await?;
    print_json(&client.search_patients(term).await?)
}

/// Print recent orders.
pub async fn orders(count: Option<u32>) -> Result<(), CommandError> {
    let client = connect().await?;
    print_json(&client.get_orders(count).await?)
}

/// Print a patient's health record, or `null` if none is stored.
pub async fn health(profile_id: &str) -> Result<(), CommandError> {
    let client = connect().await?;
    let record = client
        .get_health_record(&ProfileId::from(profile_id))
        .await?;
    print_json(&record)
}
