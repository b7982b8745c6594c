//! Subcommand implementations.

pub mod commerce;
pub mod pharmacist;

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Pharmacist configuration error: {0}")]
    PharmacistConfig(#[from] carebridge_pharmacist::ConfigError),

    #[error("BigCommerce configuration error: {0}")]
    CommerceConfig(#[from] carebridge_commerce::ConfigError),

    #[error(transparent)]
    Pharmacist(#[from] carebridge_pharmacist::PharmacistError),

    #[error(transparent)]
    BigCommerce(#[from] carebridge_commerce::BigCommerceError),

    /// The requested record does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Write `value` to stdout as pretty-printed JSON.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
