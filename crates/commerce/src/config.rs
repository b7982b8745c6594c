//! BigCommerce configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BIGCOMMERCE_STORE_HASH` - Store hash from the API account (e.g., `abc123`)
//! - `BIGCOMMERCE_ACCESS_TOKEN` - API account access token (HIGH PRIVILEGE)
//!
//! ## Optional
//! - `BIGCOMMERCE_API_URL` - API host (default: `https://api.bigcommerce.com`)
//! - `BIGCOMMERCE_CHANNEL_ID` - Storefront channel (default: 1)
//! - `BIGCOMMERCE_TIMEOUT_SECS` - Request timeout (default: 30)
//!
//! ## Optional (customer login - enables logged-in checkout redirects)
//! - `BIGCOMMERCE_CLIENT_ID` - API account client ID
//! - `BIGCOMMERCE_CLIENT_SECRET` - API account client secret

use std::time::Duration;

use carebridge_core::ChannelId;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "https://api.bigcommerce.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// BigCommerce API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct BigCommerceConfig {
    /// Store hash, the `{store_hash}` segment of every API path
    pub store_hash: String,
    /// `X-Auth-Token` value (HIGH PRIVILEGE - full store access)
    pub access_token: SecretString,
    /// API host, without the `/stores/...` suffix
    pub api_url: Url,
    /// Channel carts are created on
    pub channel_id: ChannelId,
    /// Fixed per-request timeout
    pub timeout: Duration,
    /// Customer login credentials (optional)
    pub customer_login: Option<CustomerLoginConfig>,
}

impl std::fmt::Debug for BigCommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigCommerceConfig")
            .field("store_hash", &self.store_hash)
            .field("access_token", &"[REDACTED]")
            .field("api_url", &self.api_url.as_str())
            .field("channel_id", &self.channel_id)
            .field("timeout", &self.timeout)
            .field("customer_login", &self.customer_login)
            .finish()
    }
}

/// Credentials used to sign customer login JWTs.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct CustomerLoginConfig {
    /// API account client ID (JWT `iss`)
    pub client_id: String,
    /// API account client secret (HS256 signing key)
    pub client_secret: SecretString,
}

impl std::fmt::Debug for CustomerLoginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerLoginConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl BigCommerceConfig {
    /// Create a configuration with defaults for everything but the store
    /// credentials.
    ///
    /// # Panics
    ///
    /// Never; the default API URL is a valid constant.
    #[must_use]
    pub fn new(store_hash: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            store_hash: store_hash.into(),
            access_token,
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            channel_id: ChannelId::new(1),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            customer_login: None,
        }
    }

    /// Point the client at a different API host (used by tests).
    #[must_use]
    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }

    /// Enable logged-in checkout redirects.
    #[must_use]
    pub fn with_customer_login(mut self, login: CustomerLoginConfig) -> Self {
        self.customer_login = Some(login);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store_hash = get_required_env("BIGCOMMERCE_STORE_HASH")?;
        let access_token = SecretString::from(get_required_env("BIGCOMMERCE_ACCESS_TOKEN")?);
        let api_url = Url::parse(&get_env_or_default("BIGCOMMERCE_API_URL", DEFAULT_API_URL))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BIGCOMMERCE_API_URL".to_string(), e.to_string())
            })?;
        let channel_id = get_env_or_default("BIGCOMMERCE_CHANNEL_ID", "1")
            .parse::<ChannelId>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BIGCOMMERCE_CHANNEL_ID".to_string(), e.to_string())
            })?;
        let timeout_secs = get_env_or_default(
            "BIGCOMMERCE_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("BIGCOMMERCE_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        let customer_login = CustomerLoginConfig::from_env()?;

        Ok(Self {
            store_hash,
            access_token,
            api_url,
            channel_id,
            timeout: Duration::from_secs(timeout_secs),
            customer_login,
        })
    }
}

impl CustomerLoginConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let client_id = get_optional_env("BIGCOMMERCE_CLIENT_ID");
        let client_secret = get_optional_env("BIGCOMMERCE_CLIENT_SECRET");

        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Ok(Some(Self {
                client_id: id,
                client_secret: SecretString::from(secret),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "BIGCOMMERCE_CLIENT_*".to_string(),
                "Both BIGCOMMERCE_CLIENT_ID and BIGCOMMERCE_CLIENT_SECRET must be set together"
                    .to_string(),
            )),
        }
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
