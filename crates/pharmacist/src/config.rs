//! Pharmacist API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PHARMACIST_API_ROOT` - Base URL of the pharmacist API (e.g., `https://api.example.com/v1/`)
//!
//! ## Optional
//! - `PHARMACIST_SESSION_TTL_SECS` - How long a login stays valid (default: 43200, 12 hours)
//! - `PHARMACIST_LOGIN_PATH` - Screen to send signed-out users to (default: `/login`)
//! - `PHARMACIST_TIMEOUT_SECS` - Request timeout (default: 30)

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_SESSION_TTL_SECS: u64 = 12 * 60 * 60;
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Pharmacist API configuration.
#[derive(Debug, Clone)]
pub struct PharmacistConfig {
    /// Base URL every request path is joined onto
    pub api_root: Url,
    /// Maximum age of a login before calls are refused
    pub session_ttl: Duration,
    /// Where signed-out users are redirected
    pub login_path: String,
    /// Fixed per-request timeout
    pub timeout: Duration,
}

impl PharmacistConfig {
    /// Configuration with default TTL, login path and timeout.
    ///
    /// A trailing slash is added to `api_root` so relative paths join under it.
    #[must_use]
    pub fn new(mut api_root: Url) -> Self {
        if !api_root.path().ends_with('/') {
            let path = format!("{}/", api_root.path());
            api_root.set_path(&path);
        }
        Self {
            api_root,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
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

        let api_root = Url::parse(&get_required_env("PHARMACIST_API_ROOT")?).map_err(|e| {
            ConfigError::InvalidEnvVar("PHARMACIST_API_ROOT".to_string(), e.to_string())
        })?;
        let session_ttl = parse_secs("PHARMACIST_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        let timeout = parse_secs("PHARMACIST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let login_path = get_env_or_default("PHARMACIST_LOGIN_PATH", DEFAULT_LOGIN_PATH);

        Ok(Self {
            timeout,
            ..Self::new(api_root)
                .with_session_ttl(session_ttl)
                .with_login_path(login_path)
        })
    }
}

fn parse_secs(key: &str, default: u64) -> Result<Duration, ConfigError> {
    get_env_or_default(key, &default.to_string())
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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
