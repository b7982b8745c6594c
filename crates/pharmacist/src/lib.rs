//! Carebridge Pharmacist - client for the internal pharmacist API.
//!
//! Wraps the pharmacist, order, prescription, reminder, document and
//! health-record endpoints. Every call sends the signed-in user's tokens and
//! runs under a session guard that signs the user out when the login is stale
//! or the API answers 401.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use carebridge_pharmacist::{MemorySessionStore, PharmacistClient, PharmacistConfig};
//!
//! let config = PharmacistConfig::from_env()?;
//! let client = PharmacistClient::new(&config, authenticator, Arc::new(MemorySessionStore::new()))?;
//! client.guard().record_login().await?;
//!
//! let me = client.get_pharmacist().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod client;
pub mod config;
pub mod documents;
pub mod error;
pub mod health;
pub mod types;
mod upload;

pub use auth::{AuthGuard, Authenticator, MemorySessionStore, SessionStore, StaticAuthenticator};
pub use client::PharmacistClient;
pub use config::{ConfigError, PharmacistConfig};
pub use documents::{DocumentSide, DocumentType, PatientDocument};
pub use error::{AuthError, DEFAULT_SERVER_ERR_MSG, PharmacistError, SignOutReason};
pub use health::HealthRecord;
pub use types::{ApiResponse, PharmacistUpdate};
