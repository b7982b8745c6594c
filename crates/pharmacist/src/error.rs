//! Pharmacist client error types.

use thiserror::Error;

/// Message used when the server rejects a request without explaining why.
pub const DEFAULT_SERVER_ERR_MSG: &str = "Something went wrong on our end. Please try again.";

/// Why a call ended the pharmacist's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// No login timestamp, or it is older than the session TTL.
    SessionExpired,
    /// The API answered 401.
    Unauthorized,
}

impl std::fmt::Display for SignOutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionExpired => f.write_str("session expired"),
            Self::Unauthorized => f.write_str("unauthorized"),
        }
    }
}

/// Failure reported by an [`Authenticator`](crate::Authenticator) or
/// [`SessionStore`](crate::SessionStore) backend.
#[derive(Debug, Error)]
#[error("authentication provider error: {0}")]
pub struct AuthError(pub String);

/// Errors that can occur when calling the pharmacist API.
#[derive(Debug, Error)]
pub enum PharmacistError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API answered 401. The auth guard turns this into `SignedOut`.
    #[error("Unauthorized")]
    Unauthorized,

    /// Patient creation collided with an existing account.
    #[error("{0}")]
    Conflict(String),

    /// The session ended; the user has been signed out and redirected.
    #[error("Signed out: {0}")]
    SignedOut(SignOutReason),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The caller passed arguments the operation cannot act on.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Request could not be built.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication provider failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl PharmacistError {
    /// Whether the caller has been signed out by this call.
    #[must_use]
    pub const fn is_signed_out(&self) -> bool {
        matches!(self, Self::SignedOut(_))
    }
}
