//! Session guard for pharmacist API calls.
//!
//! Every operation on [`PharmacistClient`](crate::PharmacistClient) runs
//! through [`AuthGuard::run`]:
//!
//! - The logged-in user's stored login timestamp must exist and be younger
//!   than the session TTL. Otherwise the user is signed out (stored
//!   timestamp and MFA-confirmed marker cleared, identity provider signed
//!   out, redirected to login) and the call is never made.
//! - If the call fails with a 401, the stored timestamp is cleared and the
//!   user is signed out and redirected.
//! - Any other outcome is returned unchanged.
//!
//! Sign-outs surface as [`PharmacistError::SignedOut`].

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::{AuthError, PharmacistError, SignOutReason};

/// Identity provider for the signed-in pharmacist.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Username of the signed-in user, if any.
    async fn logged_in_username(&self) -> Result<Option<String>, AuthError>;

    /// Current access token, sent as `jwtaccesstoken`.
    async fn access_token(&self) -> Result<SecretString, AuthError>;

    /// Current ID token, sent as `jwtidtoken`.
    async fn id_token(&self) -> Result<SecretString, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Send the user to the login screen.
    async fn redirect_to_login(&self, login_path: &str);
}

/// Per-user session markers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn login_time(&self, username: &str) -> Option<DateTime<Utc>>;

    async fn set_login_time(&self, username: &str, at: DateTime<Utc>);

    async fn remove_login_time(&self, username: &str);

    /// Forget that the user completed MFA.
    async fn remove_mfa_confirmed(&self, username: &str);
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    login_times: RwLock<HashMap<String, DateTime<Utc>>>,
    mfa_confirmed: RwLock<HashSet<String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn confirm_mfa(&self, username: &str) {
        self.mfa_confirmed.write().await.insert(username.to_string());
    }

    pub async fn is_mfa_confirmed(&self, username: &str) -> bool {
        self.mfa_confirmed.read().await.contains(username)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn login_time(&self, username: &str) -> Option<DateTime<Utc>> {
        self.login_times.read().await.get(username).copied()
    }

    async fn set_login_time(&self, username: &str, at: DateTime<Utc>) {
        self.login_times
            .write()
            .await
            .insert(username.to_string(), at);
    }

    async fn remove_login_time(&self, username: &str) {
        self.login_times.write().await.remove(username);
    }

    async fn remove_mfa_confirmed(&self, username: &str) {
        self.mfa_confirmed.write().await.remove(username);
    }
}

/// Authenticator holding fixed tokens, for tooling and tests.
///
/// Sign-out and redirects are only recorded.
#[derive(Debug)]
pub struct StaticAuthenticator {
    username: Option<String>,
    access_token: SecretString,
    id_token: SecretString,
    signed_out: AtomicBool,
    redirects: Mutex<Vec<String>>,
}

impl StaticAuthenticator {
    #[must_use]
    pub fn new(
        username: Option<String>,
        access_token: SecretString,
        id_token: SecretString,
    ) -> Self {
        Self {
            username,
            access_token,
            id_token,
            signed_out: AtomicBool::new(false),
            redirects: Mutex::default(),
        }
    }

    #[must_use]
    pub fn was_signed_out(&self) -> bool {
        self.signed_out.load(Ordering::SeqCst)
    }

    /// Login paths the user was sent to, oldest first.
    pub async fn redirects(&self) -> Vec<String> {
        self.redirects.lock().await.clone()
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn logged_in_username(&self) -> Result<Option<String>, AuthError> {
        Ok(self.username.clone())
    }

    async fn access_token(&self) -> Result<SecretString, AuthError> {
        Ok(self.access_token.clone())
    }

    async fn id_token(&self) -> Result<SecretString, AuthError> {
        Ok(self.id_token.clone())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.signed_out.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn redirect_to_login(&self, login_path: &str) {
        self.redirects.lock().await.push(login_path.to_string());
    }
}

/// Applies the session policy around each API call.
#[derive(Clone)]
pub struct AuthGuard {
    authenticator: Arc<dyn Authenticator>,
    sessions: Arc<dyn SessionStore>,
    ttl: TimeDelta,
    login_path: String,
}

impl AuthGuard {
    #[must_use]
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        sessions: Arc<dyn SessionStore>,
        ttl: Duration,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            authenticator,
            sessions,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            login_path: login_path.into(),
        }
    }

    pub(crate) fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    /// Start the session clock for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::Auth` if the identity provider fails, or
    /// `PharmacistError::SignedOut` if nobody is signed in.
    pub async fn record_login(&self) -> Result<(), PharmacistError> {
        let username = self
            .authenticator
            .logged_in_username()
            .await?
            .ok_or(PharmacistError::SignedOut(SignOutReason::SessionExpired))?;
        self.sessions.set_login_time(&username, Utc::now()).await;
        debug!(username = %username, "Recorded pharmacist login");
        Ok(())
    }

    /// Run `call` if the session is fresh, signing the user out when it is
    /// not or when the call is rejected with a 401.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` when the session ended, otherwise
    /// whatever `call` returned.
    pub async fn run<T, F, Fut>(&self, call: F) -> Result<T, PharmacistError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, PharmacistError>> + Send,
    {
        let username = self.authenticator.logged_in_username().await?;

        if !self.is_fresh(username.as_deref()).await {
            warn!(username = ?username, "Pharmacist session expired, signing out");
            if let Some(username) = username.as_deref() {
                self.sessions.remove_login_time(username).await;
                self.sessions.remove_mfa_confirmed(username).await;
            }
            self.sign_out().await?;
            return Err(PharmacistError::SignedOut(SignOutReason::SessionExpired));
        }

        match call().await {
            Err(PharmacistError::Unauthorized) => {
                warn!(username = ?username, "Pharmacist API rejected credentials, signing out");
                if let Some(username) = username.as_deref() {
                    self.sessions.remove_login_time(username).await;
                }
                self.sign_out().await?;
                Err(PharmacistError::SignedOut(SignOutReason::Unauthorized))
            }
            other => other,
        }
    }

    async fn is_fresh(&self, username: Option<&str>) -> bool {
        let Some(username) = username else {
            return false;
        };
        match self.sessions.login_time(username).await {
            Some(logged_in_at) => Utc::now() - logged_in_at < self.ttl,
            None => false,
        }
    }

    async fn sign_out(&self) -> Result<(), PharmacistError> {
        self.authenticator.sign_out().await?;
        self.authenticator.redirect_to_login(&self.login_path).await;
        Ok(())
    }
}

impl std::fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGuard")
            .field("ttl", &self.ttl)
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}
