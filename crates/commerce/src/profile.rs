//! Caregiver profile store seam.
//!
//! Profiles live in another service; this crate only reads them and patches
//! the BigCommerce linkage fields. [`MemoryProfileStore`] is the reference
//! implementation used by tests and the CLI.

use std::collections::HashMap;

use async_trait::async_trait;
use carebridge_core::{CartId, CustomerId, ProfileId};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::{CartType, Profile};

/// Errors surfaced by a profile store backend.
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    /// The backend could not be reached or rejected the request.
    #[error("profile store unavailable: {0}")]
    Unavailable(String),

    /// A patch targeted a profile the backend does not know.
    #[error("profile {0} does not exist")]
    UnknownProfile(ProfileId),
}

/// Read and patch access to caregiver profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the full profile, or `None` if it does not exist.
    async fn get_caregiver_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<Profile>, ProfileStoreError>;

    /// Link the profile to a BigCommerce customer.
    async fn set_customer_id(
        &self,
        profile_id: &ProfileId,
        customer_id: CustomerId,
    ) -> Result<(), ProfileStoreError>;

    /// Store a cart ID in the slot selected by `cart_type`.
    async fn set_cart_id(
        &self,
        profile_id: &ProfileId,
        cart_id: &CartId,
        cart_type: CartType,
    ) -> Result<(), ProfileStoreError>;
}

/// In-process profile store.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<ProfileId, Profile>>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with profiles.
    #[must_use]
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            profiles: RwLock::new(
                profiles
                    .into_iter()
                    .map(|p| (p.profile_id.clone(), p))
                    .collect(),
            ),
        }
    }

    /// Insert or replace a profile.
    pub async fn insert(&self, profile: Profile) {
        self.profiles
            .write()
            .await
            .insert(profile.profile_id.clone(), profile);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_caregiver_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<Profile>, ProfileStoreError> {
        Ok(self.profiles.read().await.get(profile_id).cloned())
    }

    async fn set_customer_id(
        &self,
        profile_id: &ProfileId,
        customer_id: CustomerId,
    ) -> Result<(), ProfileStoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(profile_id)
            .ok_or_else(|| ProfileStoreError::UnknownProfile(profile_id.clone()))?;
        profile.big_commerce_customer_id = Some(customer_id);
        Ok(())
    }

    async fn set_cart_id(
        &self,
        profile_id: &ProfileId,
        cart_id: &CartId,
        cart_type: CartType,
    ) -> Result<(), ProfileStoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(profile_id)
            .ok_or_else(|| ProfileStoreError::UnknownProfile(profile_id.clone()))?;
        profile.set_cart_id(cart_type, cart_id.clone());
        Ok(())
    }
}
