//! Commerce facade.
//!
//! Ties a caregiver profile to its BigCommerce customer and carts. Every
//! cart operation starts with the bootstrap step: make sure the profile is
//! linked to a customer and owns a main cart, creating and backfilling
//! whatever is missing.
//!
//! The cart and order operations live in [`cart`] and [`order`]; this module
//! holds the service itself and the bootstrap.

pub mod cart;
mod order;

#[cfg(test)]
pub(crate) mod fakes;

use std::sync::Arc;

use carebridge_core::{CustomerId, ProfileId};
use tracing::{debug, instrument};

use crate::bigcommerce::{BigCommerceClient, CartApi, CustomerApi, OrderApi};
use crate::error::CommerceError;
use crate::profile::ProfileStore;
use crate::types::{Cart, CartType, Profile};

/// Commerce facade over a profile store and the BigCommerce resource clients.
#[derive(Clone)]
pub struct CommerceService {
    profiles: Arc<dyn ProfileStore>,
    customers: Arc<dyn CustomerApi>,
    carts: Arc<dyn CartApi>,
    orders: Arc<dyn OrderApi>,
}

/// A cart obtained by the get-or-create step.
#[derive(Debug)]
struct ResolvedCart {
    cart: Cart,
    /// The cart was created and its ID already written to the profile.
    persisted: bool,
}

/// Result of bootstrapping a profile.
#[derive(Debug)]
struct Bootstrap {
    customer_id: CustomerId,
    main_cart: Cart,
}

impl CommerceService {
    /// Create a facade from individual collaborators.
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        customers: Arc<dyn CustomerApi>,
        carts: Arc<dyn CartApi>,
        orders: Arc<dyn OrderApi>,
    ) -> Self {
        Self {
            profiles,
            customers,
            carts,
            orders,
        }
    }

    /// Create a facade backed by one BigCommerce client for all resources.
    #[must_use]
    pub fn with_bigcommerce(profiles: Arc<dyn ProfileStore>, client: BigCommerceClient) -> Self {
        let client = Arc::new(client);
        Self::new(profiles, client.clone(), client.clone(), client)
    }

    /// Load a profile, failing when it does not exist.
    async fn load_profile(&self, profile_id: &ProfileId) -> Result<Profile, CommerceError> {
        self.profiles
            .get_caregiver_profile(profile_id)
            .await?
            .ok_or(CommerceError::ProfileNotFound)
    }

    /// The profile's BigCommerce customer, without bootstrapping.
    async fn linked_customer_id(&self, profile_id: &ProfileId) -> Result<CustomerId, CommerceError> {
        self.profiles
            .get_caregiver_profile(profile_id)
            .await?
            .and_then(|profile| profile.linked_customer_id())
            .ok_or(CommerceError::MissingCustomerId)
    }

    /// Ensure the profile owns a main cart (and a customer), returning the
    /// main cart.
    ///
    /// # Errors
    ///
    /// Returns an error if any BigCommerce or profile store call fails.
    #[instrument(skip(self, profile), fields(profile_id = %profile.profile_id))]
    pub async fn get_or_initialize_ecommerce(
        &self,
        profile: &Profile,
    ) -> Result<Cart, CommerceError> {
        Ok(self.bootstrap(profile).await?.main_cart)
    }

    async fn bootstrap(&self, profile: &Profile) -> Result<Bootstrap, CommerceError> {
        let customer_id = self.resolve_customer_id(profile).await?;
        let resolved = self
            .get_or_create_cart_and_update_profile(profile, customer_id, CartType::Main)
            .await?;

        self.update_profile_if_needed(profile, &resolved, customer_id)
            .await?;

        Ok(Bootstrap {
            customer_id,
            main_cart: resolved.cart,
        })
    }

    /// The profile's customer: linked, found by email, or newly created.
    async fn resolve_customer_id(&self, profile: &Profile) -> Result<CustomerId, CommerceError> {
        if let Some(customer_id) = profile.linked_customer_id() {
            return Ok(customer_id);
        }

        let existing = self
            .customers
            .get_customer_by_email(&profile.email)
            .await?
            .map(|customer| customer.id)
            .filter(|id| id.as_i64() > 0);
        if let Some(customer_id) = existing {
            debug!(customer_id = %customer_id, "Found BigCommerce customer by email");
            return Ok(customer_id);
        }

        let customer = self.customers.create_customer(profile).await?;
        Ok(customer.id)
    }

    /// Fetch the cart stored in `cart_type`'s slot, or create one for
    /// `customer_id` and store its ID in that slot.
    async fn get_or_create_cart_and_update_profile(
        &self,
        profile: &Profile,
        customer_id: CustomerId,
        cart_type: CartType,
    ) -> Result<ResolvedCart, CommerceError> {
        if let Some(cart_id) = profile.cart_id(cart_type) {
            if let Some(cart) = self.carts.get_cart(cart_id).await? {
                return Ok(ResolvedCart {
                    cart,
                    persisted: false,
                });
            }
            debug!(cart_id = %cart_id, cart_type = %cart_type, "Stored cart no longer exists");
        }

        let cart = self.carts.create_cart(customer_id).await?;
        self.profiles
            .set_cart_id(&profile.profile_id, &cart.id, cart_type)
            .await?;
        debug!(cart_id = %cart.id, cart_type = %cart_type, "Created cart for profile");

        Ok(ResolvedCart {
            cart,
            persisted: true,
        })
    }

    /// Write back linkage the profile was missing before bootstrap.
    async fn update_profile_if_needed(
        &self,
        profile: &Profile,
        resolved: &ResolvedCart,
        customer_id: CustomerId,
    ) -> Result<(), CommerceError> {
        if profile.linked_customer_id().is_none() {
            self.profiles
                .set_customer_id(&profile.profile_id, customer_id)
                .await?;
        }

        let stored = profile.cart_id(CartType::Main);
        if stored.is_none() && !resolved.persisted && stored != Some(&resolved.cart.id) {
            self.profiles
                .set_cart_id(&profile.profile_id, &resolved.cart.id, CartType::Main)
                .await?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for CommerceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceService").finish_non_exhaustive()
    }
}
