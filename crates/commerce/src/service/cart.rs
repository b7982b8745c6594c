//! Cart operations of the commerce facade.

use carebridge_core::{CartId, ConsignmentId, LineItemId, ProfileId};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use super::CommerceService;
use crate::error::CommerceError;
use crate::types::{
    Cart, CartItems, CartLineItem, CartMove, CartType, Checkout, Coupon, LabeledCartMove,
    LineItem, RedirectUrls, ShippingAddress,
};

/// First item in the cart with the given ID, custom items searched first.
#[must_use]
pub fn find_item_in_cart_by_id<'a>(cart: &'a Cart, item_id: &LineItemId) -> Option<&'a LineItem> {
    cart.find_item_by_id(item_id)
}

/// First item in the cart with the given SKU, custom items searched first.
#[must_use]
pub fn find_item_in_cart_by_sku<'a>(cart: &'a Cart, sku: &str) -> Option<&'a LineItem> {
    cart.find_item_by_sku(sku)
}

impl CommerceService {
    // =========================================================================
    // Retrieval
    // =========================================================================

    /// Get the profile's cart of the given type, bootstrapping the customer,
    /// the main cart and (for [`CartType::PayLater`]) the pay-later cart.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::ProfileNotFound` if the profile does not exist,
    /// or the upstream error of any failing BigCommerce or profile store call.
    #[instrument(skip(self), fields(profile_id = %profile_id, cart_type = %cart_type))]
    pub async fn get_or_create_cart_by_profile_id(
        &self,
        profile_id: &ProfileId,
        cart_type: CartType,
    ) -> Result<Cart, CommerceError> {
        let profile = self.load_profile(profile_id).await?;
        let bootstrap = self.bootstrap(&profile).await?;

        match cart_type {
            CartType::Main => Ok(bootstrap.main_cart),
            CartType::PayLater => Ok(self
                .get_or_create_cart_and_update_profile(
                    &profile,
                    bootstrap.customer_id,
                    CartType::PayLater,
                )
                .await?
                .cart),
        }
    }

    /// [`get_or_create_cart_by_profile_id`](Self::get_or_create_cart_by_profile_id)
    /// for the main cart.
    ///
    /// # Errors
    ///
    /// See [`get_or_create_cart_by_profile_id`](Self::get_or_create_cart_by_profile_id).
    pub async fn get_or_create_main_cart(&self, profile_id: &ProfileId) -> Result<Cart, CommerceError> {
        self.get_or_create_cart_by_profile_id(profile_id, CartType::Main)
            .await
    }

    /// [`get_or_create_cart_by_profile_id`](Self::get_or_create_cart_by_profile_id)
    /// for the pay-later cart.
    ///
    /// # Errors
    ///
    /// See [`get_or_create_cart_by_profile_id`](Self::get_or_create_cart_by_profile_id).
    pub async fn get_or_create_pay_later_cart(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Cart, CommerceError> {
        self.get_or_create_cart_by_profile_id(profile_id, CartType::PayLater)
            .await
    }

    // =========================================================================
    // Item mutation
    // =========================================================================

    /// Add OTC and prescription items to a cart.
    ///
    /// # Errors
    ///
    /// Returns the BigCommerce error if the add fails.
    pub async fn add_items_to_cart(
        &self,
        cart_id: &CartId,
        items: &CartItems,
    ) -> Result<Cart, CommerceError> {
        Ok(self.carts.add_items_to_cart(cart_id, items).await?)
    }

    /// Delete line items and return the cart as BigCommerce now has it.
    ///
    /// Several IDs are deleted concurrently; the first failure aborts the
    /// batch and leaves it unknown which deletes went through. Returns `None`
    /// when the cart no longer exists afterwards (BigCommerce drops a cart
    /// once its last item is gone).
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::InvalidArgument` if `item_ids` is empty, or
    /// the BigCommerce error of the first failing call.
    #[instrument(skip(self, item_ids), fields(cart_id = %cart_id, items = item_ids.len()))]
    pub async fn delete_items_from_cart(
        &self,
        cart_id: &CartId,
        item_ids: &[LineItemId],
    ) -> Result<Option<Cart>, CommerceError> {
        match item_ids {
            [] => {
                return Err(CommerceError::InvalidArgument(
                    "item_ids must name at least one item".to_string(),
                ));
            }
            [item_id] => self.carts.delete_item_from_cart(cart_id, item_id).await?,
            _ => {
                try_join_all(
                    item_ids
                        .iter()
                        .map(|item_id| self.carts.delete_item_from_cart(cart_id, item_id)),
                )
                .await?;
            }
        }

        Ok(self.carts.get_cart(cart_id).await?)
    }

    // =========================================================================
    // Cross-cart moves
    // =========================================================================

    /// Move one item from `source_cart` to `destination_cart`.
    ///
    /// The item is deleted from the source before it is added to the
    /// destination. If the add fails the item is in neither cart.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::ProfileNotFound` if the profile does not exist,
    /// `CommerceError::ItemNotFound` if the item is not in the source cart
    /// (nothing is deleted or added), or the first failing upstream error.
    #[instrument(
        skip(self, source_cart, destination_cart),
        fields(
            profile_id = %profile_id,
            source = %source_cart.id,
            destination = %destination_cart.id,
            item_id = %item_id
        )
    )]
    pub async fn move_item_to_cart(
        &self,
        profile_id: &ProfileId,
        source_cart: &Cart,
        item_id: &LineItemId,
        destination_cart: &Cart,
    ) -> Result<CartMove, CommerceError> {
        self.load_profile(profile_id).await?;

        let item = source_cart
            .find_item_by_id(item_id)
            .map(CartLineItem::classify)
            .ok_or_else(|| CommerceError::ItemNotFound(item_id.clone()))?;

        let source = self
            .delete_items_from_cart(&source_cart.id, std::slice::from_ref(item_id))
            .await?;

        let destination = self
            .add_items_to_cart(&destination_cart.id, &CartItems::from(item))
            .await
            .inspect_err(|e| {
                warn!(
                    error = %e,
                    "Item was removed from the source cart but could not be added to the destination"
                );
            })?;

        debug!("Moved cart item");
        Ok(CartMove {
            source_cart: source,
            destination_cart: destination,
        })
    }

    /// Move an item from the pay-later cart to the main cart.
    ///
    /// # Errors
    ///
    /// See [`move_item_to_cart`](Self::move_item_to_cart).
    pub async fn move_item_to_main_cart(
        &self,
        profile_id: &ProfileId,
        item_id: &LineItemId,
    ) -> Result<LabeledCartMove, CommerceError> {
        self.move_between(profile_id, item_id, CartType::PayLater, CartType::Main)
            .await
    }

    /// Move an item from the main cart to the pay-later cart.
    ///
    /// # Errors
    ///
    /// See [`move_item_to_cart`](Self::move_item_to_cart).
    pub async fn move_item_to_pay_later_cart(
        &self,
        profile_id: &ProfileId,
        item_id: &LineItemId,
    ) -> Result<LabeledCartMove, CommerceError> {
        self.move_between(profile_id, item_id, CartType::Main, CartType::PayLater)
            .await
    }

    async fn move_between(
        &self,
        profile_id: &ProfileId,
        item_id: &LineItemId,
        from: CartType,
        to: CartType,
    ) -> Result<LabeledCartMove, CommerceError> {
        let source_cart = self.get_or_create_cart_by_profile_id(profile_id, from).await?;
        let destination_cart = self.get_or_create_cart_by_profile_id(profile_id, to).await?;

        let carts = self
            .move_item_to_cart(profile_id, &source_cart, item_id, &destination_cart)
            .await?;

        Ok(LabeledCartMove {
            source_cart_location: from,
            destination_cart_location: to,
            carts,
        })
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Anonymous cart and checkout URLs.
    ///
    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn create_cart_redirect_urls(
        &self,
        cart_id: &CartId,
    ) -> Result<RedirectUrls, CommerceError> {
        Ok(self.carts.create_cart_redirect_urls(cart_id).await?)
    }

    /// Checkout URLs that sign the profile's customer in on the way.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::MissingCustomerId` if the profile is missing or
    /// unlinked, or the BigCommerce error if the call fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, profile_id = %profile_id))]
    pub async fn create_logged_in_cart_redirect_urls(
        &self,
        cart_id: &CartId,
        profile_id: &ProfileId,
    ) -> Result<RedirectUrls, CommerceError> {
        let customer_id = self.linked_customer_id(profile_id).await?;
        Ok(self
            .carts
            .create_logged_in_cart_redirect_urls(cart_id, customer_id)
            .await?)
    }

    /// Attach the recipient's address to the cart's checkout.
    ///
    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn add_shipping_address(
        &self,
        cart: &Cart,
        address: &ShippingAddress,
    ) -> Result<Checkout, CommerceError> {
        Ok(self.carts.add_shipping_address(cart, address).await?)
    }

    /// Ship every item of the cart to `address`.
    ///
    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn create_consignment(
        &self,
        cart: &Cart,
        address: &ShippingAddress,
    ) -> Result<Checkout, CommerceError> {
        Ok(self.carts.create_consignment(cart, address).await?)
    }

    /// Set the shipping cost of a consignment.
    ///
    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn set_shipping_cost(
        &self,
        cart: &Cart,
        consignment_id: &ConsignmentId,
        shipping_cost_total: Decimal,
    ) -> Result<Checkout, CommerceError> {
        Ok(self
            .carts
            .set_shipping_cost(cart, consignment_id, shipping_cost_total)
            .await?)
    }

    /// The store's free-shipping coupon, if any.
    ///
    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn get_free_shipping_coupon(&self) -> Result<Option<Coupon>, CommerceError> {
        Ok(self.carts.get_free_shipping_coupon().await?)
    }

    /// Apply the store's free-shipping coupon to the cart, if one exists.
    ///
    /// # Errors
    ///
    /// Returns the BigCommerce error if either call fails.
    pub async fn apply_free_shipping_coupon(
        &self,
        cart: &Cart,
    ) -> Result<Option<Checkout>, CommerceError> {
        let Some(code) = self
            .get_free_shipping_coupon()
            .await?
            .and_then(|coupon| coupon.get("code")?.as_str().map(str::to_string))
        else {
            return Ok(None);
        };

        Ok(Some(self.add_coupon(cart, &code).await?))
    }

    /// Apply a coupon code.
    ///
    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn add_coupon(&self, cart: &Cart, code: &str) -> Result<Checkout, CommerceError> {
        Ok(self.carts.add_coupon(cart, code).await?)
    }

    /// Remove a coupon code.
    ///
    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn remove_coupon(&self, cart: &Cart, code: &str) -> Result<Checkout, CommerceError> {
        Ok(self.carts.remove_coupon(cart, code).await?)
    }
}
