//! Cart (`/v3/carts`) and checkout (`/v3/checkouts`) endpoints.

use async_trait::async_trait;
use carebridge_core::{CartId, ChannelId, ConsignmentId, CustomerId, LineItemId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use super::login::customer_login_url;
use super::{BigCommerceClient, BigCommerceError, CartApi};
use crate::types::{
    Cart, CartItems, Checkout, Coupon, OtcItem, PrescriptionItem, RedirectUrls, ShippingAddress,
};

#[derive(Debug, Serialize)]
struct NewCart<'a> {
    customer_id: CustomerId,
    channel_id: ChannelId,
    line_items: &'a [OtcItem],
}

/// `POST /v3/carts/{id}/items` body: OTC items are catalog line items,
/// prescription items are custom items.
#[derive(Debug, Serialize)]
struct AddItemsBody<'a> {
    #[serde(skip_serializing_if = "is_empty")]
    line_items: &'a [OtcItem],
    #[serde(skip_serializing_if = "is_empty")]
    custom_items: &'a [PrescriptionItem],
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

#[derive(Debug, Serialize)]
struct ConsignmentLineItem<'a> {
    item_id: &'a LineItemId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct NewConsignment<'a> {
    address: &'a ShippingAddress,
    line_items: Vec<ConsignmentLineItem<'a>>,
}

#[derive(Debug, Serialize)]
struct ConsignmentUpdate {
    #[serde(with = "rust_decimal::serde::float")]
    shipping_cost_total: Decimal,
}

#[derive(Debug, Serialize)]
struct CouponBody<'a> {
    coupon_code: &'a str,
}

#[async_trait]
impl CartApi for BigCommerceClient {
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, BigCommerceError> {
        self.get_v3_optional(self.endpoint_segments(&["v3", "carts", cart_id.as_str()])?)
            .await
    }

    #[instrument(skip(self), fields(customer_id = %customer_id))]
    async fn create_cart(&self, customer_id: CustomerId) -> Result<Cart, BigCommerceError> {
        let body = NewCart {
            customer_id,
            channel_id: self.channel_id(),
            line_items: &[],
        };
        let cart: Cart = self.post_v3(self.endpoint("/v3/carts")?, &body).await?;
        debug!(cart_id = %cart.id, "BigCommerce cart created");
        Ok(cart)
    }

    #[instrument(
        skip(self, items),
        fields(
            cart_id = %cart_id,
            otc = items.otc_items.len(),
            prescription = items.prescription_items.len()
        )
    )]
    async fn add_items_to_cart(
        &self,
        cart_id: &CartId,
        items: &CartItems,
    ) -> Result<Cart, BigCommerceError> {
        let body = AddItemsBody {
            line_items: &items.otc_items,
            custom_items: &items.prescription_items,
        };
        self.post_v3(
            self.endpoint_segments(&["v3", "carts", cart_id.as_str(), "items"])?,
            &body,
        )
        .await
    }

    #[instrument(skip(self), fields(cart_id = %cart_id, item_id = %item_id))]
    async fn delete_item_from_cart(
        &self,
        cart_id: &CartId,
        item_id: &LineItemId,
    ) -> Result<(), BigCommerceError> {
        self.delete(self.endpoint_segments(&[
            "v3",
            "carts",
            cart_id.as_str(),
            "items",
            item_id.as_str(),
        ])?)
        .await
    }

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn create_cart_redirect_urls(
        &self,
        cart_id: &CartId,
    ) -> Result<RedirectUrls, BigCommerceError> {
        self.post_v3(
            self.endpoint_segments(&["v3", "carts", cart_id.as_str(), "redirect_urls"])?,
            &serde_json::json!({}),
        )
        .await
    }

    #[instrument(skip(self), fields(cart_id = %cart_id, customer_id = %customer_id))]
    async fn create_logged_in_cart_redirect_urls(
        &self,
        cart_id: &CartId,
        customer_id: CustomerId,
    ) -> Result<RedirectUrls, BigCommerceError> {
        let login = self.customer_login().ok_or_else(|| {
            BigCommerceError::Config("customer login credentials are not configured".to_string())
        })?;

        let mut urls = self.create_cart_redirect_urls(cart_id).await?;
        urls.checkout_url = customer_login_url(
            login,
            self.store_hash(),
            self.channel_id(),
            customer_id,
            &urls.checkout_url,
        )?;
        Ok(urls)
    }

    #[instrument(skip(self, cart, address), fields(cart_id = %cart.id))]
    async fn add_shipping_address(
        &self,
        cart: &Cart,
        address: &ShippingAddress,
    ) -> Result<Checkout, BigCommerceError> {
        self.post_v3(
            self.endpoint_segments(&["v3", "checkouts", cart.id.as_str(), "billing-address"])?,
            address,
        )
        .await
    }

    #[instrument(skip(self, cart, address), fields(cart_id = %cart.id))]
    async fn create_consignment(
        &self,
        cart: &Cart,
        address: &ShippingAddress,
    ) -> Result<Checkout, BigCommerceError> {
        let body = [NewConsignment {
            address,
            line_items: cart
                .items()
                .map(|item| ConsignmentLineItem {
                    item_id: &item.id,
                    quantity: item.quantity,
                })
                .collect(),
        }];

        let mut url =
            self.endpoint_segments(&["v3", "checkouts", cart.id.as_str(), "consignments"])?;
        url.query_pairs_mut()
            .append_pair("include", "consignments.available_shipping_options");

        self.post_v3(url, &body).await
    }

    #[instrument(
        skip(self, cart),
        fields(cart_id = %cart.id, consignment_id = %consignment_id, total = %shipping_cost_total)
    )]
    async fn set_shipping_cost(
        &self,
        cart: &Cart,
        consignment_id: &ConsignmentId,
        shipping_cost_total: Decimal,
    ) -> Result<Checkout, BigCommerceError> {
        self.put_v3(
            self.endpoint_segments(&[
                "v3",
                "checkouts",
                cart.id.as_str(),
                "consignments",
                consignment_id.as_str(),
            ])?,
            &ConsignmentUpdate {
                shipping_cost_total,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_free_shipping_coupon(&self) -> Result<Option<Coupon>, BigCommerceError> {
        let mut url = self.endpoint("/v2/coupons")?;
        url.query_pairs_mut().append_pair("type", "free_shipping");

        let coupons: Vec<Coupon> = self.get_v2_list(url).await?;
        Ok(coupons.into_iter().next())
    }

    #[instrument(skip(self, cart), fields(cart_id = %cart.id, code = %code))]
    async fn add_coupon(&self, cart: &Cart, code: &str) -> Result<Checkout, BigCommerceError> {
        self.post_v3(
            self.endpoint_segments(&["v3", "checkouts", cart.id.as_str(), "coupons"])?,
            &CouponBody { coupon_code: code },
        )
        .await
    }

    #[instrument(skip(self, cart), fields(cart_id = %cart.id, code = %code))]
    async fn remove_coupon(&self, cart: &Cart, code: &str) -> Result<Checkout, BigCommerceError> {
        self.delete_v3(self.endpoint_segments(&[
            "v3",
            "checkouts",
            cart.id.as_str(),
            "coupons",
            code,
        ])?)
        .await
    }
}
