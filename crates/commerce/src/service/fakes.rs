//! Recording fakes for facade tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use carebridge_core::{CartId, ConsignmentId, CustomerId, Email, LineItemId, OrderId, ProfileId};
use rust_decimal::Decimal;
use serde_json::{Map, json};

use super::CommerceService;
use crate::bigcommerce::{BigCommerceError, CartApi, CustomerApi, OrderApi};
use crate::profile::{MemoryProfileStore, ProfileStore, ProfileStoreError};
use crate::types::{
    Cart, CartItems, CartType, Checkout, Coupon, Customer, LineItem, LineItems, Order,
    OrderAddress, OrderProduct, Profile, RedirectUrls, Shipment, ShippingAddress,
};

/// A BigCommerce call as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetCustomerByEmail(String),
    CreateCustomer(ProfileId),
    GetCart(CartId),
    CreateCart(CustomerId),
    AddItems(CartId, CartItems),
    DeleteItem(CartId, LineItemId),
    RedirectUrls(CartId),
    LoggedInRedirectUrls(CartId, CustomerId),
    AddShippingAddress(CartId),
    CreateConsignment(CartId),
    SetShippingCost(CartId, ConsignmentId, Decimal),
    GetFreeShippingCoupon,
    AddCoupon(CartId, String),
    RemoveCoupon(CartId, String),
    GetOrders(CustomerId),
    GetOrder(OrderId),
    GetOrderAddresses(OrderId),
    GetOrderShipments(OrderId),
    GetOrderProducts(OrderId),
}

/// In-memory BigCommerce that records every call.
#[derive(Debug, Default)]
pub struct FakeBigCommerce {
    calls: Mutex<Vec<Call>>,
    customers: Mutex<Vec<Customer>>,
    carts: Mutex<HashMap<CartId, Cart>>,
    orders: Mutex<HashMap<CustomerId, Vec<Order>>>,
    free_shipping_coupon: Mutex<Option<Coupon>>,
    next_customer: AtomicI64,
    next_cart: AtomicI64,
    next_item: AtomicI64,
    fail_add_items: AtomicBool,
}

impl FakeBigCommerce {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn add_customer(&self, id: CustomerId, email: &str) {
        self.customers.lock().unwrap().push(Customer {
            id,
            email: Some(email.to_string()),
            first_name: None,
            last_name: None,
            extra: Map::new(),
        });
    }

    pub fn add_orders(&self, customer_id: CustomerId, orders: Vec<Order>) {
        self.orders.lock().unwrap().insert(customer_id, orders);
    }

    pub fn set_free_shipping_coupon(&self, coupon: Coupon) {
        *self.free_shipping_coupon.lock().unwrap() = Some(coupon);
    }

    pub fn fail_add_items(&self) {
        self.fail_add_items.store(true, Ordering::SeqCst);
    }

    pub fn cart(&self, cart_id: &CartId) -> Option<Cart> {
        self.carts.lock().unwrap().get(cart_id).cloned()
    }

    /// Create an empty cart without recording a call.
    pub fn seed_cart(&self, customer_id: CustomerId) -> CartId {
        self.new_cart(customer_id).id
    }

    /// Put a line item into a cart without recording a call.
    pub fn seed_item(&self, cart_id: &CartId, item: LineItem) {
        let mut carts = self.carts.lock().unwrap();
        let cart = carts.get_mut(cart_id).unwrap();
        if item.product_id.is_some() {
            cart.line_items.physical_items.push(item);
        } else {
            cart.line_items.custom_items.push(item);
        }
    }

    fn new_cart(&self, customer_id: CustomerId) -> Cart {
        let n = self.next_cart.fetch_add(1, Ordering::SeqCst) + 1;
        let cart = Cart {
            id: CartId::new(format!("cart-{n}")),
            customer_id: Some(customer_id),
            line_items: LineItems::default(),
            extra: Map::new(),
        };
        self.carts
            .lock()
            .unwrap()
            .insert(cart.id.clone(), cart.clone());
        cart
    }

    fn next_item_id(&self) -> LineItemId {
        let n = self.next_item.fetch_add(1, Ordering::SeqCst) + 1;
        LineItemId::new(format!("item-{n}"))
    }
}

/// Build a line item the way BigCommerce would return it.
pub fn line_item(id: &str, product_id: Option<i64>, sku: &str, quantity: u32) -> LineItem {
    LineItem {
        id: id.into(),
        sku: Some(sku.to_string()),
        name: Some(format!("{sku} name")),
        product_id: product_id.map(Into::into),
        variant_id: None,
        list_price: Some(Decimal::new(1250, 2)),
        quantity,
        extra: Map::new(),
    }
}

#[async_trait]
impl CustomerApi for FakeBigCommerce {
    async fn get_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Customer>, BigCommerceError> {
        self.record(Call::GetCustomerByEmail(email.to_string()));
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email.as_deref() == Some(email.as_str()))
            .cloned())
    }

    async fn create_customer(&self, profile: &Profile) -> Result<Customer, BigCommerceError> {
        self.record(Call::CreateCustomer(profile.profile_id.clone()));
        let id = CustomerId::new(self.next_customer.fetch_add(1, Ordering::SeqCst) + 1);
        self.add_customer(id, profile.email.as_str());
        Ok(Customer {
            id,
            email: Some(profile.email.to_string()),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            extra: Map::new(),
        })
    }
}

#[async_trait]
impl CartApi for FakeBigCommerce {
    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, BigCommerceError> {
        self.record(Call::GetCart(cart_id.clone()));
        Ok(self.cart(cart_id))
    }

    async fn create_cart(&self, customer_id: CustomerId) -> Result<Cart, BigCommerceError> {
        self.record(Call::CreateCart(customer_id));
        Ok(self.new_cart(customer_id))
    }

    async fn add_items_to_cart(
        &self,
        cart_id: &CartId,
        items: &CartItems,
    ) -> Result<Cart, BigCommerceError> {
        self.record(Call::AddItems(cart_id.clone(), items.clone()));
        if self.fail_add_items.load(Ordering::SeqCst) {
            return Err(BigCommerceError::Api {
                status: 422,
                message: "Product is out of stock".to_string(),
            });
        }

        let mut added = Vec::new();
        for otc in &items.otc_items {
            added.push(LineItem {
                id: self.next_item_id(),
                sku: None,
                name: None,
                product_id: Some(otc.product_id),
                variant_id: otc.variant_id,
                list_price: otc.list_price,
                quantity: otc.quantity,
                extra: Map::new(),
            });
        }
        for rx in &items.prescription_items {
            added.push(LineItem {
                id: self.next_item_id(),
                sku: rx.sku.clone(),
                name: rx.name.clone(),
                product_id: None,
                variant_id: None,
                list_price: rx.list_price,
                quantity: rx.quantity,
                extra: Map::new(),
            });
        }
        for item in added {
            self.seed_item(cart_id, item);
        }

        self.cart(cart_id)
            .ok_or_else(|| BigCommerceError::NotFound(cart_id.to_string()))
    }

    async fn delete_item_from_cart(
        &self,
        cart_id: &CartId,
        item_id: &LineItemId,
    ) -> Result<(), BigCommerceError> {
        self.record(Call::DeleteItem(cart_id.clone(), item_id.clone()));
        let mut carts = self.carts.lock().unwrap();
        let cart = carts
            .get_mut(cart_id)
            .ok_or_else(|| BigCommerceError::NotFound(cart_id.to_string()))?;
        if cart.find_item_by_id(item_id).is_none() {
            return Err(BigCommerceError::NotFound(item_id.to_string()));
        }
        cart.line_items.custom_items.retain(|i| &i.id != item_id);
        cart.line_items.physical_items.retain(|i| &i.id != item_id);

        // BigCommerce discards a cart once its last item is removed.
        if cart.items().next().is_none() {
            carts.remove(cart_id);
        }
        Ok(())
    }

    async fn create_cart_redirect_urls(
        &self,
        cart_id: &CartId,
    ) -> Result<RedirectUrls, BigCommerceError> {
        self.record(Call::RedirectUrls(cart_id.clone()));
        Ok(RedirectUrls {
            cart_url: format!("https://shop.example.com/cart.php?id={cart_id}"),
            checkout_url: format!("https://shop.example.com/checkout?id={cart_id}"),
            embedded_checkout_url: None,
        })
    }

    async fn create_logged_in_cart_redirect_urls(
        &self,
        cart_id: &CartId,
        customer_id: CustomerId,
    ) -> Result<RedirectUrls, BigCommerceError> {
        self.record(Call::LoggedInRedirectUrls(cart_id.clone(), customer_id));
        Ok(RedirectUrls {
            cart_url: format!("https://shop.example.com/cart.php?id={cart_id}"),
            checkout_url: format!("https://shop.example.com/login/token/{customer_id}"),
            embedded_checkout_url: None,
        })
    }

    async fn add_shipping_address(
        &self,
        cart: &Cart,
        address: &ShippingAddress,
    ) -> Result<Checkout, BigCommerceError> {
        self.record(Call::AddShippingAddress(cart.id.clone()));
        Ok(json!({ "id": cart.id, "billing_address": address }))
    }

    async fn create_consignment(
        &self,
        cart: &Cart,
        _address: &ShippingAddress,
    ) -> Result<Checkout, BigCommerceError> {
        self.record(Call::CreateConsignment(cart.id.clone()));
        Ok(json!({ "id": cart.id, "consignments": [ { "id": "con-1" } ] }))
    }

    async fn set_shipping_cost(
        &self,
        cart: &Cart,
        consignment_id: &ConsignmentId,
        shipping_cost_total: Decimal,
    ) -> Result<Checkout, BigCommerceError> {
        self.record(Call::SetShippingCost(
            cart.id.clone(),
            consignment_id.clone(),
            shipping_cost_total,
        ));
        Ok(json!({ "id": cart.id, "shipping_cost_total": shipping_cost_total.to_string() }))
    }

    async fn get_free_shipping_coupon(&self) -> Result<Option<Coupon>, BigCommerceError> {
        self.record(Call::GetFreeShippingCoupon);
        Ok(self.free_shipping_coupon.lock().unwrap().clone())
    }

    async fn add_coupon(&self, cart: &Cart, code: &str) -> Result<Checkout, BigCommerceError> {
        self.record(Call::AddCoupon(cart.id.clone(), code.to_string()));
        Ok(json!({ "id": cart.id, "coupons": [ { "code": code } ] }))
    }

    async fn remove_coupon(&self, cart: &Cart, code: &str) -> Result<Checkout, BigCommerceError> {
        self.record(Call::RemoveCoupon(cart.id.clone(), code.to_string()));
        Ok(json!({ "id": cart.id, "coupons": [] }))
    }
}

#[async_trait]
impl OrderApi for FakeBigCommerce {
    async fn get_orders(&self, customer_id: CustomerId) -> Result<Vec<Order>, BigCommerceError> {
        self.record(Call::GetOrders(customer_id));
        Ok(self
            .orders
            .lock()
            .unwrap()
            .get(&customer_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_order_by_id(&self, order_id: OrderId) -> Result<Order, BigCommerceError> {
        self.record(Call::GetOrder(order_id));
        Ok(json!({ "id": order_id.as_i64() }))
    }

    async fn get_order_addresses(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderAddress>, BigCommerceError> {
        self.record(Call::GetOrderAddresses(order_id));
        Ok(vec![json!({ "order_id": order_id.as_i64() })])
    }

    async fn get_order_shipments(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Shipment>, BigCommerceError> {
        self.record(Call::GetOrderShipments(order_id));
        Ok(Vec::new())
    }

    async fn get_order_products(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderProduct>, BigCommerceError> {
        self.record(Call::GetOrderProducts(order_id));
        Ok(vec![json!({ "order_id": order_id.as_i64() })])
    }
}

/// A profile store patch as seen by [`RecordingProfileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    SetCustomerId(ProfileId, CustomerId),
    SetCartId(ProfileId, CartId, CartType),
}

/// [`MemoryProfileStore`] that also records every patch.
#[derive(Debug, Default)]
pub struct RecordingProfileStore {
    inner: MemoryProfileStore,
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingProfileStore {
    pub async fn insert(&self, profile: Profile) {
        self.inner.insert(profile).await;
    }

    pub async fn get(&self, profile_id: &ProfileId) -> Option<Profile> {
        self.inner.get_caregiver_profile(profile_id).await.unwrap()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileStore for RecordingProfileStore {
    async fn get_caregiver_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<Profile>, ProfileStoreError> {
        self.inner.get_caregiver_profile(profile_id).await
    }

    async fn set_customer_id(
        &self,
        profile_id: &ProfileId,
        customer_id: CustomerId,
    ) -> Result<(), ProfileStoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::SetCustomerId(profile_id.clone(), customer_id));
        self.inner.set_customer_id(profile_id, customer_id).await
    }

    async fn set_cart_id(
        &self,
        profile_id: &ProfileId,
        cart_id: &CartId,
        cart_type: CartType,
    ) -> Result<(), ProfileStoreError> {
        self.calls.lock().unwrap().push(StoreCall::SetCartId(
            profile_id.clone(),
            cart_id.clone(),
            cart_type,
        ));
        self.inner.set_cart_id(profile_id, cart_id, cart_type).await
    }
}

/// A facade wired to fakes, with handles on the fakes for assertions.
#[derive(Debug, Default)]
pub struct TestHarness {
    pub profiles: Arc<RecordingProfileStore>,
    pub bigcommerce: Arc<FakeBigCommerce>,
}

impl TestHarness {
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            profiles: Arc::new(RecordingProfileStore {
                inner: MemoryProfileStore::with_profiles(profiles),
                calls: Mutex::default(),
            }),
            bigcommerce: Arc::default(),
        }
    }

    pub fn service(&self) -> CommerceService {
        CommerceService::new(
            self.profiles.clone(),
            self.bigcommerce.clone(),
            self.bigcommerce.clone(),
            self.bigcommerce.clone(),
        )
    }
}
