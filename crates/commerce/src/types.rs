//! Domain types shared by the BigCommerce client and the commerce facade.
//!
//! Carts and line items are modelled just deeply enough for the facade to
//! find, classify and move items; everything else BigCommerce returns rides
//! along in `extra` so callers see the full upstream document. Orders,
//! addresses, shipments and products are pure pass-through JSON.

use carebridge_core::{CartId, CustomerId, Email, LineItemId, ProductId, ProfileId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upstream order document, returned untouched.
pub type Order = Value;
/// Upstream order shipping address document.
pub type OrderAddress = Value;
/// Upstream order shipment document.
pub type Shipment = Value;
/// Upstream order product document.
pub type OrderProduct = Value;
/// Upstream coupon document.
pub type Coupon = Value;
/// Upstream checkout document (returned by address, consignment and coupon mutators).
pub type Checkout = Value;

// =============================================================================
// Profile
// =============================================================================

/// Which of a profile's two carts an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartType {
    /// Immediate-purchase cart.
    #[default]
    Main,
    /// Items the caregiver intends to buy later.
    PayLater,
}

impl CartType {
    /// Wire label for this cart type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "MAIN",
            Self::PayLater => "PAY_LATER",
        }
    }
}

impl std::fmt::Display for CartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caregiver profile as held by the profile store.
///
/// Only the BigCommerce linkage fields are ever written by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub profile_id: ProfileId,
    pub email: Email,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub big_commerce_customer_id: Option<CustomerId>,
    #[serde(default)]
    pub big_commerce_cart_id: Option<CartId>,
    #[serde(default)]
    pub big_commerce_pay_later_cart_id: Option<CartId>,
}

impl Profile {
    /// Create a profile with no BigCommerce linkage yet.
    #[must_use]
    pub const fn new(profile_id: ProfileId, email: Email) -> Self {
        Self {
            profile_id,
            email,
            first_name: None,
            last_name: None,
            big_commerce_customer_id: None,
            big_commerce_cart_id: None,
            big_commerce_pay_later_cart_id: None,
        }
    }

    /// The linked BigCommerce customer, treating `0` (guest) as unlinked.
    #[must_use]
    pub fn linked_customer_id(&self) -> Option<CustomerId> {
        self.big_commerce_customer_id.filter(|id| id.as_i64() > 0)
    }

    /// The stored cart ID for the given slot, treating blank IDs as absent.
    #[must_use]
    pub fn cart_id(&self, cart_type: CartType) -> Option<&CartId> {
        let slot = match cart_type {
            CartType::Main => self.big_commerce_cart_id.as_ref(),
            CartType::PayLater => self.big_commerce_pay_later_cart_id.as_ref(),
        };
        slot.filter(|id| !id.as_str().trim().is_empty())
    }

    /// Store a cart ID in the given slot.
    pub fn set_cart_id(&mut self, cart_type: CartType, cart_id: CartId) {
        match cart_type {
            CartType::Main => self.big_commerce_cart_id = Some(cart_id),
            CartType::PayLater => self.big_commerce_pay_later_cart_id = Some(cart_id),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// BigCommerce customer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Cart
// =============================================================================

/// BigCommerce cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub line_items: LineItems,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Line items grouped the way BigCommerce groups them.
///
/// Missing groups deserialize as empty, so partially populated carts (e.g.,
/// a freshly created cart) behave like carts with no items of that kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItems {
    /// Prescription products (no catalog product behind them).
    #[serde(default)]
    pub custom_items: Vec<LineItem>,
    /// Over-the-counter catalog products.
    #[serde(default)]
    pub physical_items: Vec<LineItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single cart line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub list_price: Option<Decimal>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cart {
    /// All line items, custom items first then physical items.
    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items
            .custom_items
            .iter()
            .chain(self.line_items.physical_items.iter())
    }

    /// First line item with the given ID.
    #[must_use]
    pub fn find_item_by_id(&self, item_id: &LineItemId) -> Option<&LineItem> {
        self.items().find(|item| &item.id == item_id)
    }

    /// First line item with the given SKU.
    #[must_use]
    pub fn find_item_by_sku(&self, sku: &str) -> Option<&LineItem> {
        self.items().find(|item| item.sku.as_deref() == Some(sku))
    }
}

// =============================================================================
// Items being added to a cart
// =============================================================================

/// An over-the-counter item, identified by its catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtcItem {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub list_price: Option<Decimal>,
    pub quantity: u32,
}

/// A pharmacy-fulfilled item, identified by name and SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub list_price: Option<Decimal>,
    pub quantity: u32,
}

/// A line item classified once, at lookup time.
#[derive(Debug, Clone, PartialEq)]
pub enum CartLineItem {
    Otc(OtcItem),
    Prescription(PrescriptionItem),
}

impl CartLineItem {
    /// Classify an existing line item and keep only the fields needed to
    /// re-add it elsewhere.
    ///
    /// An item is over-the-counter when it references a catalog product.
    #[must_use]
    pub fn classify(item: &LineItem) -> Self {
        match item.product_id.filter(|id| id.as_i64() > 0) {
            Some(product_id) => Self::Otc(OtcItem {
                product_id,
                variant_id: item.variant_id,
                list_price: item.list_price,
                quantity: item.quantity,
            }),
            None => Self::Prescription(PrescriptionItem {
                name: item.name.clone(),
                sku: item.sku.clone(),
                list_price: item.list_price,
                quantity: item.quantity,
            }),
        }
    }

    /// Whether this is an over-the-counter item.
    #[must_use]
    pub const fn is_otc(&self) -> bool {
        matches!(self, Self::Otc(_))
    }
}

/// Caller-shaped payload for adding items to a cart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItems {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub otc_items: Vec<OtcItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prescription_items: Vec<PrescriptionItem>,
}

impl CartItems {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.otc_items.is_empty() && self.prescription_items.is_empty()
    }
}

impl From<CartLineItem> for CartItems {
    fn from(item: CartLineItem) -> Self {
        match item {
            CartLineItem::Otc(otc) => Self {
                otc_items: vec![otc],
                prescription_items: Vec::new(),
            },
            CartLineItem::Prescription(rx) => Self {
                otc_items: Vec::new(),
                prescription_items: vec![rx],
            },
        }
    }
}

// =============================================================================
// Checkout support
// =============================================================================

/// Storefront URLs for handing a cart over to checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectUrls {
    pub cart_url: String,
    pub checkout_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_checkout_url: Option<String>,
}

/// Postal address used for billing and shipping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub state_or_province: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_or_province_code: Option<String>,
    pub postal_code: String,
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// An [`Address`] with the recipient attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(flatten)]
    pub address: Address,
}

// =============================================================================
// Cross-cart moves
// =============================================================================

/// Both carts as they stand after an item was moved.
///
/// `source_cart` is `None` when the move emptied the source cart and
/// BigCommerce discarded it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMove {
    pub source_cart: Option<Cart>,
    pub destination_cart: Cart,
}

/// A [`CartMove`] annotated with which slots were involved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledCartMove {
    pub source_cart_location: CartType,
    pub destination_cart_location: CartType,
    #[serde(flatten)]
    pub carts: CartMove,
}
