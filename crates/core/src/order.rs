//! Read-only views of the order-management system's entities.
//!
//! The host owns these records; the provider only reads them to derive
//! serviceability queries and outbound orders.

use serde::{Deserialize, Serialize};

use crate::fulfillment::Fulfillment;
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Addresses & locations
// ---------------------------------------------------------------------------

/// A postal address as stored by the host (customer or stock location).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub address_1: String,
    #[serde(default)]
    pub address_2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub province: Option<String>,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2, upper or lower case.
    pub country_code: String,
    /// Display name of the country, when the host has it.
    #[serde(default)]
    pub country: Option<String>,
}

impl Address {
    /// Country display name, falling back to the built-in table and then to
    /// the raw code.
    pub fn country_name(&self) -> String {
        self.country
            .clone()
            .or_else(|| crate::countries::country_name(&self.country_code).map(str::to_string))
            .unwrap_or_else(|| self.country_code.to_uppercase())
    }

    pub fn is_in_country(&self, country_code: &str) -> bool {
        self.country_code.eq_ignore_ascii_case(country_code)
    }
}

/// A warehouse registered in the host's inventory module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLocation {
    pub id: EntityId,
    pub name: String,
    pub address: Address,
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// A price for a variant in one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyAmount {
    pub currency_code: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub hs_code: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub prices: Vec<MoneyAmount>,
}

impl ProductVariant {
    /// Price in the given currency (case-insensitive match).
    pub fn price_in(&self, currency_code: &str) -> Option<&MoneyAmount> {
        self.prices
            .iter()
            .find(|p| p.currency_code.eq_ignore_ascii_case(currency_code))
    }

    /// HS code with spaces removed, parsed as an integer.
    pub fn hsn(&self) -> Option<u64> {
        self.hs_code
            .as_deref()
            .map(|code| code.replace(' ', ""))
            .and_then(|code| code.parse().ok())
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: EntityId,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(default)]
    pub includes_tax: bool,
    #[serde(default)]
    pub tax_total: Option<f64>,
    #[serde(default)]
    pub discount_total: Option<f64>,
    pub variant: ProductVariant,
}

/// A line item as it appears inside a fulfillment, with the quantity being
/// shipped and the stock location it ships from (when split).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentItem {
    pub item: LineItem,
    pub quantity: u32,
    #[serde(default)]
    pub location_id: Option<EntityId>,
}

/// The shipping method the customer picked at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: EntityId,
    pub shipping_option_id: String,
    pub provider_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: EntityId,
    pub created_at: Timestamp,
    pub email: String,
    pub billing_address: Address,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub fulfillments: Vec<Fulfillment>,
    #[serde(default)]
    pub shipping_methods: Vec<ShippingMethod>,
    /// Currency of the first payment, when one was captured.
    #[serde(default)]
    pub payment_currency: Option<String>,
    /// Currency of the cart's region; prices are resolved in it.
    pub cart_currency: String,
    #[serde(default)]
    pub shipping_total: f64,
}

impl Order {
    /// Country the parcel is delivered to: the shipping address, else billing.
    pub fn delivery_country_code(&self) -> &str {
        self.shipping_address
            .as_ref()
            .map(|a| a.country_code.as_str())
            .unwrap_or(self.billing_address.country_code.as_str())
    }

    pub fn has_shipping_method_from(&self, provider_id: &str) -> bool {
        self.shipping_methods
            .iter()
            .any(|m| m.provider_id == provider_id)
    }
}

/// Minimal cart view used when validating shipping-method data at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: EntityId,
    #[serde(default)]
    pub billing_address: Option<Address>,
}
