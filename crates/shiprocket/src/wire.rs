//! Outbound payloads in the aggregator's flat wire layout, and readers for
//! the response fields the provider inspects.
//!
//! Responses stay `serde_json::Value`; the readers here pull out only what
//! the workflow needs and return `None` when a field is missing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shiprocket_core::order::StockLocation;
use shiprocket_core::order_request::{CreateOrderRequest, OrderItem, ShipAddress};
use shiprocket_core::result::json_id;
use shiprocket_core::shipping_option::{PaymentMethod, ShippingMode};

// ---------------------------------------------------------------------------
// Order creation
// ---------------------------------------------------------------------------

/// Shipping-side fields, sent only when they differ from billing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingFields {
    pub shipping_customer_name: String,
    pub shipping_last_name: String,
    pub shipping_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address_2: Option<String>,
    pub shipping_city: String,
    pub shipping_pincode: String,
    pub shipping_state: String,
    pub shipping_country: String,
    pub shipping_email: String,
    pub shipping_phone: String,
}

impl From<&ShipAddress> for ShippingFields {
    fn from(a: &ShipAddress) -> Self {
        Self {
            shipping_customer_name: a.full_name(),
            shipping_last_name: a.last_name.clone(),
            shipping_address: a.address.clone(),
            shipping_address_2: a.address_2.clone(),
            shipping_city: a.city.clone(),
            shipping_pincode: a.pincode.clone(),
            shipping_state: a.state.clone(),
            shipping_country: a.country.clone(),
            shipping_email: a.email.clone(),
            shipping_phone: a.phone.clone(),
        }
    }
}

/// Body of `orders/create/adhoc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdhocOrderPayload {
    pub order_id: String,
    pub order_date: String,
    pub pickup_location: String,
    pub channel_id: String,
    pub comment: String,
    pub billing_customer_name: String,
    pub billing_last_name: String,
    pub billing_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address_2: Option<String>,
    pub billing_city: String,
    pub billing_pincode: String,
    pub billing_state: String,
    pub billing_country: String,
    pub billing_email: String,
    pub billing_phone: String,
    pub shipping_is_billing: bool,
    #[serde(flatten)]
    pub shipping: Option<ShippingFields>,
    pub order_items: Vec<OrderItem>,
    pub payment_method: PaymentMethod,
    pub shipping_charges: f64,
    pub giftwrap_charges: f64,
    pub transaction_charges: f64,
    pub total_discount: f64,
    pub sub_total: f64,
    pub length: f64,
    pub breadth: f64,
    pub height: f64,
    pub weight: f64,
}

impl From<&CreateOrderRequest> for AdhocOrderPayload {
    fn from(r: &CreateOrderRequest) -> Self {
        let billing = &r.billing_address;
        let shipping = if r.shipping_is_billing {
            None
        } else {
            r.shipping_address.as_ref().map(ShippingFields::from)
        };

        Self {
            order_id: r.order_id.clone(),
            order_date: r.order_date.clone(),
            pickup_location: r.pickup_location.clone(),
            channel_id: r.channel_id.clone(),
            comment: r.comment.clone(),
            billing_customer_name: billing.full_name(),
            billing_last_name: billing.last_name.clone(),
            billing_address: billing.address.clone(),
            billing_address_2: billing.address_2.clone(),
            billing_city: billing.city.clone(),
            billing_pincode: billing.pincode.clone(),
            billing_state: billing.state.clone(),
            billing_country: billing.country.clone(),
            billing_email: billing.email.clone(),
            billing_phone: billing.phone.clone(),
            // Without a distinct shipping address the billing one is used.
            shipping_is_billing: shipping.is_none(),
            shipping,
            order_items: r.order_items.clone(),
            payment_method: r.payment_method,
            shipping_charges: r.price.shipping_charges,
            giftwrap_charges: r.price.giftwrap_charges,
            transaction_charges: r.price.transaction_charges,
            total_discount: r.price.total_discount,
            sub_total: r.price.sub_total,
            length: r.package.length,
            breadth: r.package.breadth,
            height: r.package.height,
            weight: r.package.weight,
        }
    }
}

/// Body of `orders/create/return`, supplied by the host as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnOrderRequest {
    pub order_id: String,
    pub order_date: String,
    pub channel_id: String,
    pub pickup_customer_name: String,
    #[serde(default)]
    pub pickup_last_name: String,
    pub pickup_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_address_2: Option<String>,
    pub pickup_city: String,
    pub pickup_pincode: String,
    pub pickup_state: String,
    pub pickup_country: String,
    pub pickup_email: String,
    pub pickup_phone: String,
    pub order_items: Vec<OrderItem>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub total_discount: f64,
    pub sub_total: f64,
    pub length: f64,
    pub breadth: f64,
    pub height: f64,
    pub weight: f64,
}

// ---------------------------------------------------------------------------
// Serviceability
// ---------------------------------------------------------------------------

/// Query string of `courier/serviceability`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomesticServiceabilityQuery {
    pub pickup_postcode: String,
    pub delivery_postcode: String,
    pub cod: u8,
    pub weight: f64,
    pub length: f64,
    pub breadth: f64,
    pub height: f64,
    pub mode: ShippingMode,
    pub is_return: u8,
    pub declared_value: f64,
    pub order_id: String,
}

/// Query string of `courier/international/serviceability`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InternationalServiceabilityQuery {
    pub pickup_postcode: String,
    pub delivery_country: String,
    pub cod: u8,
    pub weight: f64,
    pub currency: String,
    pub order_id: String,
}

pub fn domestic_cod_flag(cod: bool) -> u8 {
    u8::from(cod)
}

/// International queries send `1` when cash on delivery is NOT requested.
/// This mirrors the deployed integration and awaits product confirmation
/// before being aligned with [`domestic_cod_flag`].
pub fn international_cod_flag(cod: bool) -> u8 {
    u8::from(!cod)
}

// ---------------------------------------------------------------------------
// Pickup locations
// ---------------------------------------------------------------------------

/// Body of `settings/company/addpickup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupLocationRequest {
    pub pickup_location: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pin_code: String,
}

impl PickupLocationRequest {
    /// Register `location` under `pickup_location`. The contact email is
    /// synthesized as `<phone>@<company>.com`, lowercased without spaces.
    pub fn from_stock_location(pickup_location: &str, location: &StockLocation) -> Self {
        let address = &location.address;
        let company = address.company.clone().unwrap_or_default();
        let phone = address.phone.clone().unwrap_or_default();
        let email = format!("{phone}@{company}.com")
            .to_lowercase()
            .replace(' ', "");

        Self {
            pickup_location: pickup_location.to_string(),
            name: company,
            email,
            phone,
            address: address.address_1.clone(),
            address_2: address.address_2.clone(),
            city: address.city.clone(),
            state: address.province.clone().unwrap_or_default(),
            country: address.country_name(),
            pin_code: address.postal_code.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Courier, documents & cancellation
// ---------------------------------------------------------------------------

/// Body of `courier/assign/awb`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignAwbRequest {
    pub shipment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body of `courier/generate/pickup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupRequest {
    pub shipment_id: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pickup_date: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentIds {
    pub shipment_id: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderIds {
    pub order_ids: Vec<String>,
}

/// `{ids}` body shared by invoice printing and order cancellation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ids {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Awbs {
    pub awbs: Vec<String>,
}

// ---------------------------------------------------------------------------
// Response readers
// ---------------------------------------------------------------------------

/// Names of the registered pickup locations in a `settings/company/pickup`
/// response.
pub fn pickup_location_names(body: &Value) -> Vec<String> {
    body.pointer("/data/shipping_address")
        .and_then(Value::as_array)
        .map(|addresses| {
            addresses
                .iter()
                .filter_map(|a| a.get("pickup_location").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Whether `addpickup` reported success.
pub fn pickup_location_created(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool).unwrap_or(false)
}

/// The aggregator's order id in an order-creation response.
pub fn created_order_id(body: &Value) -> Option<String> {
    body.get("order_id").and_then(json_id)
}

pub fn created_shipment_id(body: &Value) -> Option<String> {
    body.get("shipment_id").and_then(json_id)
}

/// The assignment payload (`response.data`) of an AWB response.
pub fn awb_assignment(body: &Value) -> Option<&Map<String, Value>> {
    body.pointer("/response/data").and_then(Value::as_object)
}

pub fn awb_code(body: &Value) -> Option<String> {
    body.pointer("/response/data/awb_code").and_then(json_id)
}

/// True when a document response lists ids it could not produce.
pub fn has_not_created(body: &Value) -> bool {
    body.get("not_created")
        .and_then(Value::as_array)
        .is_some_and(|ids| !ids.is_empty())
}

pub fn label_url(body: &Value) -> Option<&str> {
    body.get("label_url").and_then(Value::as_str)
}

pub fn invoice_created(body: &Value) -> bool {
    body.get("is_invoice_created")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

pub fn invoice_url(body: &Value) -> Option<&str> {
    body.get("invoice_url").and_then(Value::as_str)
}

pub fn manifest_url(body: &Value) -> Option<&str> {
    body.get("manifest_url").and_then(Value::as_str)
}

/// Scheduling details of a `courier/generate/pickup` response.
pub fn pickup_summary(body: &Value) -> Map<String, Value> {
    let response = body.get("response");
    let field = |key: &str| {
        response
            .and_then(|r| r.get(key))
            .cloned()
            .unwrap_or(Value::Null)
    };

    let mut summary = Map::new();
    summary.insert(
        "pickup_status".into(),
        body.get("pickup_status").cloned().unwrap_or(Value::Null),
    );
    summary.insert("pickup_scheduled_date".into(), field("pickup_scheduled_date"));
    summary.insert("pickup_token_number".into(), field("pickup_token_number"));
    summary.insert("status".into(), field("status"));
    summary.insert("pickup_generated_date".into(), field("pickup_generated_date"));
    summary
}
