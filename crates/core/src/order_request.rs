//! Outbound order-creation request, independent of the aggregator's flat
//! wire layout.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::order::{Address, FulfillmentItem};
use crate::package::{PackageInfo, PriceInfo};
use crate::shipping_option::PaymentMethod;

/// A billing or shipping address as the aggregator understands it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub address_2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    /// Country display name.
    pub country: String,
}

impl ShipAddress {
    pub fn from_address(address: &Address, email: &str) -> Self {
        Self {
            first_name: address.first_name.clone().unwrap_or_default(),
            last_name: address.last_name.clone().unwrap_or_default(),
            email: email.to_string(),
            phone: address.phone.clone().unwrap_or_default(),
            address: address.address_1.clone(),
            address_2: address.address_2.clone(),
            city: address.city.clone(),
            state: address.province.clone().unwrap_or_default(),
            pincode: address.postal_code.clone(),
            country: address.country_name(),
        }
    }

    /// "First Last", trimmed when either part is missing.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub sku: String,
    pub name: String,
    pub units: u32,
    pub selling_price: f64,
    pub tax: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsn: Option<u64>,
    pub discount: f64,
}

impl OrderItem {
    /// Convert a fulfilled line item, pricing it in `currency_code`.
    pub fn from_fulfillment_item(fi: &FulfillmentItem, currency_code: &str) -> Result<Self, CoreError> {
        let variant = &fi.item.variant;
        let price = variant.price_in(currency_code).ok_or_else(|| {
            CoreError::Validation(format!(
                "No {} price for variant {}",
                currency_code.to_uppercase(),
                variant.id
            ))
        })?;

        Ok(Self {
            sku: variant.id.clone(),
            name: variant.title.clone(),
            units: fi.quantity,
            selling_price: price.amount,
            tax: if fi.item.includes_tax {
                0.0
            } else {
                fi.item.tax_total.unwrap_or(0.0)
            },
            hsn: variant.hsn(),
            discount: fi.item.discount_total.unwrap_or(0.0),
        })
    }

    pub fn from_fulfillment_items(
        items: &[FulfillmentItem],
        currency_code: &str,
    ) -> Result<Vec<Self>, CoreError> {
        items
            .iter()
            .map(|fi| Self::from_fulfillment_item(fi, currency_code))
            .collect()
    }
}

/// A fully resolved domestic order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub order_id: String,
    pub order_date: String,
    pub pickup_location: String,
    pub channel_id: String,
    pub comment: String,
    pub billing_address: ShipAddress,
    /// When false, `shipping_address` is sent alongside the billing fields.
    pub shipping_is_billing: bool,
    #[serde(default)]
    pub shipping_address: Option<ShipAddress>,
    pub order_items: Vec<OrderItem>,
    pub payment_method: PaymentMethod,
    pub price: PriceInfo,
    pub package: PackageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{LineItem, MoneyAmount, ProductVariant};

    fn fulfilled(includes_tax: bool) -> FulfillmentItem {
        FulfillmentItem {
            item: LineItem {
                id: "item_1".into(),
                quantity: 3,
                unit_price: 500.0,
                includes_tax,
                tax_total: Some(90.0),
                discount_total: None,
                variant: ProductVariant {
                    id: "variant_1".into(),
                    title: "Kurta".into(),
                    hs_code: Some("6211 42".into()),
                    prices: vec![MoneyAmount {
                        currency_code: "INR".into(),
                        amount: 500.0,
                    }],
                    ..Default::default()
                },
            },
            quantity: 2,
            location_id: None,
        }
    }

    #[test]
    fn item_conversion_uses_variant_and_fulfilled_quantity() {
        let item = OrderItem::from_fulfillment_item(&fulfilled(false), "inr").unwrap();
        assert_eq!(item.sku, "variant_1");
        assert_eq!(item.name, "Kurta");
        assert_eq!(item.units, 2);
        assert_eq!(item.selling_price, 500.0);
        assert_eq!(item.tax, 90.0);
        assert_eq!(item.hsn, Some(621142));
        assert_eq!(item.discount, 0.0);
    }

    #[test]
    fn tax_inclusive_lines_carry_zero_tax() {
        let item = OrderItem::from_fulfillment_item(&fulfilled(true), "INR").unwrap();
        assert_eq!(item.tax, 0.0);
    }

    #[test]
    fn missing_hsn_is_omitted_from_wire() {
        let mut fi = fulfilled(false);
        fi.item.variant.hs_code = None;
        let item = OrderItem::from_fulfillment_item(&fi, "INR").unwrap();
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("hsn").is_none());
    }

    #[test]
    fn ship_address_uses_country_name() {
        let address = Address {
            first_name: Some("Asha".into()),
            last_name: Some("Rao".into()),
            address_1: "12 MG Road".into(),
            city: "Bengaluru".into(),
            province: Some("Karnataka".into()),
            postal_code: "560001".into(),
            country_code: "in".into(),
            ..Default::default()
        };
        let ship = ShipAddress::from_address(&address, "asha@example.com");
        assert_eq!(ship.country, "India");
        assert_eq!(ship.state, "Karnataka");
        assert_eq!(ship.full_name(), "Asha Rao");
    }
}
