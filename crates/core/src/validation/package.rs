//! Validation of the package-endpoint order payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::phone::PhoneValidator;
use super::ValidationError;
use crate::order_request::{CreateOrderRequest, OrderItem, ShipAddress};
use crate::package::{PackageInfo, PriceInfo};
use crate::result::json_id;
use crate::shipping_option::PaymentMethod;

/// Required length of an Indian postal code.
pub const PINCODE_LENGTH: usize = 6;

/// Order payload as posted to the package endpoint (camelCase JSON).
///
/// Every field is optional at this stage so that a missing field yields the
/// matching validation message instead of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePackageRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub order_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub order_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub pickup_location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub comment: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub billing_customer_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub billing_last_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub billing_address: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub billing_address_two: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub billing_city: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub billing_pincode: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub billing_state: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub billing_country: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub billing_email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub billing_phone: Option<String>,
    #[serde(deserialize_with = "lenient_items")]
    pub order_items: Option<Vec<PackageItemRequest>>,
    #[serde(deserialize_with = "lenient_string")]
    pub payment_method: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub shipping_charges: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub gift_wrap_charges: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub transaction_charges: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub total_discount: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub sub_total: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub length: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub breadth: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageItemRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub sku: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub units: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub selling_price: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub discount: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub tax: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub hsn: Option<String>,
}

impl CreatePackageRequest {
    /// Parse a raw JSON body. A body that is not an object is rejected with
    /// the first validation message; malformed fields read as absent and
    /// fail in [`Self::validate`] under their own message.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::new("Invalid order Id!"));
        }
        serde_json::from_value(value)
            .map_err(|e| ValidationError::new(format!("Malformed package request: {e}")))
    }

    /// Check every field in order; the first failure wins.
    pub fn validate(&self, phones: &dyn PhoneValidator) -> Result<(), ValidationError> {
        require_text(&self.order_id, "Invalid order Id!")?;
        require_text(&self.order_date, "Invalid order date!")?;
        require_text(&self.pickup_location, "Invalid pick location!")?;
        require_text(&self.comment, "Invalid comment!")?;
        require_text(&self.billing_customer_name, "Invalid customer name!")?;
        require_text(&self.billing_last_name, "Invalid customer last name!")?;
        require_text(&self.billing_address, "Invalid customer address!")?;
        require_text(&self.billing_city, "Invalid customer city!")?;

        let pincode = require_text(&self.billing_pincode, "Invalid customer pincode!")?;
        if pincode.chars().count() != PINCODE_LENGTH {
            return Err(ValidationError::new("Invalid customer pincode!"));
        }

        require_text(&self.billing_state, "Invalid customer state!")?;
        require_text(&self.billing_country, "Invalid customer country!")?;
        require_text(&self.billing_email, "Invalid customer email!")?;

        let phone = require_text(&self.billing_phone, "Invalid customer phone!")?;
        if !phones.is_valid(phone) {
            return Err(ValidationError::new("Invalid phone!"));
        }

        match &self.order_items {
            Some(items) if !items.is_empty() => {
                for item in items {
                    item.validate()?;
                }
            }
            _ => return Err(ValidationError::new("Invalid orders!")),
        }

        match self.payment_method.as_deref() {
            Some("Prepaid") | Some("Postpaid") => {}
            _ => return Err(ValidationError::new("Invalid payment methods!")),
        }

        require_positive(self.sub_total, "Invalid sub-total charges!")?;
        require_positive(self.length, "Invalid package length!")?;
        require_positive(self.breadth, "Invalid package breadth!")?;
        require_positive(self.height, "Invalid package height!")?;
        require_positive(self.weight, "Invalid package weight!")?;
        Ok(())
    }

    /// Convert a validated request into a domestic order submission with the
    /// billing address doubling as the shipping address.
    pub fn into_order_request(self, channel_id: &str) -> CreateOrderRequest {
        let payment_method = match self.payment_method.as_deref() {
            Some("Postpaid") => PaymentMethod::Postpaid,
            _ => PaymentMethod::Prepaid,
        };
        let total_discount = self.total_discount.unwrap_or(0.0);

        CreateOrderRequest {
            order_id: self.order_id.unwrap_or_default(),
            order_date: self.order_date.unwrap_or_default(),
            pickup_location: self.pickup_location.unwrap_or_default(),
            channel_id: channel_id.to_string(),
            comment: self.comment.unwrap_or_default(),
            billing_address: ShipAddress {
                first_name: self.billing_customer_name.unwrap_or_default(),
                last_name: self.billing_last_name.unwrap_or_default(),
                email: self.billing_email.unwrap_or_default(),
                phone: self.billing_phone.unwrap_or_default(),
                address: self.billing_address.unwrap_or_default(),
                address_2: self.billing_address_two,
                city: self.billing_city.unwrap_or_default(),
                state: self.billing_state.unwrap_or_default(),
                pincode: self.billing_pincode.unwrap_or_default(),
                country: self.billing_country.unwrap_or_default(),
            },
            shipping_is_billing: true,
            shipping_address: None,
            order_items: self
                .order_items
                .unwrap_or_default()
                .into_iter()
                .map(PackageItemRequest::into_order_item)
                .collect(),
            payment_method,
            price: PriceInfo {
                sub_total: self.sub_total.unwrap_or(0.0),
                discount: total_discount,
                total_discount,
                shipping_charges: self.shipping_charges.unwrap_or(0.0),
                giftwrap_charges: self.gift_wrap_charges.unwrap_or(0.0),
                transaction_charges: self.transaction_charges.unwrap_or(0.0),
            },
            package: PackageInfo {
                length: self.length.unwrap_or(0.0),
                breadth: self.breadth.unwrap_or(0.0),
                height: self.height.unwrap_or(0.0),
                weight: self.weight.unwrap_or(0.0),
            },
        }
    }
}

impl PackageItemRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let sku = require_text(&self.sku, "Invalid order sku")?;
        let at_sku = |field: &str| format!("SKU-{sku}: Invalid order {field}");

        require_text(&self.name, &at_sku("name"))?;
        let units = require_positive(self.units, &at_sku("units"))?;
        if units.fract() != 0.0 {
            return Err(ValidationError::new(at_sku("units")));
        }
        require_positive(self.selling_price, &at_sku("selling price"))?;
        // zero tax is legitimate for exempt goods
        if self.tax.is_none() {
            return Err(ValidationError::new(at_sku("tax")));
        }
        require_text(&self.hsn, &at_sku("hsn"))?;
        Ok(())
    }

    fn into_order_item(self) -> OrderItem {
        OrderItem {
            sku: self.sku.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            units: self.units.unwrap_or(0.0).max(0.0) as u32,
            selling_price: self.selling_price.unwrap_or(0.0),
            tax: self.tax.unwrap_or(0.0),
            hsn: self
                .hsn
                .as_deref()
                .map(|h| h.replace(' ', ""))
                .and_then(|h| h.parse().ok()),
            discount: self.discount.unwrap_or(0.0),
        }
    }
}

fn require_text<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ValidationError::new(message)),
    }
}

fn require_positive(value: Option<f64>, message: &str) -> Result<f64, ValidationError> {
    match value {
        Some(n) if n > 0.0 => Ok(n),
        _ => Err(ValidationError::new(message)),
    }
}

// ---------------------------------------------------------------------------
// Lenient field parsing
// ---------------------------------------------------------------------------

/// Accept strings and numbers; anything else reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(json_id))
}

/// Accept numbers and numeric strings; anything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accept an array of item objects; anything else reads as absent.
fn lenient_items<'de, D>(deserializer: D) -> Result<Option<Vec<PackageItemRequest>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::RegionPhoneValidator;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "orderId": "order_01",
            "orderDate": "2024-03-01 10:00",
            "pickupLocation": "Primary",
            "comment": "handle with care",
            "billingCustomerName": "Asha",
            "billingLastName": "Rao",
            "billingAddress": "12 MG Road",
            "billingCity": "Bengaluru",
            "billingPincode": "560001",
            "billingState": "Karnataka",
            "billingCountry": "India",
            "billingEmail": "asha@example.com",
            "billingPhone": "9876543210",
            "orderItems": [
                {"sku": "SKU1", "name": "Kurta", "units": 2, "sellingPrice": 500, "tax": 18, "hsn": "6211 42"}
            ],
            "paymentMethod": "Prepaid",
            "subTotal": 1000,
            "length": 10,
            "breadth": 15,
            "height": 2,
            "weight": 0.5
        })
    }

    fn check(body: Value) -> Result<(), ValidationError> {
        CreatePackageRequest::from_value(body)?.validate(&RegionPhoneValidator::default())
    }

    fn without(key: &str) -> Value {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove(key);
        body
    }

    #[test]
    fn valid_request_passes() {
        assert_eq!(check(valid_body()), Ok(()));
    }

    #[test]
    fn missing_pincode_is_rejected() {
        let err = check(without("billingPincode")).unwrap_err();
        assert_eq!(err, ValidationError::new("Invalid customer pincode!"));
        assert_eq!(err.code, 409);
    }

    #[test]
    fn short_pincode_is_rejected() {
        let mut body = valid_body();
        body["billingPincode"] = json!("56001");
        assert_eq!(check(body).unwrap_err().message, "Invalid customer pincode!");
    }

    #[test]
    fn numeric_pincode_is_accepted() {
        let mut body = valid_body();
        body["billingPincode"] = json!(560001);
        assert!(check(body).is_ok());
    }

    #[test]
    fn first_failure_wins() {
        let mut body = without("orderId");
        body.as_object_mut().unwrap().remove("comment");
        assert_eq!(check(body).unwrap_err().message, "Invalid order Id!");
    }

    #[test]
    fn bad_phone_is_rejected() {
        let mut body = valid_body();
        body["billingPhone"] = json!("12ab");
        assert_eq!(check(body).unwrap_err().message, "Invalid phone!");
    }

    #[test]
    fn payment_method_must_be_known() {
        let mut body = valid_body();
        body["paymentMethod"] = json!("Cash");
        assert_eq!(check(body).unwrap_err().message, "Invalid payment methods!");
    }

    #[test]
    fn empty_items_are_rejected() {
        let mut body = valid_body();
        body["orderItems"] = json!([]);
        assert_eq!(check(body).unwrap_err().message, "Invalid orders!");
    }

    #[test]
    fn item_errors_name_the_sku() {
        let mut body = valid_body();
        body["orderItems"][0].as_object_mut().unwrap().remove("hsn");
        assert_eq!(check(body).unwrap_err().message, "SKU-SKU1: Invalid order hsn");

        let mut body = valid_body();
        body["orderItems"][0]["sellingPrice"] = json!(0);
        assert_eq!(
            check(body).unwrap_err().message,
            "SKU-SKU1: Invalid order selling price"
        );
    }

    #[test]
    fn package_dimensions_are_required() {
        assert_eq!(check(without("breadth")).unwrap_err().message, "Invalid package breadth!");
        assert_eq!(check(without("weight")).unwrap_err().message, "Invalid package weight!");
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = CreatePackageRequest::from_value(json!("nope")).unwrap_err();
        assert_eq!(err.message, "Invalid order Id!");
    }

    #[test]
    fn malformed_items_point_at_the_items() {
        let mut body = valid_body();
        body["orderItems"] = json!("SKU1 x2");
        assert_eq!(check(body).unwrap_err().message, "Invalid orders!");

        let mut body = valid_body();
        body["orderItems"] = json!([42]);
        assert_eq!(check(body).unwrap_err().message, "Invalid orders!");
    }

    #[test]
    fn fractional_units_are_rejected() {
        let mut body = valid_body();
        body["orderItems"][0]["units"] = json!(1.5);
        assert_eq!(check(body).unwrap_err().message, "SKU-SKU1: Invalid order units");

        let mut body = valid_body();
        body["orderItems"][0]["units"] = json!("3");
        assert!(check(body).is_ok());
    }

    #[test]
    fn conversion_keeps_billing_as_shipping() {
        let req = CreatePackageRequest::from_value(valid_body())
            .unwrap()
            .into_order_request("4321");
        assert!(req.shipping_is_billing);
        assert!(req.shipping_address.is_none());
        assert_eq!(req.channel_id, "4321");
        assert_eq!(req.billing_address.pincode, "560001");
        assert_eq!(req.order_items[0].units, 2);
        assert_eq!(req.order_items[0].hsn, Some(621142));
        assert_eq!(req.payment_method, PaymentMethod::Prepaid);
        assert_eq!(req.package.breadth, 15.0);
    }
}
