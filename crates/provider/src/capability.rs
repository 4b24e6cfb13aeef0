//! The host-facing [`FulfillmentProvider`] implementation.

use async_trait::async_trait;
use serde_json::Value;
use shiprocket_core::fulfillment::Fulfillment;
use shiprocket_core::order::{Cart, FulfillmentItem, Order, ShippingMethod};
use shiprocket_core::services::{FulfillmentOption, FulfillmentProvider};
use shiprocket_core::shipping_option::{fulfillment_option_ids, ShippingOptionKind, PROVIDER_ID};
use shiprocket_core::validation::{CreatePackageRequest, ValidationError};
use shiprocket_core::ProviderResult;

use crate::provider::ShiprocketProvider;

const INVALID_CONFIGURATION: &str = "Invalid shipping option configuration";

impl ShiprocketProvider {
    fn check_option_for_cart(&self, option_id: &str, cart: &Cart) -> Result<(), String> {
        let kind = ShippingOptionKind::from_id(option_id)
            .ok_or_else(|| format!("Unknown shipping option {option_id}"))?;
        let domestic_cart = cart
            .billing_address
            .as_ref()
            .is_some_and(|a| a.is_in_country(&self.config.home_country));

        match (domestic_cart, kind.is_domestic()) {
            (true, false) => Err("Invalid shipping option selected".into()),
            (false, true) => Err("Invalid shipping option selected for international shipping".into()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl FulfillmentProvider for ShiprocketProvider {
    fn identifier(&self) -> &'static str {
        PROVIDER_ID
    }

    fn fulfillment_options(&self) -> Vec<FulfillmentOption> {
        fulfillment_option_ids()
            .into_iter()
            .map(|id| FulfillmentOption { id: id.to_string() })
            .collect()
    }

    fn validate_option(&self, option_id: &str) -> bool {
        ShippingOptionKind::from_id(option_id).is_some()
    }

    fn validate_fulfillment_data(
        &self,
        option_id: &str,
        data: &Value,
        cart: &Cart,
    ) -> Result<Value, ValidationError> {
        let reject = |reason: String| {
            tracing::warn!(option_id, cart_id = %cart.id, reason = %reason, "Shipping method data rejected");
            ValidationError::new(format!("{INVALID_CONFIGURATION} {reason}"))
        };

        self.check_option_for_cart(option_id, cart).map_err(reject)?;
        CreatePackageRequest::from_value(data.clone())
            .and_then(|request| request.validate(self.phone_validator.as_ref()))
            .map_err(|e| reject(e.message))?;
        Ok(data.clone())
    }

    fn can_calculate(&self, _data: &Value) -> bool {
        true
    }

    fn calculate_price(&self, _option_id: &str, _data: &Value, _cart: &Cart) -> f64 {
        0.0
    }

    async fn create_fulfillment(
        &self,
        method: &ShippingMethod,
        items: &[FulfillmentItem],
        order: &Order,
        fulfillment: &Fulfillment,
    ) -> Vec<ProviderResult> {
        self.create_fulfillment_orders(method, items, order, fulfillment)
            .await
    }

    async fn cancel_fulfillment(&self, fulfillment: &Fulfillment) -> ProviderResult {
        self.cancel_provider_order(fulfillment).await
    }
}
