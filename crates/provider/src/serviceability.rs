//! Courier serviceability per item and pickup location.
//!
//! One remote query per item, all in flight at once. Each item's outcome is
//! its own [`ProviderResult`]; a failed query never aborts its siblings.

use futures::future::join_all;
use shiprocket_client::endpoints;
use shiprocket_client::wire::{
    domestic_cod_flag, international_cod_flag, DomesticServiceabilityQuery,
    InternationalServiceabilityQuery,
};
use shiprocket_core::fulfillment::Fulfillment;
use shiprocket_core::order::{LineItem, Order, ShippingMethod, StockLocation};
use shiprocket_core::shipping_option::{ShippingMode, ShippingOptionKind};
use shiprocket_core::ProviderResult;

use crate::provider::ShiprocketProvider;

/// A fulfillment annotated with the serviceability of each order item.
#[derive(Debug, Clone)]
pub struct FulfillmentServiceability {
    pub fulfillment: Fulfillment,
    pub serviceability: Vec<ProviderResult>,
}

impl FulfillmentServiceability {
    pub fn is_serviceable(&self) -> bool {
        self.serviceability.iter().all(|r| r.status)
    }
}

impl ShiprocketProvider {
    /// Check every fulfillment of `order` from its stock location.
    ///
    /// Orders delivered inside the home country are checked with the mode
    /// and COD setting of `method`; all others go through the international
    /// query. Results keep the order of `order.fulfillments` and of
    /// `order.items`.
    pub async fn check_serviceability(
        &self,
        order: &Order,
        method: &ShippingMethod,
        is_return: bool,
    ) -> Vec<FulfillmentServiceability> {
        let kind = ShippingOptionKind::from_id(&method.shipping_option_id);

        let checks = order.fulfillments.iter().map(|fulfillment| async move {
            let serviceability = match self.fulfillment_location(fulfillment).await {
                Ok(location) => {
                    self.items_serviceability(order, kind, &location, order.items.iter(), is_return)
                        .await
                }
                Err(message) => order
                    .items
                    .iter()
                    .map(|_| ProviderResult::failure(message.clone()))
                    .collect(),
            };
            FulfillmentServiceability {
                fulfillment: fulfillment.clone(),
                serviceability,
            }
        });

        join_all(checks).await
    }

    /// `GET courier/serviceability`.
    pub async fn get_serviceability(&self, query: &DomesticServiceabilityQuery) -> ProviderResult {
        self.api
            .get_with_query(endpoints::SERVICEABILITY, query)
            .await
    }

    /// `GET courier/international/serviceability`.
    pub async fn get_international_serviceability(
        &self,
        query: &InternationalServiceabilityQuery,
    ) -> ProviderResult {
        self.api
            .get_with_query(endpoints::INTERNATIONAL_SERVICEABILITY, query)
            .await
    }

    /// One result per item, checked from `location`.
    pub(crate) async fn items_serviceability<'a>(
        &self,
        order: &Order,
        kind: Option<ShippingOptionKind>,
        location: &StockLocation,
        items: impl Iterator<Item = &'a LineItem>,
        is_return: bool,
    ) -> Vec<ProviderResult> {
        let pickup_postcode = location.address.postal_code.clone();

        if order
            .delivery_country_code()
            .eq_ignore_ascii_case(&self.config.home_country)
        {
            let mode = kind.map(|k| k.mode()).unwrap_or(ShippingMode::Air);
            let cod = kind.is_some_and(|k| k.is_cod());
            let delivery_postcode = order
                .shipping_address
                .as_ref()
                .unwrap_or(&order.billing_address)
                .postal_code
                .clone();

            let queries = items.map(|item| {
                let variant = &item.variant;
                let query = DomesticServiceabilityQuery {
                    pickup_postcode: pickup_postcode.clone(),
                    delivery_postcode: delivery_postcode.clone(),
                    cod: domestic_cod_flag(cod),
                    weight: variant.weight.unwrap_or(0.0),
                    length: variant.length.unwrap_or(0.0),
                    breadth: variant.width.unwrap_or(0.0),
                    height: variant.height.unwrap_or(0.0),
                    mode,
                    is_return: u8::from(is_return),
                    declared_value: item.unit_price * f64::from(item.quantity),
                    order_id: order.id.clone(),
                };
                async move { self.get_serviceability(&query).await }
            });
            join_all(queries).await
        } else {
            let currency = order
                .payment_currency
                .clone()
                .unwrap_or_else(|| self.config.default_currency.clone());
            let delivery_country = order.delivery_country_code().to_uppercase();

            let queries = items.map(|item| {
                let query = InternationalServiceabilityQuery {
                    pickup_postcode: pickup_postcode.clone(),
                    delivery_country: delivery_country.clone(),
                    cod: international_cod_flag(false),
                    weight: item.variant.weight.unwrap_or(0.0),
                    currency: currency.clone(),
                    order_id: order.id.clone(),
                };
                async move { self.get_international_serviceability(&query).await }
            });
            join_all(queries).await
        }
    }

    async fn fulfillment_location(&self, fulfillment: &Fulfillment) -> Result<StockLocation, String> {
        let location_id = fulfillment
            .location_id
            .as_deref()
            .ok_or_else(|| format!("Fulfillment {} has no stock location", fulfillment.id))?;
        self.stock_locations
            .retrieve(location_id)
            .await
            .map_err(|e| {
                tracing::warn!(location_id, error = %e, "Stock location lookup failed");
                e.to_string()
            })
    }
}
