//! Order submission, pickup locations and the pass-through order endpoints.

use serde_json::{json, Value};
use shiprocket_client::endpoints;
use shiprocket_client::wire::{self, AdhocOrderPayload, PickupLocationRequest, ReturnOrderRequest};
use shiprocket_core::fulfillment::{ShipmentKey, ShipmentUpdate, PROVIDER_ORDER_ID_KEY};
use shiprocket_core::order_request::CreateOrderRequest;
use shiprocket_core::validation::CreatePackageRequest;
use shiprocket_core::{ProviderResult, StoreError};

use crate::error::ProviderError;
use crate::provider::ShiprocketProvider;

const ADDRESS_REGISTERED: &str = "Address registered successfully!";
const ADDRESS_NOT_REGISTERED: &str = "Unable to register address";
const ORDER_PLACED: &str = "Pickup request placed successfully!";
const RETURN_PLACED: &str = "Return request placed successfully!";

impl ShiprocketProvider {
    // ---- pickup locations & channels ----

    /// `GET settings/company/pickup`.
    pub async fn get_pickup_addresses(&self) -> ProviderResult {
        self.api.get(endpoints::PICKUP_ADDRESSES).await
    }

    /// `GET channels`.
    pub async fn get_channels(&self) -> ProviderResult {
        self.api.get(endpoints::CHANNELS).await
    }

    /// Register a pickup address. On success `data` is the registered
    /// address as echoed by the aggregator.
    pub async fn create_pickup_location(&self, request: &PickupLocationRequest) -> ProviderResult {
        match self.api.post_json(endpoints::ADD_PICKUP_ADDRESS, request).await {
            Ok(body) if wire::pickup_location_created(&body) => {
                tracing::info!(pickup_location = %request.pickup_location, "Pickup location registered");
                let address = body.get("address").cloned().unwrap_or(Value::Null);
                ProviderResult::success(address, ADDRESS_REGISTERED)
            }
            Ok(_) => ProviderResult::failure(ADDRESS_NOT_REGISTERED),
            Err(e) => {
                tracing::warn!(
                    pickup_location = %request.pickup_location,
                    error = %e,
                    "Pickup location registration failed",
                );
                ProviderResult::failure(e.to_string())
            }
        }
    }

    // ---- order creation ----

    /// Submit an order to `orders/create/adhoc`. On success `data` holds the
    /// aggregator's `order_id` and `shipment_id`.
    pub async fn submit_order(&self, request: &CreateOrderRequest) -> ProviderResult {
        let payload = AdhocOrderPayload::from(request);
        match self.api.post_json(endpoints::CREATE_ADHOC_ORDER, &payload).await {
            Ok(body) => {
                tracing::info!(
                    order_id = %request.order_id,
                    pickup_location = %request.pickup_location,
                    "Order submitted to Shiprocket",
                );
                ProviderResult::success(body, ORDER_PLACED)
            }
            Err(e) => {
                tracing::warn!(order_id = %request.order_id, error = %e, "Order submission failed");
                ProviderResult::from_error(&e)
            }
        }
    }

    /// Submit an order and record the created shipment on the fulfillment.
    pub async fn request_create_order(
        &self,
        fulfillment_id: &str,
        request: &CreateOrderRequest,
    ) -> Result<ProviderResult, StoreError> {
        let created = self.submit_order(request).await;
        if !created.status {
            return Ok(created);
        }
        crate::error::into_envelope(
            self.record_created_order(fulfillment_id, &created)
                .await
                .map(|()| created),
        )
    }

    /// Validate a raw package request, then submit it.
    ///
    /// A rejected request returns [`ProviderError::Validation`] and nothing
    /// is sent. Apart from that only [`ProviderError::Store`] is returned as
    /// an error; remote failures come back as failed results.
    pub async fn create_package_order(
        &self,
        fulfillment_id: &str,
        raw: Value,
    ) -> Result<ProviderResult, ProviderError> {
        let request = CreatePackageRequest::from_value(raw)?;
        request.validate(self.phone_validator.as_ref())?;
        let order = request.into_order_request(&self.config.channel_id);
        Ok(self.request_create_order(fulfillment_id, &order).await?)
    }

    /// `POST orders/create/return`.
    pub async fn request_create_return_order(&self, request: &ReturnOrderRequest) -> ProviderResult {
        match self.api.post_json(endpoints::CREATE_RETURN_ORDER, request).await {
            Ok(body) => ProviderResult::success(body, RETURN_PLACED),
            Err(e) => {
                tracing::warn!(order_id = %request.order_id, error = %e, "Return order failed");
                ProviderResult::from_error(&e)
            }
        }
    }

    // ---- quick shipments ----

    /// Create an order, assign a courier and book a pickup in one call, then
    /// merge the created shipment into the fulfillment.
    pub async fn post_quick_create_forward(
        &self,
        fulfillment_id: &str,
        request: &Value,
    ) -> Result<ProviderResult, StoreError> {
        let result = self.api.post(endpoints::QUICK_FORWARD_SHIPMENT, request).await;
        if !result.status {
            return Ok(result);
        }

        let payload = result.data.get("payload").unwrap_or(&result.data);
        match wire::created_shipment_id(payload) {
            Some(shipment_id) => {
                let update = ShipmentUpdate::from_result_data(
                    ShipmentKey::Shipment(shipment_id),
                    &ProviderResult::success(payload.clone(), ""),
                );
                self.update_fulfillment(fulfillment_id, vec![update]).await?;
            }
            None => tracing::warn!(fulfillment_id, "Quick forward response carries no shipment id"),
        }
        Ok(result)
    }

    /// Quick return shipments use the forward-shipment endpoint as well.
    pub async fn post_quick_return(&self, request: &Value) -> ProviderResult {
        self.api.post(endpoints::QUICK_FORWARD_SHIPMENT, request).await
    }

    // ---- crate helpers ----

    /// Append the shipment entry, then remember the aggregator order id.
    /// The entry goes first so a created order is never left unrecorded.
    pub(crate) async fn record_created_order(
        &self,
        fulfillment_id: &str,
        created: &ProviderResult,
    ) -> Result<(), ProviderError> {
        let shipment_id = wire::created_shipment_id(&created.data).ok_or_else(|| {
            ProviderError::Workflow("Order created without a shipment id".into())
        })?;

        let update = ShipmentUpdate::from_result_data(ShipmentKey::Shipment(shipment_id), created);
        self.update_fulfillment(fulfillment_id, vec![update]).await?;

        if let Some(order_id) = wire::created_order_id(&created.data) {
            self.store
                .set_metadata(fulfillment_id, PROVIDER_ORDER_ID_KEY, json!(order_id))
                .await?;
        }
        Ok(())
    }
}
