//! The per-location fulfillment workflow.
//!
//! For every distinct pickup location referenced by the fulfillment's items:
//! check serviceability, make sure the location is registered, submit the
//! order, assign an AWB, optionally book next-day pickup, and stamp a
//! one-time code and the completion time onto the shipment entry. Locations
//! run concurrently and fail independently.

use chrono::{Days, Local, Utc};
use futures::future::join_all;
use serde_json::{json, Map, Value};
use shiprocket_client::wire::{self, PickupLocationRequest};
use shiprocket_core::fulfillment::{Fulfillment, ShipmentKey, ShipmentUpdate};
use shiprocket_core::order::{FulfillmentItem, Order, ShippingMethod, StockLocation};
use shiprocket_core::order_request::{CreateOrderRequest, OrderItem, ShipAddress};
use shiprocket_core::otp::generate_otp;
use shiprocket_core::package::{aggregate_package, aggregate_price};
use shiprocket_core::result::json_id;
use shiprocket_core::shipping_option::{PaymentMethod, ShippingOptionKind, PROVIDER_ID};
use shiprocket_core::ProviderResult;
use shiprocket_events::ShipmentCreated;

use crate::error::{into_envelope, ProviderError};
use crate::provider::ShiprocketProvider;

/// Format of pickup dates sent to the aggregator.
const PICKUP_DATE_FORMAT: &str = "%Y-%m-%d";

impl ShiprocketProvider {
    /// Run the workflow for every pickup location in `items`.
    ///
    /// Returns one result per distinct location, in first-seen order. A
    /// location whose items carry no location of their own uses the
    /// fulfillment's. Every failure, persistence included, stays inside
    /// its location's result.
    pub async fn create_fulfillment_orders(
        &self,
        method: &ShippingMethod,
        items: &[FulfillmentItem],
        order: &Order,
        fulfillment: &Fulfillment,
    ) -> Vec<ProviderResult> {
        let billing = ShipAddress::from_address(&order.billing_address, &order.email);
        let groups = group_by_location(items, fulfillment.location_id.as_deref());

        tracing::info!(
            fulfillment_id = %fulfillment.id,
            order_id = %order.id,
            locations = groups.len(),
            "Starting Shiprocket fulfillment",
        );

        let runs = groups.into_iter().map(|(location_id, items)| {
            let billing = &billing;
            async move {
                let Some(location_id) = location_id else {
                    return ProviderResult::failure("Fulfillment item has no stock location");
                };
                let outcome = self
                    .create_order_at_location(method, &items, order, fulfillment, billing, &location_id)
                    .await;
                if let Err(e) = &outcome {
                    tracing::warn!(
                        fulfillment_id = %fulfillment.id,
                        location = %location_id,
                        error = %e,
                        "Location workflow failed",
                    );
                }
                settle(&fulfillment.id, outcome)
            }
        });

        let results = join_all(runs).await;

        tracing::info!(
            fulfillment_id = %fulfillment.id,
            succeeded = results.iter().filter(|r| r.status).count(),
            failed = results.iter().filter(|r| !r.status).count(),
            "Shiprocket fulfillment finished",
        );
        results
    }

    /// Assign AWBs (plus pickup, code and timestamp) to every shipment entry
    /// in `entries` that has none yet. One result per processed entry.
    pub async fn generate_all_awb(
        &self,
        fulfillment_id: &str,
        entries: &[ProviderResult],
    ) -> Vec<ProviderResult> {
        let pending: Vec<String> = entries
            .iter()
            .filter(|entry| entry.data.get("awb").map_or(true, Value::is_null))
            .filter_map(|entry| entry.data.get("shipment_id").and_then(json_id))
            .collect();

        let runs = pending.iter().map(|shipment_id| async move {
            let outcome = self
                .complete_shipment(fulfillment_id, shipment_id)
                .await
                .map(|fields| ProviderResult::success(Value::Object(fields), "AWB assigned successfully!"));
            settle(fulfillment_id, outcome)
        });

        join_all(runs).await
    }

    /// React to the host marking a fulfillment as shipped: assign AWBs to
    /// its shipments if the order ships with this provider.
    pub async fn create_shipment_from_fulfillment(
        &self,
        event: &ShipmentCreated,
    ) -> Result<Vec<ProviderResult>, ProviderError> {
        let order = self.orders.retrieve(&event.id).await?;
        if !order.has_shipping_method_from(PROVIDER_ID) {
            tracing::debug!(order_id = %event.id, "Order does not ship with Shiprocket");
            return Ok(Vec::new());
        }

        let fulfillment = self.store.fetch(&event.fulfillment_id).await?;
        Ok(self.generate_all_awb(&fulfillment.id, &fulfillment.data).await)
    }

    // ---- private helpers ----

    async fn create_order_at_location(
        &self,
        method: &ShippingMethod,
        items: &[FulfillmentItem],
        order: &Order,
        fulfillment: &Fulfillment,
        billing: &ShipAddress,
        location_id: &str,
    ) -> Result<ProviderResult, ProviderError> {
        let location = self.stock_locations.retrieve(location_id).await?;

        let kind = ShippingOptionKind::from_id(&method.shipping_option_id);
        let serviceability = self
            .items_serviceability(order, kind, &location, items.iter().map(|fi| &fi.item), false)
            .await;
        if let Some(rejected) = serviceability.iter().find(|r| !r.status) {
            return Err(ProviderError::Workflow(format!(
                "Location {location_id} is not serviceable: {}",
                rejected.message
            )));
        }

        self.ensure_pickup_location(location_id, &location).await?;

        let currency = &order.cart_currency;
        let request = CreateOrderRequest {
            order_id: order.id.clone(),
            order_date: order.created_at.to_rfc3339(),
            pickup_location: location_id.to_string(),
            channel_id: self.config.channel_id.clone(),
            comment: format!("Shipping {} from {location_id}", order.id),
            billing_address: billing.clone(),
            shipping_is_billing: order.shipping_address.is_none(),
            shipping_address: order
                .shipping_address
                .as_ref()
                .map(|a| ShipAddress::from_address(a, &billing.email)),
            order_items: OrderItem::from_fulfillment_items(items, currency)?,
            payment_method: PaymentMethod::for_option_id(&method.shipping_option_id),
            price: aggregate_price(items, currency, order.shipping_total)?,
            package: aggregate_package(items),
        };

        let created = self.submit_order(&request).await;
        if !created.status {
            return Ok(created);
        }
        self.record_created_order(&fulfillment.id, &created).await?;

        let shipment_id = wire::created_shipment_id(&created.data)
            .ok_or_else(|| ProviderError::Workflow("Order created without a shipment id".into()))?;
        let fields = self.complete_shipment(&fulfillment.id, &shipment_id).await?;

        let mut data = match created.data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        data.extend(fields);
        Ok(ProviderResult::success(Value::Object(data), created.message))
    }

    /// Look the location up among the registered pickup addresses and
    /// register it when missing.
    async fn ensure_pickup_location(
        &self,
        location_id: &str,
        location: &StockLocation,
    ) -> Result<(), ProviderError> {
        let registered = self.api.get_json(shiprocket_client::endpoints::PICKUP_ADDRESSES).await?;
        if wire::pickup_location_names(&registered)
            .iter()
            .any(|name| name == location_id)
        {
            return Ok(());
        }

        tracing::info!(location = %location_id, "Registering pickup location");
        let created = self
            .create_pickup_location(&PickupLocationRequest::from_stock_location(location_id, location))
            .await;
        if created.status {
            Ok(())
        } else {
            tracing::error!(
                location = %location_id,
                error = %created.message,
                "Unable to create pickup location",
            );
            Err(ProviderError::Workflow("No pickup location".into()))
        }
    }

    /// AWB, optional next-day pickup, one-time code and timestamp for one
    /// shipment. Returns the fields merged into the shipment entry.
    async fn complete_shipment(
        &self,
        fulfillment_id: &str,
        shipment_id: &str,
    ) -> Result<Map<String, Value>, ProviderError> {
        let awb = self.generate_awb(fulfillment_id, shipment_id, None, None).await?;
        if !awb.status {
            return Err(ProviderError::Workflow(format!(
                "AWB assignment failed for shipment {shipment_id}: {}",
                awb.message
            )));
        }

        let mut fields = Map::new();
        fields.insert(
            "awb".into(),
            awb.data.get("awb_code").cloned().unwrap_or(Value::Null),
        );

        let otp = generate_otp();
        if self.config.enable_next_day_pickup {
            let pickup = self
                .create_pickup_request(fulfillment_id, shipment_id, vec![next_pickup_date()], false)
                .await?;
            fields.insert("pickupResponse".into(), Value::Object(pickup.to_object()));
            fields.insert("otp_used".into(), json!(otp));
        } else {
            fields.insert("otp_used".into(), json!(""));
        }
        fields.insert("otp".into(), json!(otp));
        fields.insert("requestedAt".into(), json!(Utc::now().to_rfc3339()));

        self.update_fulfillment(
            fulfillment_id,
            vec![ShipmentUpdate::fields(
                ShipmentKey::Shipment(shipment_id.to_string()),
                fields.clone(),
            )],
        )
        .await?;

        tracing::info!(fulfillment_id, shipment_id, "Shipment ready for pickup");
        Ok(fields)
    }
}

/// Fold a per-location outcome into its result. Persistence failures are
/// logged at error level since the remote side may already hold an order.
fn settle(fulfillment_id: &str, outcome: Result<ProviderResult, ProviderError>) -> ProviderResult {
    match into_envelope(outcome) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(fulfillment_id, error = %e, "Failed to record shipment progress");
            ProviderResult::failure(e.to_string())
        }
    }
}

/// Group items by pickup location, keeping first-seen order.
fn group_by_location(
    items: &[FulfillmentItem],
    fallback: Option<&str>,
) -> Vec<(Option<String>, Vec<FulfillmentItem>)> {
    let mut groups: Vec<(Option<String>, Vec<FulfillmentItem>)> = Vec::new();
    for item in items {
        let location = item.location_id.as_deref().or(fallback).map(str::to_string);
        match groups.iter_mut().find(|(l, _)| *l == location) {
            Some((_, group)) => group.push(item.clone()),
            None => groups.push((location, vec![item.clone()])),
        }
    }
    groups
}

/// Tomorrow on the local calendar.
fn next_pickup_date() -> String {
    let today = Local::now().date_naive();
    today
        .checked_add_days(Days::new(1))
        .unwrap_or(today)
        .format(PICKUP_DATE_FORMAT)
        .to_string()
}
