//! Post-creation shipment operations: AWB assignment, pickups, documents and
//! cancellation.
//!
//! Each operation calls one endpoint and, on success, merges its result into
//! the fulfillment under the operation's entity. Remote failures come back as
//! failed results; only persistence failures are returned as errors.

use serde::Serialize;
use serde_json::{json, Map, Value};
use shiprocket_client::error::reject_embedded_error;
use shiprocket_client::wire::{self, AssignAwbRequest, Awbs, Ids, OrderIds, PickupRequest, ShipmentIds};
use shiprocket_client::{endpoints, ShiprocketError};
use shiprocket_core::fulfillment::{Fulfillment, ShipmentEntity, ShipmentKey, ShipmentUpdate};
use shiprocket_core::validation::validate_id_list;
use shiprocket_core::{ProviderResult, StoreError};
use shiprocket_events::names::{AwbCreated, AWB_CREATED};
use shiprocket_events::DomainEvent;

use crate::provider::ShiprocketProvider;

const AWB_ASSIGNED: &str = "AWB assigned successfully!";
const LABEL_GENERATED: &str = "Label generated successfully!";
const INVOICE_GENERATED: &str = "Invoice generated successfully!";
const PICKUP_SCHEDULED: &str = "Pickup scheduled successfully!";
const MANIFEST_GENERATED: &str = "Manifest generated successfully!";
const MANIFEST_PRINTED: &str = "Manifest printed successfully!";
const ORDERS_CANCELLED: &str = "Orders cancelled successfully!";
const SHIPMENTS_CANCELLED: &str = "Shipments cancelled successfully!";

impl ShiprocketProvider {
    // ---- AWB ----

    /// Assign a courier and AWB to a shipment.
    ///
    /// Publishes [`AWB_CREATED`] and merges `{shipment_id, ...assignment}`
    /// under `awb_generation`.
    pub async fn generate_awb(
        &self,
        fulfillment_id: &str,
        shipment_id: &str,
        courier_id: Option<&str>,
        status: Option<&str>,
    ) -> Result<ProviderResult, StoreError> {
        let request = AssignAwbRequest {
            shipment_id: shipment_id.to_string(),
            courier_id: courier_id.map(str::to_string),
            status: status.map(str::to_string),
        };
        let body = match self.post_checked(endpoints::ASSIGN_AWB, &request).await {
            Ok(body) => body,
            Err(e) => return Ok(remote_failure("generate_awb", &e)),
        };
        let Some(assignment) = wire::awb_assignment(&body) else {
            return Ok(ProviderResult::failure("AWB response carries no assignment"));
        };

        self.events.publish(DomainEvent::typed(
            AWB_CREATED,
            &AwbCreated {
                shipment_id: shipment_id.to_string(),
                response: Value::Object(assignment.clone()),
            },
        ));

        let mut data = Map::new();
        data.insert("shipment_id".into(), json!(shipment_id));
        data.extend(assignment.clone());
        let result = ProviderResult::success(Value::Object(data), AWB_ASSIGNED);

        let key = ShipmentKey::Shipment(shipment_id.to_string());
        self.update_fulfillment(
            fulfillment_id,
            vec![ShipmentUpdate::entity_result(key, ShipmentEntity::AwbGeneration, &result)],
        )
        .await?;

        let awb = wire::awb_code(&body).unwrap_or_default();
        tracing::info!(fulfillment_id, shipment_id, awb = %awb, "AWB assigned");
        Ok(result)
    }

    // ---- pickups ----

    /// Book a pickup for shipments already carrying an AWB.
    pub async fn shipment_pickup(
        &self,
        shipment_ids: &[String],
        fulfillment_id: &str,
    ) -> Result<ProviderResult, StoreError> {
        if let Err(e) = validate_id_list(shipment_ids, "shipment") {
            return Ok(ProviderResult::failure(e.message));
        }
        let request = PickupRequest {
            shipment_id: shipment_ids.to_vec(),
            pickup_date: Vec::new(),
            retry: None,
        };
        let body = match self.post_checked(endpoints::GENERATE_PICKUP, &request).await {
            Ok(body) => body,
            Err(e) => return Ok(remote_failure("shipment_pickup", &e)),
        };

        let result = ProviderResult::success(Value::Object(wire::pickup_summary(&body)), PICKUP_SCHEDULED);
        self.merge_per_shipment(fulfillment_id, shipment_ids, ShipmentEntity::Pickup, &result)
            .await?;
        Ok(result)
    }

    /// Book a pickup on specific dates (`YYYY-MM-DD`).
    ///
    /// The outcome is merged under `pickup` whether or not the aggregator
    /// accepted it, so the attempt stays visible on the shipment.
    pub async fn create_pickup_request(
        &self,
        fulfillment_id: &str,
        shipment_id: &str,
        pickup_dates: Vec<String>,
        retry: bool,
    ) -> Result<ProviderResult, StoreError> {
        let request = PickupRequest {
            shipment_id: vec![shipment_id.to_string()],
            pickup_date: pickup_dates,
            retry: retry.then(|| "retry".to_string()),
        };
        let result = match self.post_checked(endpoints::GENERATE_PICKUP, &request).await {
            Ok(body) => ProviderResult::success(body, PICKUP_SCHEDULED),
            Err(e) => remote_failure("create_pickup_request", &e),
        };

        let key = ShipmentKey::Shipment(shipment_id.to_string());
        self.update_fulfillment(
            fulfillment_id,
            vec![ShipmentUpdate::entity_result(key, ShipmentEntity::Pickup, &result)],
        )
        .await?;
        Ok(result)
    }

    // ---- documents ----

    /// Generate shipping labels; `data` is the label URL.
    pub async fn generate_label(
        &self,
        fulfillment_id: &str,
        shipment_ids: &[String],
    ) -> Result<ProviderResult, StoreError> {
        if let Err(e) = validate_id_list(shipment_ids, "shipment") {
            return Ok(ProviderResult::failure(e.message));
        }
        let request = ShipmentIds {
            shipment_id: shipment_ids.to_vec(),
        };
        let body = match self.post_checked(endpoints::GENERATE_LABEL, &request).await {
            Ok(body) => body,
            Err(e) => return Ok(remote_failure("generate_label", &e)),
        };
        if wire::has_not_created(&body) {
            return Ok(ProviderResult::failure("Error while generating labels!"));
        }
        let Some(url) = wire::label_url(&body) else {
            return Ok(ProviderResult::failure("Label response carries no label_url"));
        };

        let result = ProviderResult::success(json!(url), LABEL_GENERATED);
        self.merge_per_shipment(fulfillment_id, shipment_ids, ShipmentEntity::Label, &result)
            .await?;
        Ok(result)
    }

    /// Print invoices for aggregator orders; `data` is the invoice URL.
    pub async fn generate_invoice(
        &self,
        order_ids: &[String],
        fulfillment_id: &str,
    ) -> Result<ProviderResult, StoreError> {
        if let Err(e) = validate_id_list(order_ids, "order") {
            return Ok(ProviderResult::failure(e.message));
        }
        let request = Ids {
            ids: order_ids.to_vec(),
        };
        let body = match self.post_checked(endpoints::PRINT_INVOICE, &request).await {
            Ok(body) => body,
            Err(e) => return Ok(remote_failure("generate_invoice", &e)),
        };
        if !wire::invoice_created(&body) {
            return Ok(ProviderResult::failure("Unable to generate invoice!"));
        }
        if wire::has_not_created(&body) {
            return Ok(ProviderResult::failure("Error while generating invoices!"));
        }
        let Some(url) = wire::invoice_url(&body) else {
            return Ok(ProviderResult::failure("Invoice response carries no invoice_url"));
        };

        let result = ProviderResult::success(json!(url), INVOICE_GENERATED);
        self.merge_per_order(fulfillment_id, order_ids, ShipmentEntity::Invoice, &result)
            .await?;
        Ok(result)
    }

    /// Generate the pickup manifest; `data` is the manifest URL.
    pub async fn generate_manifests(
        &self,
        shipment_ids: &[String],
        fulfillment_id: &str,
    ) -> Result<ProviderResult, StoreError> {
        if let Err(e) = validate_id_list(shipment_ids, "shipment") {
            return Ok(ProviderResult::failure(e.message));
        }
        let request = ShipmentIds {
            shipment_id: shipment_ids.to_vec(),
        };
        let body = match self.post_checked(endpoints::GENERATE_MANIFEST, &request).await {
            Ok(body) => body,
            Err(e) => return Ok(remote_failure("generate_manifests", &e)),
        };
        let Some(url) = wire::manifest_url(&body) else {
            return Ok(ProviderResult::failure("Manifest response carries no manifest_url"));
        };

        let result = ProviderResult::success(json!(url), MANIFEST_GENERATED);
        self.merge_per_shipment(fulfillment_id, shipment_ids, ShipmentEntity::Manifest, &result)
            .await?;
        Ok(result)
    }

    /// Print an already generated manifest; `data` is the manifest URL.
    pub async fn print_manifests(
        &self,
        order_ids: &[String],
        fulfillment_id: &str,
    ) -> Result<ProviderResult, StoreError> {
        if let Err(e) = validate_id_list(order_ids, "order") {
            return Ok(ProviderResult::failure(e.message));
        }
        let request = OrderIds {
            order_ids: order_ids.to_vec(),
        };
        let body = match self.post_checked(endpoints::PRINT_MANIFEST, &request).await {
            Ok(body) => body,
            Err(e) => return Ok(remote_failure("print_manifests", &e)),
        };
        let Some(url) = wire::manifest_url(&body) else {
            return Ok(ProviderResult::failure("Manifest response carries no manifest_url"));
        };

        let result = ProviderResult::success(json!(url), MANIFEST_PRINTED);
        self.merge_per_order(fulfillment_id, order_ids, ShipmentEntity::PrintManifests, &result)
            .await?;
        Ok(result)
    }

    // ---- cancellation ----

    /// Cancel aggregator orders and mark them deleted on the fulfillment.
    pub async fn delete_order(
        &self,
        order_ids: &[String],
        fulfillment_id: &str,
    ) -> Result<ProviderResult, StoreError> {
        if let Err(e) = validate_id_list(order_ids, "order") {
            return Ok(ProviderResult::failure(e.message));
        }
        let request = Ids {
            ids: order_ids.to_vec(),
        };
        if let Err(e) = self.api.post_json(endpoints::CANCEL_ORDERS, &request).await {
            return Ok(remote_failure("delete_order", &e));
        }

        let result = ProviderResult::success(Value::Bool(true), ORDERS_CANCELLED);
        self.merge_per_order(fulfillment_id, order_ids, ShipmentEntity::OrderDeleted, &result)
            .await?;
        Ok(result)
    }

    /// Cancel shipments by AWB. Nothing is recorded on the fulfillment.
    pub async fn cancel_shipment(&self, awbs: &[String]) -> ProviderResult {
        if let Err(e) = validate_id_list(awbs, "awb") {
            return ProviderResult::failure(e.message);
        }
        let request = Awbs { awbs: awbs.to_vec() };
        match self.api.post_json(endpoints::CANCEL_SHIPMENTS, &request).await {
            Ok(body) => ProviderResult::success(body, SHIPMENTS_CANCELLED),
            Err(e) => remote_failure("cancel_shipment", &e),
        }
    }

    /// Cancel every aggregator order recorded on `fulfillment`, one per
    /// pickup location.
    pub async fn cancel_provider_order(&self, fulfillment: &Fulfillment) -> ProviderResult {
        let ids = fulfillment.provider_order_ids();
        if ids.is_empty() {
            return ProviderResult::failure(format!(
                "Fulfillment {} has no Shiprocket order to cancel",
                fulfillment.id
            ));
        }
        let orders = ids.len();
        let request = Ids { ids };
        match self.api.post_json(endpoints::CANCEL_ORDERS, &request).await {
            Ok(body) => {
                tracing::info!(fulfillment_id = %fulfillment.id, orders, "Shiprocket orders cancelled");
                ProviderResult::success(body, ORDERS_CANCELLED)
            }
            Err(e) => remote_failure("cancel_fulfillment", &e),
        }
    }

    // ---- private helpers ----

    /// POST, then treat an embedded `status_code` as a rejection.
    async fn post_checked<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ShiprocketError> {
        let body = self.api.post_json(path, body).await?;
        reject_embedded_error(body)
    }

    async fn merge_per_shipment(
        &self,
        fulfillment_id: &str,
        shipment_ids: &[String],
        entity: ShipmentEntity,
        result: &ProviderResult,
    ) -> Result<(), StoreError> {
        let updates = shipment_ids
            .iter()
            .map(|id| ShipmentUpdate::entity_result(ShipmentKey::Shipment(id.clone()), entity, result))
            .collect();
        self.update_fulfillment(fulfillment_id, updates).await?;
        Ok(())
    }

    async fn merge_per_order(
        &self,
        fulfillment_id: &str,
        order_ids: &[String],
        entity: ShipmentEntity,
        result: &ProviderResult,
    ) -> Result<(), StoreError> {
        let updates = order_ids
            .iter()
            .map(|id| ShipmentUpdate::entity_result(ShipmentKey::Order(id.clone()), entity, result))
            .collect();
        self.update_fulfillment(fulfillment_id, updates).await?;
        Ok(())
    }
}

fn remote_failure(operation: &str, e: &ShiprocketError) -> ProviderResult {
    tracing::warn!(operation, error = %e, "Shiprocket call failed");
    ProviderResult::from_error(e)
}
