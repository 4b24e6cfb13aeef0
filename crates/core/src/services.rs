//! Capabilities exchanged with the host order-management system.
//!
//! The host supplies the read services and the fulfillment store; the
//! provider adapter implements [`FulfillmentProvider`] and is consumed as
//! `Arc<dyn FulfillmentProvider>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, StoreError};
use crate::fulfillment::{Fulfillment, ShipmentUpdate};
use crate::order::{Cart, FulfillmentItem, Order, ShippingMethod, StockLocation};
use crate::result::ProviderResult;
use crate::validation::ValidationError;

#[async_trait]
pub trait StockLocationService: Send + Sync {
    async fn retrieve(&self, location_id: &str) -> Result<StockLocation, CoreError>;
}

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn retrieve(&self, order_id: &str) -> Result<Order, CoreError>;
}

/// Atomic access to a fulfillment's persisted shipment list.
///
/// `apply` must read, merge and write inside one serializable unit so that
/// concurrent steps for the same fulfillment never lose an update.
#[async_trait]
pub trait FulfillmentStore: Send + Sync {
    async fn fetch(&self, fulfillment_id: &str) -> Result<Fulfillment, StoreError>;

    async fn apply(
        &self,
        fulfillment_id: &str,
        updates: Vec<ShipmentUpdate>,
    ) -> Result<Fulfillment, StoreError>;

    async fn set_metadata(
        &self,
        fulfillment_id: &str,
        key: &str,
        value: Value,
    ) -> Result<Fulfillment, StoreError>;
}

/// A shipping option the provider can fulfil.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentOption {
    pub id: String,
}

/// The narrow interface the host drives a fulfillment provider through.
#[async_trait]
pub trait FulfillmentProvider: Send + Sync {
    fn identifier(&self) -> &'static str;

    fn fulfillment_options(&self) -> Vec<FulfillmentOption>;

    fn validate_option(&self, option_id: &str) -> bool;

    /// Validate the data attached to a shipping method before it is set on a
    /// cart. Returns the data to store on the method.
    fn validate_fulfillment_data(
        &self,
        option_id: &str,
        data: &Value,
        cart: &Cart,
    ) -> Result<Value, ValidationError>;

    fn can_calculate(&self, data: &Value) -> bool;

    fn calculate_price(&self, option_id: &str, data: &Value, cart: &Cart) -> f64;

    /// One result per pickup location referenced by `items`. A location's
    /// failure, persistence included, is reported in its own result.
    async fn create_fulfillment(
        &self,
        method: &ShippingMethod,
        items: &[FulfillmentItem],
        order: &Order,
        fulfillment: &Fulfillment,
    ) -> Vec<ProviderResult>;

    async fn cancel_fulfillment(&self, fulfillment: &Fulfillment) -> ProviderResult;
}
