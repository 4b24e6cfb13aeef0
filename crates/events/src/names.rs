//! Event names and their payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Emitted after the aggregator assigned an AWB to a shipment.
pub const AWB_CREATED: &str = "SHIPROCKET.AWB.CREATED";

/// Emitted when the aggregator reports a tracking status change.
pub const SHIPPING_STATUS_UPDATE: &str = "order.shipping.status.update";

/// Published by the host when a fulfillment was marked as shipped.
pub const SHIPMENT_CREATED: &str = "order.shipment_created";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwbCreated {
    pub shipment_id: String,
    pub response: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingStatusUpdate {
    #[serde(rename = "orderId")]
    pub order_id: String,
    /// Raw tracking payload as posted by the aggregator.
    pub status: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentCreated {
    /// Order id.
    pub id: String,
    pub fulfillment_id: String,
    #[serde(default)]
    pub no_notification: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_update_uses_camel_case_order_id() {
        let v = serde_json::to_value(ShippingStatusUpdate {
            order_id: "order_1".into(),
            status: json!({"current_status": "DELIVERED"}),
        })
        .unwrap();
        assert_eq!(v["orderId"], "order_1");
        assert_eq!(v["status"]["current_status"], "DELIVERED");
    }

    #[test]
    fn shipment_created_defaults_notification_flag() {
        let e: ShipmentCreated =
            serde_json::from_value(json!({"id": "order_1", "fulfillment_id": "ful_1"})).unwrap();
        assert!(!e.no_notification);
    }
}
