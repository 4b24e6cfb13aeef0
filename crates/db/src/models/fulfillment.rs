//! Row type for the `fulfillments` table.

use serde::Serialize;
use serde_json::Value;
use shiprocket_core::fulfillment::Fulfillment;
use shiprocket_core::types::{EntityId, Timestamp};
use shiprocket_core::StoreError;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FulfillmentRow {
    pub id: EntityId,
    pub order_id: Option<EntityId>,
    pub location_id: Option<EntityId>,
    pub data: Value,
    pub metadata: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FulfillmentRow {
    /// Decode the JSONB columns into the domain record.
    pub fn into_fulfillment(self) -> Result<Fulfillment, StoreError> {
        let data = serde_json::from_value(self.data).map_err(|e| StoreError::Corrupt {
            id: self.id.clone(),
            reason: format!("data is not a shipment list: {e}"),
        })?;
        let metadata = match self.metadata {
            Value::Object(map) => map,
            Value::Null => Default::default(),
            other => {
                return Err(StoreError::Corrupt {
                    id: self.id,
                    reason: format!("metadata is not an object: {other}"),
                })
            }
        };
        Ok(Fulfillment {
            id: self.id,
            location_id: self.location_id,
            data,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use serde_json::json;

    fn row(data: Value, metadata: Value) -> FulfillmentRow {
        FulfillmentRow {
            id: "ful_1".into(),
            order_id: Some("order_1".into()),
            location_id: Some("sloc_1".into()),
            data,
            metadata,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn decodes_shipment_list() {
        let f = row(
            json!([{"status": true, "data": {"shipment_id": 1}, "message": "ok"}]),
            json!({"shiprocket_order_id": 9}),
        )
        .into_fulfillment()
        .unwrap();
        assert_eq!(f.data.len(), 1);
        assert_eq!(f.provider_order_id().as_deref(), Some("9"));
        assert_eq!(f.location_id.as_deref(), Some("sloc_1"));
    }

    #[test]
    fn non_array_data_is_corrupt() {
        let err = row(json!({"oops": 1}), json!({})).into_fulfillment().unwrap_err();
        assert_matches!(err, StoreError::Corrupt { id, .. } if id == "ful_1");
    }

    #[test]
    fn non_object_metadata_is_corrupt() {
        let err = row(json!([]), json!([1])).into_fulfillment().unwrap_err();
        assert_matches!(err, StoreError::Corrupt { .. });
    }
}
