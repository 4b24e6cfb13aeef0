//! Row type for the `orders` table.

use serde_json::Value;
use shiprocket_core::order::Order;
use shiprocket_core::types::{EntityId, Timestamp};
use shiprocket_core::CoreError;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: EntityId,
    pub document: Value,
    pub updated_at: Timestamp,
}

impl OrderRow {
    pub fn into_order(self) -> Result<Order, CoreError> {
        serde_json::from_value(self.document)
            .map_err(|e| CoreError::Internal(format!("order {} has a malformed document: {e}", self.id)))
    }
}
