//! Row type for the `stock_locations` table.

use serde_json::Value;
use shiprocket_core::order::StockLocation;
use shiprocket_core::types::EntityId;
use shiprocket_core::CoreError;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct StockLocationRow {
    pub id: EntityId,
    pub name: String,
    pub address: Value,
}

impl StockLocationRow {
    pub fn into_stock_location(self) -> Result<StockLocation, CoreError> {
        let address = serde_json::from_value(self.address).map_err(|e| {
            CoreError::Internal(format!("stock location {} has a malformed address: {e}", self.id))
        })?;
        Ok(StockLocation {
            id: self.id,
            name: self.name,
            address,
        })
    }
}
