//! Postgres-backed host read services.

use async_trait::async_trait;
use shiprocket_core::order::{Order, StockLocation};
use shiprocket_core::services::{OrderService, StockLocationService};
use shiprocket_core::CoreError;

use crate::repositories::{FulfillmentRepo, OrderRepo, StockLocationRepo};
use crate::DbPool;

fn db_error(e: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("database error: {e}"))
}

pub struct PgStockLocationService {
    pool: DbPool,
}

impl PgStockLocationService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockLocationService for PgStockLocationService {
    async fn retrieve(&self, location_id: &str) -> Result<StockLocation, CoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        StockLocationRepo::find_by_id(&mut conn, location_id)
            .await
            .map_err(db_error)?
            .ok_or_else(|| CoreError::NotFound {
                entity: "stock_location",
                id: location_id.to_string(),
            })?
            .into_stock_location()
    }
}

pub struct PgOrderService {
    pool: DbPool,
}

impl PgOrderService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderService for PgOrderService {
    /// Load the order snapshot. Fulfillments stored in their own table take
    /// precedence over the ones embedded in the snapshot.
    async fn retrieve(&self, order_id: &str) -> Result<Order, CoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        let mut order = OrderRepo::find_by_id(&mut conn, order_id)
            .await
            .map_err(db_error)?
            .ok_or_else(|| CoreError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })?
            .into_order()?;

        let rows = FulfillmentRepo::list_by_order(&mut conn, order_id)
            .await
            .map_err(db_error)?;
        if !rows.is_empty() {
            order.fulfillments = rows
                .into_iter()
                .map(|row| row.into_fulfillment())
                .collect::<Result<_, _>>()
                .map_err(|e| CoreError::Internal(e.to_string()))?;
        }
        Ok(order)
    }
}
