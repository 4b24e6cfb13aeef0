//! Repository for the `stock_locations` table.

use serde_json::Value;
use sqlx::PgConnection;

use crate::models::stock_location::StockLocationRow;

const COLUMNS: &str = "id, name, address";

pub struct StockLocationRepo;

impl StockLocationRepo {
    pub async fn create(
        conn: &mut PgConnection,
        id: &str,
        name: &str,
        address: &Value,
    ) -> Result<StockLocationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO stock_locations (id, name, address)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StockLocationRow>(&query)
            .bind(id)
            .bind(name)
            .bind(address)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: &str,
    ) -> Result<Option<StockLocationRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stock_locations WHERE id = $1");
        sqlx::query_as::<_, StockLocationRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}
