//! Repository for the `orders` table.

use serde_json::Value;
use sqlx::PgConnection;

use crate::models::order::OrderRow;

const COLUMNS: &str = "id, document, updated_at";

pub struct OrderRepo;

impl OrderRepo {
    /// Insert or replace an order snapshot.
    pub async fn upsert(
        conn: &mut PgConnection,
        id: &str,
        document: &Value,
    ) -> Result<OrderRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders (id, document) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET document = EXCLUDED.document, updated_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .bind(document)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: &str) -> Result<Option<OrderRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}
