//! Repository for the `fulfillments` table.
//!
//! Every function takes the connection (usually a transaction) explicitly.

use serde_json::Value;
use sqlx::PgConnection;

use crate::models::fulfillment::FulfillmentRow;

/// Column list for fulfillments queries.
const COLUMNS: &str = "id, order_id, location_id, data, metadata, created_at, updated_at";

pub struct FulfillmentRepo;

impl FulfillmentRepo {
    /// Insert a fulfillment with an empty shipment list.
    pub async fn create(
        conn: &mut PgConnection,
        id: &str,
        order_id: Option<&str>,
        location_id: Option<&str>,
    ) -> Result<FulfillmentRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO fulfillments (id, order_id, location_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FulfillmentRow>(&query)
            .bind(id)
            .bind(order_id)
            .bind(location_id)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: &str,
    ) -> Result<Option<FulfillmentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fulfillments WHERE id = $1");
        sqlx::query_as::<_, FulfillmentRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Same as [`find_by_id`](Self::find_by_id) but row-locks the fulfillment
    /// until the surrounding transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: &str,
    ) -> Result<Option<FulfillmentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fulfillments WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, FulfillmentRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Replace the shipment list. Returns `None` if the row is gone.
    pub async fn save_data(
        conn: &mut PgConnection,
        id: &str,
        data: &Value,
    ) -> Result<Option<FulfillmentRow>, sqlx::Error> {
        let query = format!(
            "UPDATE fulfillments SET data = $2, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FulfillmentRow>(&query)
            .bind(id)
            .bind(data)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Set a single metadata key, leaving the others in place.
    pub async fn set_metadata_key(
        conn: &mut PgConnection,
        id: &str,
        key: &str,
        value: &Value,
    ) -> Result<Option<FulfillmentRow>, sqlx::Error> {
        let query = format!(
            "UPDATE fulfillments
             SET metadata = metadata || jsonb_build_object($2::text, $3::jsonb),
                 updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FulfillmentRow>(&query)
            .bind(id)
            .bind(key)
            .bind(value)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn list_by_order(
        conn: &mut PgConnection,
        order_id: &str,
    ) -> Result<Vec<FulfillmentRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fulfillments
             WHERE order_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, FulfillmentRow>(&query)
            .bind(order_id)
            .fetch_all(&mut *conn)
            .await
    }
}
