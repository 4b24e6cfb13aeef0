//! Serializable read-merge-write of fulfillment shipment data.

use async_trait::async_trait;
use serde_json::Value;
use shiprocket_core::fulfillment::{Fulfillment, ShipmentUpdate};
use shiprocket_core::services::FulfillmentStore;
use shiprocket_core::StoreError;
use sqlx::PgConnection;

use crate::repositories::FulfillmentRepo;
use crate::DbPool;

/// Attempts per write before a serialization conflict is reported.
pub const MAX_ATTEMPTS: u32 = 3;

/// SQLSTATE raised when a serializable transaction loses a conflict.
const SERIALIZATION_FAILURE: &str = "40001";

/// The write performed inside one transaction.
enum Write<'a> {
    Merge(&'a [ShipmentUpdate]),
    Metadata { key: &'a str, value: &'a Value },
}

/// Failure of a single attempt.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AttemptError {
    fn is_serialization_failure(&self) -> bool {
        match self {
            Self::Sql(e) => e
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == SERIALIZATION_FAILURE),
            Self::Store(_) => false,
        }
    }

    fn into_store_error(self, fulfillment_id: &str) -> StoreError {
        if self.is_serialization_failure() {
            return StoreError::Serialization(fulfillment_id.to_string());
        }
        match self {
            Self::Sql(e) => StoreError::Database(e.to_string()),
            Self::Store(e) => e,
        }
    }
}

/// [`FulfillmentStore`] over the `fulfillments` table.
///
/// Each write runs in its own `SERIALIZABLE` transaction that row-locks the
/// fulfillment, and is retried on serialization conflicts.
#[derive(Clone)]
pub struct PgFulfillmentStore {
    pool: DbPool,
}

impl PgFulfillmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn write(&self, fulfillment_id: &str, op: Write<'_>) -> Result<Fulfillment, StoreError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.write_once(fulfillment_id, &op).await {
                Ok(fulfillment) => return Ok(fulfillment),
                Err(e) if e.is_serialization_failure() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        fulfillment_id,
                        attempt,
                        "Serialization conflict on fulfillment write, retrying"
                    );
                }
                Err(e) => {
                    let err = e.into_store_error(fulfillment_id);
                    tracing::error!(fulfillment_id, error = %err, "Fulfillment write failed");
                    return Err(err);
                }
            }
        }
    }

    async fn write_once(&self, fulfillment_id: &str, op: &Write<'_>) -> Result<Fulfillment, AttemptError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let saved = match op {
            Write::Merge(updates) => merge_locked(&mut tx, fulfillment_id, updates).await?,
            Write::Metadata { key, value } => {
                FulfillmentRepo::set_metadata_key(&mut tx, fulfillment_id, key, value)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(fulfillment_id.to_string()))?
                    .into_fulfillment()?
            }
        };

        tx.commit().await?;
        Ok(saved)
    }
}

/// Lock the row, merge `updates` into its shipment list and save it.
async fn merge_locked(
    conn: &mut PgConnection,
    fulfillment_id: &str,
    updates: &[ShipmentUpdate],
) -> Result<Fulfillment, AttemptError> {
    let mut fulfillment = FulfillmentRepo::find_for_update(conn, fulfillment_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(fulfillment_id.to_string()))?
        .into_fulfillment()?;

    fulfillment.apply(updates);

    let data = serde_json::to_value(&fulfillment.data).map_err(|e| StoreError::Corrupt {
        id: fulfillment_id.to_string(),
        reason: e.to_string(),
    })?;
    let saved = FulfillmentRepo::save_data(conn, fulfillment_id, &data)
        .await?
        .ok_or_else(|| StoreError::NotFound(fulfillment_id.to_string()))?
        .into_fulfillment()?;
    Ok(saved)
}

#[async_trait]
impl FulfillmentStore for PgFulfillmentStore {
    async fn fetch(&self, fulfillment_id: &str) -> Result<Fulfillment, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        FulfillmentRepo::find_by_id(&mut conn, fulfillment_id)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?
            .ok_or_else(|| StoreError::NotFound(fulfillment_id.to_string()))?
            .into_fulfillment()
    }

    async fn apply(
        &self,
        fulfillment_id: &str,
        updates: Vec<ShipmentUpdate>,
    ) -> Result<Fulfillment, StoreError> {
        self.write(fulfillment_id, Write::Merge(&updates)).await
    }

    async fn set_metadata(
        &self,
        fulfillment_id: &str,
        key: &str,
        value: Value,
    ) -> Result<Fulfillment, StoreError> {
        self.write(fulfillment_id, Write::Metadata { key, value: &value })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn store_errors_are_not_retried() {
        let err = AttemptError::from(StoreError::NotFound("ful_1".into()));
        assert!(!err.is_serialization_failure());
        assert_matches!(err.into_store_error("ful_1"), StoreError::NotFound(id) if id == "ful_1");
    }

    #[test]
    fn non_database_sql_errors_map_to_database() {
        let err = AttemptError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_serialization_failure());
        assert_matches!(err.into_store_error("ful_1"), StoreError::Database(_));
    }
}
