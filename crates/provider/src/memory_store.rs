//! In-memory [`FulfillmentStore`] for tests and embedded hosts.
//!
//! A single async mutex is the atomic boundary: every read-merge-write runs
//! while holding it.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use shiprocket_core::fulfillment::{Fulfillment, ShipmentUpdate};
use shiprocket_core::services::FulfillmentStore;
use shiprocket_core::StoreError;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryFulfillmentStore {
    fulfillments: Mutex<HashMap<String, Fulfillment>>,
}

impl MemoryFulfillmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, fulfillment: Fulfillment) {
        self.fulfillments
            .lock()
            .await
            .insert(fulfillment.id.clone(), fulfillment);
    }

    pub async fn get(&self, fulfillment_id: &str) -> Option<Fulfillment> {
        self.fulfillments.lock().await.get(fulfillment_id).cloned()
    }
}

#[async_trait]
impl FulfillmentStore for MemoryFulfillmentStore {
    async fn fetch(&self, fulfillment_id: &str) -> Result<Fulfillment, StoreError> {
        self.get(fulfillment_id)
            .await
            .ok_or_else(|| StoreError::NotFound(fulfillment_id.to_string()))
    }

    async fn apply(
        &self,
        fulfillment_id: &str,
        updates: Vec<ShipmentUpdate>,
    ) -> Result<Fulfillment, StoreError> {
        let mut fulfillments = self.fulfillments.lock().await;
        let fulfillment = fulfillments
            .get_mut(fulfillment_id)
            .ok_or_else(|| StoreError::NotFound(fulfillment_id.to_string()))?;
        fulfillment.apply(&updates);
        Ok(fulfillment.clone())
    }

    async fn set_metadata(
        &self,
        fulfillment_id: &str,
        key: &str,
        value: Value,
    ) -> Result<Fulfillment, StoreError> {
        let mut fulfillments = self.fulfillments.lock().await;
        let fulfillment = fulfillments
            .get_mut(fulfillment_id)
            .ok_or_else(|| StoreError::NotFound(fulfillment_id.to_string()))?;
        fulfillment.metadata.insert(key.to_string(), value);
        Ok(fulfillment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::{json, Map};
    use shiprocket_core::fulfillment::{ShipmentEntity, ShipmentKey};
    use std::sync::Arc;

    fn patch(key: &str, value: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(key.into(), value);
        map
    }

    #[tokio::test]
    async fn unknown_fulfillment_is_not_found() {
        let store = MemoryFulfillmentStore::new();
        assert_matches!(store.fetch("ful_x").await, Err(StoreError::NotFound(_)));
        assert_matches!(store.apply("ful_x", vec![]).await, Err(StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_entity_updates_do_not_clobber_each_other() {
        let store = Arc::new(MemoryFulfillmentStore::new());
        store.insert(Fulfillment::new("ful_1")).await;

        let entities = [
            ShipmentEntity::AwbGeneration,
            ShipmentEntity::Pickup,
            ShipmentEntity::Label,
            ShipmentEntity::Manifest,
        ];
        let tasks: Vec<_> = entities
            .into_iter()
            .map(|entity| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let update = ShipmentUpdate::entity(
                        ShipmentKey::Shipment("77".into()),
                        entity,
                        patch("done", json!(true)),
                    );
                    store.apply("ful_1", vec![update]).await.unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let saved = store.fetch("ful_1").await.unwrap();
        assert_eq!(saved.data.len(), 1);
        let entry = saved.shipment("77").unwrap();
        for entity in entities {
            assert_eq!(entry.data[entity.as_str()]["done"], true, "{entity}");
        }
    }

    #[tokio::test]
    async fn metadata_is_set_per_key() {
        let store = MemoryFulfillmentStore::new();
        store.insert(Fulfillment::new("ful_1")).await;
        let saved = store
            .set_metadata("ful_1", "shiprocket_order_id", json!("901"))
            .await
            .unwrap();
        assert_eq!(saved.provider_order_id().as_deref(), Some("901"));
    }
}
