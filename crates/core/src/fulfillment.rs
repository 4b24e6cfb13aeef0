//! Fulfillment records and the merge of per-step results into their
//! persisted shipment list.
//!
//! A fulfillment's `data` is an ordered list of shipment entries, one per
//! order created at the aggregator. Each workflow step (AWB, pickup, label,
//! invoice, manifest) enriches the matching entry; none of them replaces it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::result::{json_id, ProviderResult};
use crate::types::EntityId;

/// Metadata key holding the aggregator's order id once an order was created.
pub const PROVIDER_ORDER_ID_KEY: &str = "shiprocket_order_id";

// ---------------------------------------------------------------------------
// Fulfillment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fulfillment {
    pub id: EntityId,
    #[serde(default)]
    pub location_id: Option<EntityId>,
    #[serde(default)]
    pub data: Vec<ProviderResult>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Fulfillment {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// The aggregator order id recorded by the workflow, if any.
    pub fn provider_order_id(&self) -> Option<String> {
        self.metadata.get(PROVIDER_ORDER_ID_KEY).and_then(json_id)
    }

    /// Every distinct aggregator order id on the shipment entries, in entry
    /// order. Falls back to the metadata key when no entry carries one.
    pub fn provider_order_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for id in self
            .data
            .iter()
            .filter_map(|entry| entry.data.get("order_id").and_then(json_id))
        {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.is_empty() {
            ids.extend(self.provider_order_id());
        }
        ids
    }

    /// Shipment entry whose `data.shipment_id` equals `shipment_id`.
    pub fn shipment(&self, shipment_id: &str) -> Option<&ProviderResult> {
        let key = ShipmentKey::Shipment(shipment_id.to_string());
        self.data.iter().find(|entry| key.matches(entry))
    }

    /// Apply updates in order. Each update is merged independently.
    pub fn apply(&mut self, updates: &[ShipmentUpdate]) {
        for update in updates {
            merge_update(&mut self.data, update);
        }
    }
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// Which shipment entries an update targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShipmentKey {
    Shipment(String),
    /// Invoices and manifest prints are keyed by the aggregator order id.
    Order(String),
}

impl ShipmentKey {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Shipment(_) => "shipment_id",
            Self::Order(_) => "order_id",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Shipment(id) | Self::Order(id) => id,
        }
    }

    /// True when the entry's `data.<field>` renders to this key's id.
    /// Numbers and strings compare by their textual form.
    pub fn matches(&self, entry: &ProviderResult) -> bool {
        entry
            .data
            .get(self.field())
            .and_then(json_id)
            .is_some_and(|id| id == self.id())
    }

    fn placeholder(&self) -> ProviderResult {
        let mut data = Map::new();
        data.insert(self.field().into(), Value::String(self.id().to_string()));
        ProviderResult::success(Value::Object(data), "")
    }
}

/// Named sub-objects of a shipment entry, one per enrichment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentEntity {
    AwbGeneration,
    Label,
    Pickup,
    Invoice,
    Manifest,
    PrintManifests,
    OrderDeleted,
}

impl ShipmentEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwbGeneration => "awb_generation",
            Self::Label => "label",
            Self::Pickup => "pickup",
            Self::Invoice => "invoice",
            Self::Manifest => "manifest",
            Self::PrintManifests => "print_manifests",
            Self::OrderDeleted => "order_deleted",
        }
    }
}

impl std::fmt::Display for ShipmentEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial result to merge into one or more shipment entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentUpdate {
    pub key: ShipmentKey,
    pub entity: Option<ShipmentEntity>,
    pub patch: Map<String, Value>,
}

impl ShipmentUpdate {
    /// Merge `patch` into the top-level data of the shipment entry.
    pub fn fields(key: ShipmentKey, patch: Map<String, Value>) -> Self {
        Self {
            key,
            entity: None,
            patch,
        }
    }

    /// Merge `patch` into the named sub-object of the shipment entry.
    pub fn entity(key: ShipmentKey, entity: ShipmentEntity, patch: Map<String, Value>) -> Self {
        Self {
            key,
            entity: Some(entity),
            patch,
        }
    }

    /// Store a whole result envelope under `entity`.
    pub fn entity_result(key: ShipmentKey, entity: ShipmentEntity, result: &ProviderResult) -> Self {
        Self::entity(key, entity, result.to_object())
    }

    /// Merge the object payload of a result into the entry's data. Non-object
    /// payloads are stored under `result`.
    pub fn from_result_data(key: ShipmentKey, result: &ProviderResult) -> Self {
        let patch = match &result.data {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("result".into(), other.clone());
                map
            }
        };
        Self::fields(key, patch)
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Merge one update into a shipment list.
///
/// Every entry matching the key is patched; when none matches, a placeholder
/// entry carrying only the key is appended first. Patches are shallow: keys
/// in the patch overwrite, all other keys survive.
pub fn merge_update(entries: &mut Vec<ProviderResult>, update: &ShipmentUpdate) {
    if !entries.iter().any(|entry| update.key.matches(entry)) {
        entries.push(update.key.placeholder());
    }

    for entry in entries.iter_mut().filter(|entry| update.key.matches(entry)) {
        let data = ensure_object(&mut entry.data);
        let target = match update.entity {
            Some(entity) => {
                let slot = data
                    .entry(entity.as_str())
                    .or_insert_with(|| Value::Object(Map::new()));
                ensure_object(slot)
            }
            None => data,
        };
        for (k, v) in &update.patch {
            target.insert(k.clone(), v.clone());
        }
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}
