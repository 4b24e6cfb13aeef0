//! Integration tests for the serializable fulfillment store.
//!
//! Run against a real database: `DATABASE_URL=... cargo test -- --ignored`.

use serde_json::{json, Map, Value};
use shiprocket_core::fulfillment::{ShipmentEntity, ShipmentKey, ShipmentUpdate};
use shiprocket_core::services::FulfillmentStore;
use shiprocket_core::StoreError;
use shiprocket_db::repositories::{FulfillmentRepo, OrderRepo, StockLocationRepo};
use shiprocket_db::PgFulfillmentStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn obj(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap_or_default()
}

async fn seed(pool: &PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    StockLocationRepo::create(
        &mut conn,
        "sloc_1",
        "Bengaluru WH",
        &json!({"address_1": "1 Main", "city": "Bengaluru", "postal_code": "560001", "country_code": "in"}),
    )
    .await
    .unwrap();
    OrderRepo::upsert(&mut conn, "order_1", &json!({"id": "order_1"}))
        .await
        .unwrap();
    FulfillmentRepo::create(&mut conn, "ful_1", Some("order_1"), Some("sloc_1"))
        .await
        .unwrap();
}

fn created(shipment_id: u64) -> ShipmentUpdate {
    ShipmentUpdate::fields(
        ShipmentKey::Shipment(shipment_id.to_string()),
        obj(json!({"shipment_id": shipment_id, "order_id": 900 + shipment_id})),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn merge_persists_entity_next_to_order_data(pool: PgPool) {
    seed(&pool).await;
    let store = PgFulfillmentStore::new(pool);

    store.apply("ful_1", vec![created(11)]).await.unwrap();
    let saved = store
        .apply(
            "ful_1",
            vec![ShipmentUpdate::entity(
                ShipmentKey::Shipment("11".into()),
                ShipmentEntity::AwbGeneration,
                obj(json!({"awb_code": "AWB11"})),
            )],
        )
        .await
        .unwrap();

    let entry = &saved.data[0].data;
    assert_eq!(entry["order_id"], json!(911));
    assert_eq!(entry["awb_generation"]["awb_code"], json!("AWB11"));

    let reread = store.fetch("ful_1").await.unwrap();
    assert_eq!(reread.data, saved.data);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn concurrent_entity_merges_do_not_lose_updates(pool: PgPool) {
    seed(&pool).await;
    let store = PgFulfillmentStore::new(pool);
    store.apply("ful_1", vec![created(11)]).await.unwrap();

    let key = || ShipmentKey::Shipment("11".into());
    let awb = store.apply(
        "ful_1",
        vec![ShipmentUpdate::entity(key(), ShipmentEntity::AwbGeneration, obj(json!({"awb_code": "A"})))],
    );
    let pickup = store.apply(
        "ful_1",
        vec![ShipmentUpdate::entity(key(), ShipmentEntity::Pickup, obj(json!({"status": 2})))],
    );
    let label = store.apply(
        "ful_1",
        vec![ShipmentUpdate::entity(key(), ShipmentEntity::Label, obj(json!({"label_url": "u"})))],
    );
    let (a, b, c) = tokio::join!(awb, pickup, label);
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let f = store.fetch("ful_1").await.unwrap();
    let entry = &f.data[0].data;
    assert_eq!(entry["awb_generation"]["awb_code"], json!("A"));
    assert_eq!(entry["pickup"]["status"], json!(2));
    assert_eq!(entry["label"]["label_url"], json!("u"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn metadata_key_is_added_without_dropping_others(pool: PgPool) {
    seed(&pool).await;
    let store = PgFulfillmentStore::new(pool);

    store.set_metadata("ful_1", "note", json!("fragile")).await.unwrap();
    let f = store
        .set_metadata("ful_1", "shiprocket_order_id", json!(4455))
        .await
        .unwrap();

    assert_eq!(f.metadata["note"], json!("fragile"));
    assert_eq!(f.provider_order_id().as_deref(), Some("4455"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn missing_fulfillment_is_reported(pool: PgPool) {
    let store = PgFulfillmentStore::new(pool);
    let err = store.apply("ful_missing", vec![created(1)]).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "ful_missing"));
}
