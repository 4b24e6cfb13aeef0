//! Shared fixtures: a fake Shiprocket server, in-memory host services and a
//! provider wired to both.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Json;
use axum::Router;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use shiprocket_client::ShiprocketConfig;
use shiprocket_core::fulfillment::{Fulfillment, ShipmentUpdate};
use shiprocket_core::order::{
    Address, FulfillmentItem, LineItem, MoneyAmount, Order, ProductVariant, ShippingMethod,
    StockLocation,
};
use shiprocket_core::services::{FulfillmentStore, OrderService, StockLocationService};
use shiprocket_core::shipping_option::{ShippingOptionKind, PROVIDER_ID};
use shiprocket_core::validation::RegionPhoneValidator;
use shiprocket_core::{CoreError, StoreError};
use shiprocket_events::EventBus;
use shiprocket_provider::{MemoryFulfillmentStore, ProviderDeps, ShiprocketProvider};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Value,
}

type Responder = Arc<dyn Fn(&Recorded) -> (u16, Value) + Send + Sync>;

#[derive(Default)]
pub struct FakeState {
    login_allowed: AtomicBool,
    logins: AtomicUsize,
    requests: Mutex<Vec<Recorded>>,
    responders: Mutex<HashMap<String, Responder>>,
}

#[derive(Clone)]
pub struct FakeShiprocket {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeShiprocket {
    /// Bind to an ephemeral port and serve until the test runtime ends.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        state.login_allowed.store(true, Ordering::SeqCst);

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn config(&self) -> ShiprocketConfig {
        ShiprocketConfig::new("ops@example.com", "secret", "42").with_base_url(&self.base_url)
    }

    pub fn allow_login(&self, allowed: bool) {
        self.state.login_allowed.store(allowed, Ordering::SeqCst);
    }

    pub fn logins(&self) -> usize {
        self.state.logins.load(Ordering::SeqCst)
    }

    pub fn on<F>(&self, path: &str, responder: F)
    where
        F: Fn(&Recorded) -> (u16, Value) + Send + Sync + 'static,
    {
        self.state
            .responders
            .lock()
            .unwrap()
            .insert(path.to_string(), Arc::new(responder));
    }

    pub fn respond(&self, path: &str, status: u16, body: Value) {
        self.on(path, move |_| (status, body.clone()));
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let recorded = Recorded {
        method,
        path: uri.path().trim_start_matches('/').to_string(),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        query,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    state.requests.lock().unwrap().push(recorded.clone());

    if recorded.path == "auth/login" {
        if !state.login_allowed.load(Ordering::SeqCst) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Invalid email and password combination"})),
            );
        }
        let n = state.logins.fetch_add(1, Ordering::SeqCst) + 1;
        return (StatusCode::OK, Json(json!({"token": format!("token-{n}")})));
    }

    if recorded.authorization.is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Token not provided"})),
        );
    }

    let responder = state.responders.lock().unwrap().get(&recorded.path).cloned();
    let (status, body) = match responder {
        Some(responder) => responder(&recorded),
        None => (200, json!({})),
    };
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

// ---------------------------------------------------------------------------
// Default aggregator behaviour
// ---------------------------------------------------------------------------

/// Register responders for every endpoint the fulfillment workflow touches.
///
/// `sloc_1` is already registered as a pickup location; orders get
/// `order_id = 1000 + n` and `shipment_id = 2000 + n`; AWBs are
/// `AWB-<shipment_id>`.
pub fn install_happy_path(fake: &FakeShiprocket) {
    fake.respond(
        "settings/company/pickup",
        200,
        json!({"data": {"shipping_address": [{"pickup_location": "sloc_1"}]}}),
    );
    fake.on("settings/company/addpickup", |req| {
        (200, json!({"success": true, "address": req.body.clone()}))
    });

    let orders = Arc::new(AtomicUsize::new(0));
    fake.on("orders/create/adhoc", move |req| {
        let n = orders.fetch_add(1, Ordering::SeqCst) + 1;
        (
            200,
            json!({
                "order_id": 1000 + n,
                "shipment_id": 2000 + n,
                "status": "NEW",
                "channel_order_id": req.body["order_id"].clone(),
            }),
        )
    });

    fake.on("courier/assign/awb", |req| {
        let shipment_id = req.body["shipment_id"].as_str().unwrap_or_default().to_string();
        (
            200,
            json!({
                "awb_assign_status": 1,
                "response": {"data": {
                    "awb_code": format!("AWB-{shipment_id}"),
                    "courier_company_id": 10,
                    "courier_name": "Bluedart",
                    "shipment_id": shipment_id,
                }},
            }),
        )
    });

    fake.respond(
        "courier/generate/pickup",
        200,
        json!({
            "pickup_status": 1,
            "response": {
                "pickup_scheduled_date": "2024-03-02 10:00:00",
                "pickup_token_number": "Reference No: 1942",
                "status": 3,
                "pickup_generated_date": {"date": "2024-03-01 18:00:00"},
            },
        }),
    );

    fake.respond(
        "courier/serviceability",
        200,
        json!({"status": 200, "data": {"available_courier_companies": [{"courier_name": "Bluedart"}]}}),
    );
    fake.respond(
        "courier/international/serviceability",
        200,
        json!({"status": 200, "data": {"available_courier_companies": [{"courier_name": "DHL"}]}}),
    );
}

// ---------------------------------------------------------------------------
// Host fixtures
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FixedLocations {
    locations: Mutex<HashMap<String, StockLocation>>,
}

impl FixedLocations {
    pub fn add(&self, location: StockLocation) {
        self.locations
            .lock()
            .unwrap()
            .insert(location.id.clone(), location);
    }
}

#[async_trait]
impl StockLocationService for FixedLocations {
    async fn retrieve(&self, location_id: &str) -> Result<StockLocation, CoreError> {
        self.locations
            .lock()
            .unwrap()
            .get(location_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "stock_location",
                id: location_id.to_string(),
            })
    }
}

#[derive(Default)]
pub struct FixedOrders {
    orders: Mutex<HashMap<String, Order>>,
}

impl FixedOrders {
    pub fn add(&self, order: Order) {
        self.orders.lock().unwrap().insert(order.id.clone(), order);
    }
}

#[async_trait]
impl OrderService for FixedOrders {
    async fn retrieve(&self, order_id: &str) -> Result<Order, CoreError> {
        self.orders
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })
    }
}

pub fn location(id: &str, postal_code: &str) -> StockLocation {
    StockLocation {
        id: id.into(),
        name: format!("Warehouse {id}"),
        address: Address {
            company: Some("Acme Traders".into()),
            phone: Some("9876543210".into()),
            address_1: "4 Industrial Estate".into(),
            city: "Pune".into(),
            province: Some("Maharashtra".into()),
            postal_code: postal_code.into(),
            country_code: "in".into(),
            ..Default::default()
        },
    }
}

pub fn customer_address(country_code: &str, postal_code: &str) -> Address {
    Address {
        first_name: Some("Asha".into()),
        last_name: Some("Rao".into()),
        phone: Some("9876543210".into()),
        address_1: "12 MG Road".into(),
        city: "Bengaluru".into(),
        province: Some("Karnataka".into()),
        postal_code: postal_code.into(),
        country_code: country_code.into(),
        ..Default::default()
    }
}

pub fn line_item(id: &str, price: f64) -> LineItem {
    LineItem {
        id: id.into(),
        quantity: 1,
        unit_price: price,
        includes_tax: true,
        tax_total: None,
        discount_total: None,
        variant: ProductVariant {
            id: format!("variant_{id}"),
            title: format!("Product {id}"),
            hs_code: Some("6211".into()),
            weight: Some(0.5),
            length: Some(10.0),
            width: Some(8.0),
            height: Some(2.0),
            prices: vec![
                MoneyAmount {
                    currency_code: "inr".into(),
                    amount: price,
                },
                MoneyAmount {
                    currency_code: "usd".into(),
                    amount: price / 80.0,
                },
            ],
        },
    }
}

pub fn shipped(item: &LineItem, location_id: Option<&str>) -> FulfillmentItem {
    FulfillmentItem {
        item: item.clone(),
        quantity: item.quantity,
        location_id: location_id.map(str::to_string),
    }
}

pub fn method(option: ShippingOptionKind) -> ShippingMethod {
    ShippingMethod {
        id: "sm_1".into(),
        shipping_option_id: option.id().into(),
        provider_id: PROVIDER_ID.into(),
    }
}

/// A domestic order with two items shipping to Bengaluru.
pub fn domestic_order() -> Order {
    Order {
        id: "order_1".into(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        email: "asha@example.com".into(),
        billing_address: customer_address("in", "560001"),
        shipping_address: Some(customer_address("in", "560001")),
        items: vec![line_item("item_1", 500.0), line_item("item_2", 250.0)],
        fulfillments: vec![Fulfillment {
            location_id: Some("sloc_1".into()),
            ..Fulfillment::new("ful_1")
        }],
        shipping_methods: vec![method(ShippingOptionKind::DomesticAir)],
        payment_currency: Some("inr".into()),
        cart_currency: "inr".into(),
        shipping_total: 40.0,
    }
}

/// Wraps the in-memory store and fails one `set_metadata` call.
pub struct FlakyStore {
    inner: Arc<MemoryFulfillmentStore>,
    fail_on: usize,
    metadata_calls: AtomicUsize,
}

impl FlakyStore {
    /// Fail the `fail_on`-th metadata write (1-based).
    pub fn new(inner: Arc<MemoryFulfillmentStore>, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            metadata_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FulfillmentStore for FlakyStore {
    async fn fetch(&self, fulfillment_id: &str) -> Result<Fulfillment, StoreError> {
        self.inner.fetch(fulfillment_id).await
    }

    async fn apply(
        &self,
        fulfillment_id: &str,
        updates: Vec<ShipmentUpdate>,
    ) -> Result<Fulfillment, StoreError> {
        self.inner.apply(fulfillment_id, updates).await
    }

    async fn set_metadata(
        &self,
        fulfillment_id: &str,
        key: &str,
        value: Value,
    ) -> Result<Fulfillment, StoreError> {
        let call = self.metadata_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(StoreError::Database("connection reset".into()));
        }
        self.inner.set_metadata(fulfillment_id, key, value).await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub fake: FakeShiprocket,
    pub provider: Arc<ShiprocketProvider>,
    pub store: Arc<MemoryFulfillmentStore>,
    pub locations: Arc<FixedLocations>,
    pub orders: Arc<FixedOrders>,
    pub events: Arc<EventBus>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Build a harness, letting the test adjust the provider configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut ShiprocketConfig)) -> Self {
        let fake = FakeShiprocket::start().await;
        install_happy_path(&fake);

        let mut config = fake.config();
        adjust(&mut config);

        let store = Arc::new(MemoryFulfillmentStore::new());
        let locations = Arc::new(FixedLocations::default());
        locations.add(location("sloc_1", "411001"));
        locations.add(location("sloc_2", "411002"));
        let orders = Arc::new(FixedOrders::default());
        orders.add(domestic_order());
        let events = Arc::new(EventBus::new(64));

        let deps = ProviderDeps {
            store: store.clone(),
            stock_locations: locations.clone(),
            orders: orders.clone(),
            phone_validator: Arc::new(RegionPhoneValidator::default()),
            events: events.clone(),
        };
        let provider = Arc::new(ShiprocketProvider::new(config, deps).unwrap());

        Self {
            fake,
            provider,
            store,
            locations,
            orders,
            events,
        }
    }

    /// Insert an empty fulfillment shipping from `location_id`.
    pub async fn fulfillment(&self, id: &str, location_id: &str) -> Fulfillment {
        let fulfillment = Fulfillment {
            location_id: Some(location_id.into()),
            ..Fulfillment::new(id)
        };
        self.store.insert(fulfillment.clone()).await;
        fulfillment
    }

    /// A second provider sharing this harness's fake and collaborators but
    /// persisting through `store`.
    pub fn provider_with_store(&self, store: Arc<dyn FulfillmentStore>) -> ShiprocketProvider {
        let deps = ProviderDeps {
            store,
            stock_locations: self.locations.clone(),
            orders: self.orders.clone(),
            phone_validator: Arc::new(RegionPhoneValidator::default()),
            events: self.events.clone(),
        };
        ShiprocketProvider::new(self.fake.config(), deps).unwrap()
    }

    pub async fn saved(&self, id: &str) -> Fulfillment {
        self.store.get(id).await.unwrap()
    }
}
