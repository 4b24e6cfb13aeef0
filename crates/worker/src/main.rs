//! Standalone host process for the Shiprocket provider.
//!
//! Wires the Postgres-backed host services into the provider, keeps the
//! auth token fresh, and reacts to shipment-created events until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use shiprocket_client::ShiprocketConfig;
use shiprocket_core::validation::RegionPhoneValidator;
use shiprocket_db::{PgFulfillmentStore, PgOrderService, PgStockLocationService};
use shiprocket_events::{EventBus, EventLog};
use shiprocket_provider::{ProviderDeps, ShipmentSubscriber, ShiprocketProvider};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Buffered events per subscriber before it starts lagging.
const EVENT_BUS_CAPACITY: usize = 1024;

/// How long shutdown waits for the background tasks to exit.
const TASK_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shiprocket_worker=debug,shiprocket_provider=debug,shiprocket_client=info,shiprocket_db=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ShiprocketConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        channel_id = %config.channel_id,
        next_day_pickup = config.enable_next_day_pickup,
        "Shiprocket configuration loaded",
    );

    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let pool = shiprocket_db::create_pool(&database_url).await?;
    tracing::info!("Database connection pool created");

    shiprocket_db::health_check(&pool).await?;
    shiprocket_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let region = std::env::var("SHIPROCKET_PHONE_REGION").unwrap_or_else(|_| config.home_country.clone());
    let events = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
    let deps = ProviderDeps {
        store: Arc::new(PgFulfillmentStore::new(pool.clone())),
        stock_locations: Arc::new(PgStockLocationService::new(pool.clone())),
        orders: Arc::new(PgOrderService::new(pool)),
        phone_validator: Arc::new(RegionPhoneValidator::new(region)),
        events: Arc::clone(&events),
    };

    let provider = ShiprocketProvider::start(config, deps).await?;

    let cancel = CancellationToken::new();
    let event_log = tokio::spawn(EventLog::run(events.subscribe(), cancel.child_token()));
    let subscriber = tokio::spawn(ShipmentSubscriber::run(
        Arc::clone(&provider),
        events.subscribe(),
        cancel.child_token(),
    ));
    tracing::info!("Shiprocket worker running");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    cancel.cancel();
    for (name, handle) in [("event log", event_log), ("shipment subscriber", subscriber)] {
        if tokio::time::timeout(TASK_GRACE, handle).await.is_err() {
            tracing::warn!(task = name, "Background task did not stop in time");
        }
    }
    provider.shutdown().await;

    tracing::info!("Shiprocket worker stopped");
    Ok(())
}
