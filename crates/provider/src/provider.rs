//! Provider lifecycle and shared plumbing.
//!
//! [`ShiprocketProvider::start`] logs in once and spawns the token refresher;
//! [`ShiprocketProvider::shutdown`] stops it. The operations themselves live
//! in the sibling modules as further `impl ShiprocketProvider` blocks.

use std::sync::Arc;
use std::time::Duration;

use shiprocket_client::{ShiprocketApi, ShiprocketConfig, TokenRefresher};
use shiprocket_core::fulfillment::{Fulfillment, ShipmentUpdate};
use shiprocket_core::services::{FulfillmentStore, OrderService, StockLocationService};
use shiprocket_core::validation::PhoneValidator;
use shiprocket_core::{ProviderResult, StoreError};
use shiprocket_events::EventBus;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;

/// How long shutdown waits for the refresher to exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Host collaborators the provider is constructed with.
#[derive(Clone)]
pub struct ProviderDeps {
    pub store: Arc<dyn FulfillmentStore>,
    pub stock_locations: Arc<dyn StockLocationService>,
    pub orders: Arc<dyn OrderService>,
    pub phone_validator: Arc<dyn PhoneValidator>,
    pub events: Arc<EventBus>,
}

/// Adapter between the host's fulfillments and the Shiprocket API.
pub struct ShiprocketProvider {
    pub(crate) api: Arc<ShiprocketApi>,
    pub(crate) config: ShiprocketConfig,
    pub(crate) store: Arc<dyn FulfillmentStore>,
    pub(crate) stock_locations: Arc<dyn StockLocationService>,
    pub(crate) orders: Arc<dyn OrderService>,
    pub(crate) phone_validator: Arc<dyn PhoneValidator>,
    pub(crate) events: Arc<EventBus>,
    /// Master token; the refresher runs on a child of it.
    cancel: CancellationToken,
    refresher: Mutex<Option<JoinHandle<()>>>,
}

impl ShiprocketProvider {
    /// Build a provider without contacting the aggregator or spawning
    /// background work.
    pub fn new(config: ShiprocketConfig, deps: ProviderDeps) -> Result<Self, ProviderError> {
        let api = Arc::new(ShiprocketApi::new(&config)?);
        Ok(Self {
            api,
            config,
            store: deps.store,
            stock_locations: deps.stock_locations,
            orders: deps.orders,
            phone_validator: deps.phone_validator,
            events: deps.events,
            cancel: CancellationToken::new(),
            refresher: Mutex::new(None),
        })
    }

    /// Build the provider, log in, and start the scheduled token refresh.
    ///
    /// A failed initial login is logged and does not prevent startup; the
    /// first authenticated call then logs in again or fails with an auth
    /// error.
    pub async fn start(config: ShiprocketConfig, deps: ProviderDeps) -> Result<Arc<Self>, ProviderError> {
        let provider = Arc::new(Self::new(config, deps)?);

        let login = provider.api.login().await;
        if login.status {
            tracing::info!("Shiprocket provider logged in");
        } else {
            tracing::warn!(error = %login.message, "Initial Shiprocket login failed");
        }

        provider.spawn_refresher().await;
        Ok(provider)
    }

    /// Stop the token refresher and wait briefly for it to exit.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down Shiprocket provider");
        self.cancel.cancel();

        if let Some(handle) = self.refresher.lock().await.take() {
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, handle).await;
        }
        tracing::info!("Shiprocket provider shut down complete");
    }

    pub fn api(&self) -> &ShiprocketApi {
        &self.api
    }

    pub fn config(&self) -> &ShiprocketConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Force a fresh login, replacing the cached token on success.
    pub async fn login(&self) -> ProviderResult {
        self.api.login().await
    }

    /// Merge partial results into a fulfillment's shipment list under the
    /// store's atomic boundary and return the saved fulfillment.
    pub async fn update_fulfillment(
        &self,
        fulfillment_id: &str,
        updates: Vec<ShipmentUpdate>,
    ) -> Result<Fulfillment, StoreError> {
        let count = updates.len();
        match self.store.apply(fulfillment_id, updates).await {
            Ok(fulfillment) => {
                tracing::debug!(fulfillment_id, updates = count, "Fulfillment data merged");
                Ok(fulfillment)
            }
            Err(e) => {
                tracing::error!(fulfillment_id, error = %e, "Failed to merge fulfillment data");
                Err(e)
            }
        }
    }

    // ---- private helpers ----

    async fn spawn_refresher(&self) {
        let api = Arc::clone(&self.api);
        let schedule = self.config.refresh_schedule;
        let cancel = self.cancel.child_token();

        let handle = tokio::spawn(TokenRefresher::run(api, schedule, cancel));
        *self.refresher.lock().await = Some(handle);
    }
}
