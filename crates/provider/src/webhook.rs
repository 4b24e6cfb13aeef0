//! Tracking-status webhook.
//!
//! The aggregator posts tracking updates with an `x-api-key` header holding
//! the SHA-256 hex digest of a shared secret. Verified updates are
//! republished on the bus as `order.shipping.status.update`.

use std::sync::Arc;

use serde_json::Value;
use shiprocket_core::hashing::verify_api_key;
use shiprocket_core::response::{http_status_for, public_message, ApiEnvelope, Environment};
use shiprocket_core::result::json_id;
use shiprocket_core::services::OrderService;
use shiprocket_core::CoreError;
use shiprocket_events::names::SHIPPING_STATUS_UPDATE;
use shiprocket_events::{DomainEvent, EventBus, ShippingStatusUpdate};

/// Name of the header carrying the hashed shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Invalid or missing x-api-key header")]
    Unauthorized,

    #[error("Tracking payload carries no order_id")]
    MissingOrderId,

    #[error(transparent)]
    Order(#[from] CoreError),
}

pub struct StatusWebhook {
    orders: Arc<dyn OrderService>,
    events: Arc<EventBus>,
    shared_secret: Option<String>,
    environment: Environment,
}

impl StatusWebhook {
    /// `shared_secret` of `None` falls back to the default key.
    pub fn new(orders: Arc<dyn OrderService>, events: Arc<EventBus>, shared_secret: Option<String>) -> Self {
        Self {
            orders,
            events,
            shared_secret,
            environment: Environment::default(),
        }
    }

    /// Hide internal error text from callers when running in production.
    pub fn in_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Verify, resolve the order, publish the update and return it.
    pub async fn handle(
        &self,
        api_key: Option<&str>,
        payload: Value,
    ) -> Result<ShippingStatusUpdate, WebhookError> {
        let presented = api_key.ok_or(WebhookError::Unauthorized)?;
        if !verify_api_key(presented, self.shared_secret.as_deref()) {
            tracing::warn!("Rejected tracking webhook with a bad api key");
            return Err(WebhookError::Unauthorized);
        }

        let order_id = payload
            .get("order_id")
            .and_then(json_id)
            .ok_or(WebhookError::MissingOrderId)?;
        let order = self.orders.retrieve(&order_id).await?;

        let update = ShippingStatusUpdate {
            order_id: order.id,
            status: payload,
        };
        self.events
            .publish(DomainEvent::typed(SHIPPING_STATUS_UPDATE, &update));
        tracing::info!(order_id = %update.order_id, "Tracking status update published");
        Ok(update)
    }

    /// [`Self::handle`] rendered as an HTTP status and response body.
    pub async fn respond(&self, api_key: Option<&str>, payload: Value) -> (u16, ApiEnvelope) {
        match self.handle(api_key, payload).await {
            Ok(update) => (
                200,
                ApiEnvelope::success(update.status, "Tracking status received"),
            ),
            Err(e) => {
                let status = http_status_for(e.status_code());
                let message = if status >= 500 {
                    tracing::error!(error = %e, "Tracking webhook failed");
                    public_message(&e.to_string(), self.environment)
                } else {
                    e.to_string()
                };
                (status, ApiEnvelope::error(message))
            }
        }
    }
}

impl WebhookError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::MissingOrderId => 400,
            Self::Order(CoreError::NotFound { .. }) => 404,
            Self::Order(_) => 500,
        }
    }
}
