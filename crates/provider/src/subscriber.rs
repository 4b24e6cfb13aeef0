//! Reacts to the host's shipment-created events.

use std::sync::Arc;

use shiprocket_events::names::SHIPMENT_CREATED;
use shiprocket_events::{DomainEvent, ShipmentCreated};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::provider::ShiprocketProvider;

pub struct ShipmentSubscriber;

impl ShipmentSubscriber {
    /// Consume `order.shipment_created` events until cancelled or until the
    /// bus is dropped. Events are handled one at a time.
    pub async fn run(
        provider: Arc<ShiprocketProvider>,
        mut receiver: broadcast::Receiver<DomainEvent>,
        cancel: CancellationToken,
    ) {
        tracing::info!("Shipment subscriber started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Shipment subscriber stopping");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) if event.is(SHIPMENT_CREATED) => {
                        Self::handle(&provider, &event).await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Shipment subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, shipment subscriber shutting down");
                        break;
                    }
                },
            }
        }
    }

    async fn handle(provider: &ShiprocketProvider, event: &DomainEvent) {
        let Some(shipment) = event.payload_as::<ShipmentCreated>() else {
            tracing::warn!(payload = %event.payload, "Malformed shipment-created payload");
            return;
        };

        match provider.create_shipment_from_fulfillment(&shipment).await {
            Ok(results) => {
                let failed = results.iter().filter(|r| !r.status).count();
                tracing::info!(
                    order_id = %shipment.id,
                    fulfillment_id = %shipment.fulfillment_id,
                    shipments = results.len(),
                    failed,
                    "Processed shipment-created event",
                );
            }
            Err(e) => {
                tracing::error!(
                    order_id = %shipment.id,
                    fulfillment_id = %shipment.fulfillment_id,
                    error = %e,
                    "Failed to process shipment-created event",
                );
            }
        }
    }
}
