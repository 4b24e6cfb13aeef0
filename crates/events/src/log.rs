//! Background task that traces every event published on the bus.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::DomainEvent;

pub struct EventLog;

impl EventLog {
    /// Trace events until cancelled or until the bus is dropped.
    pub async fn run(mut receiver: broadcast::Receiver<DomainEvent>, cancel: CancellationToken) {
        tracing::info!("Event log started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Event log stopping");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => {
                        tracing::info!(
                            event_type = %event.event_type,
                            payload = %event.payload,
                            "Domain event"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Event log lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, event log shutting down");
                        break;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;

    #[tokio::test]
    async fn stops_on_cancel() {
        let bus = EventBus::default();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(EventLog::run(bus.subscribe(), cancel.clone()));

        bus.publish(DomainEvent::new("some.event"));
        cancel.cancel();

        handle.await.expect("event log task should finish");
    }

    #[tokio::test]
    async fn stops_when_bus_is_dropped() {
        let bus = EventBus::default();
        let handle = tokio::spawn(EventLog::run(bus.subscribe(), CancellationToken::new()));
        drop(bus);
        handle.await.expect("event log task should finish");
    }
}
