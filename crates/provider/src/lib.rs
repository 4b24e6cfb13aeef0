//! The Shiprocket fulfillment provider.
//!
//! [`ShiprocketProvider`] drives the aggregator on behalf of the host:
//! serviceability checks, order submission, the per-location
//! order → AWB → pickup workflow, document generation and cancellation.
//! Every step's outcome is merged into the fulfillment's persisted shipment
//! list through the host's [`FulfillmentStore`].
//!
//! [`FulfillmentStore`]: shiprocket_core::services::FulfillmentStore

pub mod capability;
pub mod error;
pub mod memory_store;
pub mod orders;
pub mod provider;
pub mod serviceability;
pub mod shipments;
pub mod subscriber;
pub mod webhook;
pub mod workflow;

pub use error::ProviderError;
pub use memory_store::MemoryFulfillmentStore;
pub use provider::{ProviderDeps, ShiprocketProvider};
pub use serviceability::FulfillmentServiceability;
pub use subscriber::ShipmentSubscriber;
pub use webhook::{StatusWebhook, WebhookError};
