//! Domain event plumbing for the Shiprocket provider.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the event envelope exchanged with the host.
//! - [`names`]: event names and typed payloads emitted or consumed here.
//! - [`EventLog`]: background task that traces every event on the bus.

pub mod bus;
pub mod log;
pub mod names;

pub use bus::{DomainEvent, EventBus};
pub use log::EventLog;
pub use names::{AwbCreated, ShipmentCreated, ShippingStatusUpdate};
