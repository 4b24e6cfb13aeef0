//! Domain types and pure logic for the Shiprocket fulfillment provider.
//!
//! Nothing in this crate performs I/O; remote calls live in
//! `shiprocket-client`, persistence in `shiprocket-db`.

pub mod countries;
pub mod error;
pub mod fulfillment;
pub mod hashing;
pub mod order;
pub mod order_request;
pub mod otp;
pub mod package;
pub mod response;
pub mod result;
pub mod services;
pub mod shipping_option;
pub mod types;
pub mod validation;

pub use error::{CoreError, StoreError};
pub use result::ProviderResult;
