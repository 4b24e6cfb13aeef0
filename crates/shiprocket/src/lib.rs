//! Authenticated transport to the Shiprocket REST API.
//!
//! - [`ShiprocketApi`]: bearer-token HTTP client whose GET/POST/PATCH
//!   helpers normalize every outcome into a [`ProviderResult`].
//! - [`TokenRefresher`]: cancellable background task renewing the token on
//!   a [`RefreshSchedule`].
//! - [`wire`]: outbound payloads and readers for the responses the provider
//!   inspects.
//!
//! [`ProviderResult`]: shiprocket_core::ProviderResult

pub mod api;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod refresh;
pub mod wire;

pub use api::ShiprocketApi;
pub use config::{ConfigError, RefreshSchedule, ShiprocketConfig};
pub use error::ShiprocketError;
pub use refresh::TokenRefresher;
